//! Snapshot construction: filter, score, order, position
//!
//! Builds a complete ordered snapshot for one variant from a raw signal
//! set. Construction is pure; the coordinator decides when it runs and
//! how the result is published.

use crate::leaderboard::snapshot::{RankedEntry, Snapshot};
use crate::scoring::{is_eligible, score};
use crate::types::{LeaderboardVariant, UserSignals};
use crate::utils::{current_timestamp, generate_snapshot_id};
use std::cmp::Ordering;

/// Build a freshly-ordered snapshot for one variant.
///
/// Ineligible users are dropped before scoring. Ties are broken by
/// rating volume and then user id so repeated recomputes over unchanged
/// signals produce the identical order.
pub fn build_snapshot(signals: &[UserSignals], variant: LeaderboardVariant) -> Snapshot {
    let mut scored: Vec<(&UserSignals, f64)> = signals
        .iter()
        .filter(|candidate| is_eligible(candidate, variant))
        .map(|candidate| (candidate, score(candidate, variant)))
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.0.rating_count.cmp(&a.0.rating_count))
            .then_with(|| a.0.user_id.cmp(&b.0.user_id))
    });

    let entries = scored
        .into_iter()
        .enumerate()
        .map(|(index, (candidate, value))| RankedEntry {
            user_id: candidate.user_id.clone(),
            variant,
            score: value,
            position: (index + 1) as u32,
        })
        .collect();

    Snapshot {
        variant,
        snapshot_id: generate_snapshot_id(),
        entries,
        generated_at: current_timestamp(),
    }
}
