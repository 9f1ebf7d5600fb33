//! Immutable leaderboard snapshots and paginated slices
//!
//! A snapshot is the fully-ordered view of one leaderboard variant at a
//! point in time. Snapshots are never patched in place; a recompute
//! produces a complete replacement and swaps it in atomically.

use crate::types::{LeaderboardVariant, SnapshotId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user's place on a leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    pub user_id: UserId,
    pub variant: LeaderboardVariant,
    /// Full-precision score used for ordering
    pub score: f64,
    /// 1-based dense position within the snapshot
    pub position: u32,
}

/// An immutable, fully-ordered view of one leaderboard variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub variant: LeaderboardVariant,
    pub snapshot_id: SnapshotId,
    pub entries: Vec<RankedEntry>,
    pub generated_at: DateTime<Utc>,
}

impl Snapshot {
    /// Number of users on this leaderboard
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Slice out the window `[offset, offset + limit)`.
    ///
    /// Offsets past the end yield an empty slice rather than an error, so
    /// clients paging forward simply run out of entries.
    pub fn page(&self, offset: usize, limit: usize) -> PageSlice {
        let total = self.entries.len();
        let start = offset.min(total);
        let end = offset.saturating_add(limit).min(total);

        PageSlice {
            entries: self.entries[start..end].to_vec(),
            total,
            offset,
            limit,
            has_more: offset.saturating_add(limit) < total,
        }
    }
}

/// A paginated window into a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSlice {
    pub entries: Vec<RankedEntry>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

impl PageSlice {
    /// The page served before any snapshot has been published
    pub fn empty(offset: usize, limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            total: 0,
            offset,
            limit,
            has_more: false,
        }
    }
}
