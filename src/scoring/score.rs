//! Variant score calculation
//!
//! Pure scoring functions for the five leaderboard variants. All of them
//! are defined only for eligible inputs; callers filter through the
//! eligibility gate first, and scoring an ineligible user is treated as a
//! programming error rather than a recoverable condition.

use crate::scoring::eligibility::is_eligible;
use crate::types::{Division, LeaderboardVariant, RankTier, UserSignals};
use crate::utils::{round_to_integer, round_to_tenth};

/// Points separating adjacent tiers in the rank score
pub const TIER_STEP: f64 = 1000.0;

/// Win rate that leaves the in-game score equal to the plain rank score
pub const NEUTRAL_WIN_RATE: f64 = 50.0;

// Overall blend weights
pub const OVERALL_SKILL_WEIGHT: f64 = 0.30;
pub const OVERALL_PERSONALITY_WEIGHT: f64 = 0.20;
pub const OVERALL_RANK_WEIGHT: f64 = 0.30;
pub const OVERALL_WIN_RATE_WEIGHT: f64 = 0.20;

// Overall component scaling and caps, applied before the weights
const OVERALL_SKILL_SCALE: f64 = 600.0;
const OVERALL_SKILL_CAP: f64 = 3000.0;
const OVERALL_PERSONALITY_SCALE: f64 = 400.0;
const OVERALL_PERSONALITY_CAP: f64 = 2000.0;
const OVERALL_RANK_DIVISOR: f64 = 4.0;
const OVERALL_WIN_RATE_SCALE: f64 = 20.0;
const OVERALL_WIN_RATE_CAP: f64 = 2000.0;

/// Collapse tier, division and league points into a single comparable value.
///
/// Division bonuses apply only in the Gold..Diamond band and league points
/// only at Master and above, so values carried outside their band (for
/// example a division left over from a decayed account) never leak in.
pub fn rank_score(tier: RankTier, division: Option<Division>, league_points: u32) -> f64 {
    assert!(
        tier.is_ranked(),
        "rank score is undefined for unranked users"
    );

    let mut score = tier.index() as f64 * TIER_STEP;
    if tier.has_divisions() {
        if let Some(division) = division {
            score += division_bonus(division);
        }
    }
    if tier.uses_league_points() {
        score += league_points as f64;
    }
    score
}

fn division_bonus(division: Division) -> f64 {
    match division {
        Division::I => 400.0,
        Division::II => 300.0,
        Division::III => 200.0,
        Division::IV => 100.0,
    }
}

/// Score a user for the given variant.
///
/// Returns the full-precision value used for ordering; display rounding
/// happens separately at the serving boundary.
pub fn score(signals: &UserSignals, variant: LeaderboardVariant) -> f64 {
    assert!(
        is_eligible(signals, variant),
        "scored an ineligible user: {} on {}",
        signals.user_id,
        variant
    );

    match variant {
        LeaderboardVariant::Skill => signals.skill_average,
        LeaderboardVariant::Personality => signals.personality_average,
        LeaderboardVariant::Rank => {
            rank_score(signals.rank_tier, signals.division, signals.league_points)
        }
        LeaderboardVariant::Ingame => {
            let base = rank_score(signals.rank_tier, signals.division, signals.league_points);
            let win_rate = signals.win_rate.unwrap_or(NEUTRAL_WIN_RATE);
            base * (win_rate / NEUTRAL_WIN_RATE)
        }
        LeaderboardVariant::Overall => {
            let skill_points = (signals.skill_average * OVERALL_SKILL_SCALE).min(OVERALL_SKILL_CAP);
            let personality_points = (signals.personality_average * OVERALL_PERSONALITY_SCALE)
                .min(OVERALL_PERSONALITY_CAP);
            let rank_points = rank_score(signals.rank_tier, signals.division, signals.league_points)
                / OVERALL_RANK_DIVISOR;
            let win_rate_points =
                (signals.win_rate.unwrap_or(0.0) * OVERALL_WIN_RATE_SCALE).min(OVERALL_WIN_RATE_CAP);

            OVERALL_SKILL_WEIGHT * skill_points
                + OVERALL_PERSONALITY_WEIGHT * personality_points
                + OVERALL_RANK_WEIGHT * rank_points
                + OVERALL_WIN_RATE_WEIGHT * win_rate_points
        }
    }
}

/// Round a score the way the variant displays it.
///
/// The averages show one decimal place; everything else shows whole
/// points. Ordering always uses the unrounded value, so two users both
/// displaying "4.5" still rank deterministically.
pub fn display_score(value: f64, variant: LeaderboardVariant) -> f64 {
    match variant {
        LeaderboardVariant::Skill | LeaderboardVariant::Personality => round_to_tenth(value),
        LeaderboardVariant::Overall | LeaderboardVariant::Rank | LeaderboardVariant::Ingame => {
            round_to_integer(value)
        }
    }
}
