//! Score derivation for the five leaderboard variants
//!
//! This module provides the pure functions mapping raw user signals to
//! comparable numeric scores, plus the per-variant eligibility gates
//! applied before any scoring happens.

pub mod eligibility;
pub mod score;

// Re-export commonly used functions
pub use eligibility::{is_eligible, MIN_RATINGS_FOR_AVERAGES, MIN_RATINGS_FOR_OVERALL};
pub use score::{display_score, rank_score, score};
