//! Per-leaderboard eligibility gates
//!
//! Each leaderboard variant requires a minimum amount of underlying data
//! before a user may appear on it. Users failing the gate are excluded
//! from that variant entirely; they are never scored or ranked for it.

use crate::types::{LeaderboardVariant, UserSignals};

/// Ratings required before the Skill and Personality averages are listable
pub const MIN_RATINGS_FOR_AVERAGES: u32 = 3;

/// Ratings required (alongside a ranked tier) for the Overall board
pub const MIN_RATINGS_FOR_OVERALL: u32 = 1;

/// Whether a user qualifies for the given leaderboard variant
pub fn is_eligible(signals: &UserSignals, variant: LeaderboardVariant) -> bool {
    match variant {
        LeaderboardVariant::Skill | LeaderboardVariant::Personality => {
            signals.rating_count >= MIN_RATINGS_FOR_AVERAGES
        }
        LeaderboardVariant::Rank => signals.rank_tier.is_ranked(),
        LeaderboardVariant::Ingame => signals.rank_tier.is_ranked() && signals.win_rate.is_some(),
        LeaderboardVariant::Overall => {
            signals.rating_count >= MIN_RATINGS_FOR_OVERALL && signals.rank_tier.is_ranked()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RankTier;
    use crate::utils::current_timestamp;

    fn create_test_signals(rating_count: u32, tier: RankTier, win_rate: Option<f64>) -> UserSignals {
        UserSignals {
            user_id: "user1".to_string(),
            skill_average: 4.0,
            personality_average: 3.5,
            rating_count,
            rank_tier: tier,
            division: None,
            league_points: 0,
            win_rate,
            updated_at: current_timestamp(),
        }
    }

    #[test]
    fn test_averages_require_three_ratings() {
        let below = create_test_signals(2, RankTier::Gold, Some(55.0));
        assert!(!is_eligible(&below, LeaderboardVariant::Skill));
        assert!(!is_eligible(&below, LeaderboardVariant::Personality));

        let at_threshold = create_test_signals(3, RankTier::Unranked, None);
        assert!(is_eligible(&at_threshold, LeaderboardVariant::Skill));
        assert!(is_eligible(&at_threshold, LeaderboardVariant::Personality));
    }

    #[test]
    fn test_sparse_rater_still_appears_on_rank_boards() {
        // Two ratings is under the averages threshold but the rank-derived
        // boards only care about ranked status
        let signals = create_test_signals(2, RankTier::Gold, Some(55.0));
        assert!(is_eligible(&signals, LeaderboardVariant::Rank));
        assert!(is_eligible(&signals, LeaderboardVariant::Ingame));
        assert!(is_eligible(&signals, LeaderboardVariant::Overall));
        assert!(!is_eligible(&signals, LeaderboardVariant::Skill));
        assert!(!is_eligible(&signals, LeaderboardVariant::Personality));
    }

    #[test]
    fn test_unranked_users_excluded_from_rank_boards() {
        let signals = create_test_signals(10, RankTier::Unranked, Some(60.0));
        assert!(!is_eligible(&signals, LeaderboardVariant::Rank));
        assert!(!is_eligible(&signals, LeaderboardVariant::Ingame));
        assert!(!is_eligible(&signals, LeaderboardVariant::Overall));
        assert!(is_eligible(&signals, LeaderboardVariant::Skill));
        assert!(is_eligible(&signals, LeaderboardVariant::Personality));
    }

    #[test]
    fn test_ingame_requires_tracked_win_rate() {
        let no_games = create_test_signals(5, RankTier::Platinum, None);
        assert!(is_eligible(&no_games, LeaderboardVariant::Rank));
        assert!(!is_eligible(&no_games, LeaderboardVariant::Ingame));

        let with_games = create_test_signals(5, RankTier::Platinum, Some(48.0));
        assert!(is_eligible(&with_games, LeaderboardVariant::Ingame));
    }

    #[test]
    fn test_overall_requires_any_rating_and_ranked_tier() {
        let no_ratings = create_test_signals(0, RankTier::Gold, Some(50.0));
        assert!(!is_eligible(&no_ratings, LeaderboardVariant::Overall));

        let one_rating = create_test_signals(1, RankTier::Gold, Some(50.0));
        assert!(is_eligible(&one_rating, LeaderboardVariant::Overall));

        let unranked = create_test_signals(1, RankTier::Unranked, Some(50.0));
        assert!(!is_eligible(&unranked, LeaderboardVariant::Overall));
    }

    #[test]
    fn test_overall_does_not_require_win_rate() {
        let signals = create_test_signals(4, RankTier::Silver, None);
        assert!(is_eligible(&signals, LeaderboardVariant::Overall));
    }
}
