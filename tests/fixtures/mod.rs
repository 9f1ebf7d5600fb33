//! Test fixtures and mock implementations for integration testing

use async_trait::async_trait;
use podium::amqp::publisher::EventPublisher;
use podium::error::Result;
use podium::types::{
    Division, LeaderboardPublished, LeaderboardVariant, RankTier, UserSignals,
};
use podium::utils::current_timestamp;
use std::sync::{Arc, Mutex};

/// Mock event publisher that captures published events for testing
#[derive(Debug, Default)]
pub struct MockEventPublisher {
    published_events: Arc<Mutex<Vec<LeaderboardPublished>>>,
}

impl MockEventPublisher {
    pub fn new() -> Self {
        Self {
            published_events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get all published events (for testing)
    pub fn get_published_events(&self) -> Vec<LeaderboardPublished> {
        self.published_events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Count events published for a specific variant
    pub fn count_for_variant(&self, variant: LeaderboardVariant) -> usize {
        self.get_published_events()
            .iter()
            .filter(|event| event.variant == variant)
            .count()
    }
}

#[async_trait]
impl EventPublisher for MockEventPublisher {
    async fn publish_leaderboard_published(&self, event: LeaderboardPublished) -> Result<()> {
        if let Ok(mut events) = self.published_events.lock() {
            events.push(event);
        }
        Ok(())
    }
}

/// Construct signals with every field spelled out
#[allow(clippy::too_many_arguments)]
pub fn signals(
    user_id: &str,
    skill: f64,
    personality: f64,
    rating_count: u32,
    tier: RankTier,
    division: Option<Division>,
    league_points: u32,
    win_rate: Option<f64>,
) -> UserSignals {
    UserSignals {
        user_id: user_id.to_string(),
        skill_average: skill,
        personality_average: personality,
        rating_count,
        rank_tier: tier,
        division,
        league_points,
        win_rate,
        updated_at: current_timestamp(),
    }
}

/// A roster spanning every tier band plus the interesting eligibility edges
pub fn realistic_roster() -> Vec<UserSignals> {
    vec![
        // Apex of the ladder, dominant everywhere
        signals(
            "apex_predator",
            4.9,
            4.2,
            32,
            RankTier::Challenger,
            None,
            870,
            Some(68.0),
        ),
        signals(
            "gm_grinder",
            4.7,
            3.9,
            28,
            RankTier::Grandmaster,
            None,
            412,
            Some(61.0),
        ),
        signals(
            "master_tactician",
            4.5,
            4.4,
            25,
            RankTier::Master,
            None,
            95,
            Some(57.5),
        ),
        // Division band
        signals(
            "diamond_one",
            4.2,
            4.0,
            22,
            RankTier::Diamond,
            Some(Division::I),
            0,
            Some(55.0),
        ),
        signals(
            "emerald_coach",
            3.9,
            4.8,
            19,
            RankTier::Emerald,
            Some(Division::III),
            0,
            Some(52.0),
        ),
        signals(
            "plat_four",
            3.6,
            3.2,
            15,
            RankTier::Platinum,
            Some(Division::IV),
            0,
            Some(49.0),
        ),
        signals(
            "gold_two",
            3.3,
            3.7,
            12,
            RankTier::Gold,
            Some(Division::II),
            0,
            Some(51.5),
        ),
        // Below the division band
        signals(
            "silver_scrapper",
            2.8,
            3.1,
            9,
            RankTier::Silver,
            None,
            0,
            Some(47.0),
        ),
        signals(
            "bronze_battler",
            2.2,
            2.6,
            6,
            RankTier::Bronze,
            None,
            0,
            Some(44.0),
        ),
        signals("iron_will", 1.8, 2.0, 4, RankTier::Iron, None, 0, Some(38.0)),
        // Brilliant but unranked: averages boards only
        signals(
            "unranked_ace",
            4.8,
            4.9,
            30,
            RankTier::Unranked,
            None,
            0,
            Some(70.0),
        ),
        // Ranked but no games tracked: everything except ingame
        signals(
            "no_games_yet",
            3.4,
            3.6,
            11,
            RankTier::Gold,
            Some(Division::III),
            0,
            None,
        ),
        // Two ratings: under the averages gate, still on the rank boards
        signals(
            "sparse_rater",
            4.0,
            4.0,
            2,
            RankTier::Platinum,
            Some(Division::II),
            0,
            Some(53.0),
        ),
        // Zero ratings: rank and ingame only
        signals(
            "never_rated",
            0.0,
            0.0,
            0,
            RankTier::Silver,
            None,
            0,
            Some(50.0),
        ),
    ]
}
