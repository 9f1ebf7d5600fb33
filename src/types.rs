//! Common types used throughout the leaderboard service

use crate::error::LeaderboardError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;
use uuid::Uuid;

/// Unique identifier for users
pub type UserId = String;

/// Unique identifier for published leaderboard snapshots
pub type SnapshotId = Uuid;

/// Competitive rank tier ladder, ordered weakest to strongest.
///
/// `Unranked` sits below the ladder proper and is excluded from every
/// rank-derived score by the eligibility gates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
#[repr(u8)]
pub enum RankTier {
    Unranked = 0,
    Iron = 1,
    Bronze = 2,
    Silver = 3,
    Gold = 4,
    Platinum = 5,
    Emerald = 6,
    Diamond = 7,
    Master = 8,
    Grandmaster = 9,
    Challenger = 10,
}

impl RankTier {
    /// Position on the ladder (0 for Unranked through 10 for Challenger)
    pub fn index(&self) -> u32 {
        *self as u32
    }

    /// Whether this tier participates in rank-derived leaderboards
    pub fn is_ranked(&self) -> bool {
        *self != RankTier::Unranked
    }

    /// Divisions exist only in the Gold through Diamond band
    pub fn has_divisions(&self) -> bool {
        (RankTier::Gold..=RankTier::Diamond).contains(self)
    }

    /// Master and above track league points instead of divisions
    pub fn uses_league_points(&self) -> bool {
        *self >= RankTier::Master
    }
}

impl std::fmt::Display for RankTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Sub-rank within a tier; I is the strongest, IV the weakest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    I,
    II,
    III,
    IV,
}

impl std::fmt::Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The five leaderboards the service materializes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardVariant {
    Overall,
    Skill,
    Personality,
    Rank,
    Ingame,
}

impl LeaderboardVariant {
    /// Wire/query-string name of the variant
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardVariant::Overall => "overall",
            LeaderboardVariant::Skill => "skill",
            LeaderboardVariant::Personality => "personality",
            LeaderboardVariant::Rank => "rank",
            LeaderboardVariant::Ingame => "ingame",
        }
    }
}

impl std::fmt::Display for LeaderboardVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LeaderboardVariant {
    type Err = LeaderboardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "overall" => Ok(LeaderboardVariant::Overall),
            "skill" => Ok(LeaderboardVariant::Skill),
            "personality" => Ok(LeaderboardVariant::Personality),
            "rank" => Ok(LeaderboardVariant::Rank),
            "ingame" => Ok(LeaderboardVariant::Ingame),
            other => Err(LeaderboardError::InvalidVariant {
                requested: other.to_string(),
            }),
        }
    }
}

/// Raw per-user signals the scoring pipeline consumes.
///
/// Owned and updated by the signal store; this service only reads them.
/// `division` is meaningful only for Gold..Diamond and `league_points`
/// only for Master and above; scoring gates on tier so a malformed
/// combination cannot leak into a score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSignals {
    pub user_id: UserId,
    /// Peer-rated skill average in [0.0, 5.0]
    pub skill_average: f64,
    /// Peer-rated personality average in [0.0, 5.0]
    pub personality_average: f64,
    /// Number of ratings backing both averages
    pub rating_count: u32,
    pub rank_tier: RankTier,
    pub division: Option<Division>,
    pub league_points: u32,
    /// Win percentage in [0.0, 100.0]; `None` when no games are tracked
    pub win_rate: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

/// Presentation fields attached to leaderboard entries at read time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub username: String,
    pub badges: Vec<String>,
    pub region: String,
}

/// AMQP Message Types
/// Broadcast asking the service to recompute one or more leaderboards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidateRankings {
    /// Variants to invalidate; `None` means all of them
    pub variants: Option<Vec<LeaderboardVariant>>,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Event emitted after a snapshot is successfully published
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardPublished {
    pub variant: LeaderboardVariant,
    pub snapshot_id: SnapshotId,
    pub total_entries: usize,
    pub timestamp: DateTime<Utc>,
}

/// Union type for all AMQP messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AmqpMessage {
    InvalidateRankings(InvalidateRankings),
    LeaderboardPublished(LeaderboardPublished),
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_tier_ladder_ordering() {
        assert!(RankTier::Unranked < RankTier::Iron);
        assert!(RankTier::Gold < RankTier::Platinum);
        assert!(RankTier::Grandmaster < RankTier::Challenger);
        assert_eq!(RankTier::Iron.index(), 1);
        assert_eq!(RankTier::Challenger.index(), 10);
    }

    #[test]
    fn test_tier_band_helpers() {
        assert!(!RankTier::Unranked.is_ranked());
        assert!(RankTier::Iron.is_ranked());

        assert!(!RankTier::Silver.has_divisions());
        assert!(RankTier::Gold.has_divisions());
        assert!(RankTier::Diamond.has_divisions());
        assert!(!RankTier::Master.has_divisions());

        assert!(!RankTier::Diamond.uses_league_points());
        assert!(RankTier::Master.uses_league_points());
        assert!(RankTier::Challenger.uses_league_points());
    }

    #[test]
    fn test_variant_parsing_round_trip() {
        for variant in LeaderboardVariant::iter() {
            let parsed: LeaderboardVariant = variant.as_str().parse().unwrap();
            assert_eq!(parsed, variant);
        }
    }

    #[test]
    fn test_variant_parsing_rejects_unknown() {
        let result = "weekly".parse::<LeaderboardVariant>();
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("weekly"));
    }

    #[test]
    fn test_variant_serde_uses_wire_names() {
        let json = serde_json::to_string(&LeaderboardVariant::Ingame).unwrap();
        assert_eq!(json, "\"ingame\"");
        let parsed: LeaderboardVariant = serde_json::from_str("\"overall\"").unwrap();
        assert_eq!(parsed, LeaderboardVariant::Overall);
    }
}
