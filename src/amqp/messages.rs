//! AMQP message definitions and serialization

use crate::error::{LeaderboardError, Result};
use crate::types::*;
use serde_json;

/// AMQP queue names
pub const INVALIDATION_QUEUE: &str = "leaderboard.invalidations";
pub const LEADERBOARD_EVENTS_EXCHANGE: &str = "leaderboard.events";

/// Routing keys for events
pub const RANKINGS_INVALIDATED_ROUTING_KEY: &str = "rankings.invalidate";
pub const LEADERBOARD_PUBLISHED_ROUTING_KEY: &str = "leaderboard.published";

/// Message envelope with metadata
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MessageEnvelope<T> {
    pub payload: T,
    pub correlation_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub routing_key: String,
}

impl<T> MessageEnvelope<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Create a new message envelope
    pub fn new(payload: T, routing_key: String) -> Self {
        Self {
            payload,
            correlation_id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now(),
            routing_key,
        }
    }

    /// Serialize the envelope to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| {
            LeaderboardError::InternalError {
                message: format!("Failed to serialize message: {}", e),
            }
            .into()
        })
    }

    /// Deserialize envelope from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            LeaderboardError::InvalidMessage {
                reason: format!("Failed to deserialize message: {}", e),
            }
            .into()
        })
    }
}

/// Message serialization and validation utilities
pub struct MessageUtils;

impl MessageUtils {
    /// Serialize an invalidation request to bytes
    pub fn serialize_invalidation(request: &InvalidateRankings) -> Result<Vec<u8>> {
        Self::validate_invalidation(request)?;
        serde_json::to_vec(request).map_err(|e| {
            LeaderboardError::InternalError {
                message: format!("Failed to serialize invalidation: {}", e),
            }
            .into()
        })
    }

    /// Deserialize invalidation request from bytes
    pub fn deserialize_invalidation(bytes: &[u8]) -> Result<InvalidateRankings> {
        let request: InvalidateRankings =
            serde_json::from_slice(bytes).map_err(|e| LeaderboardError::InvalidMessage {
                reason: format!("Failed to deserialize invalidation: {}", e),
            })?;

        Self::validate_invalidation(&request)?;
        Ok(request)
    }

    /// Validate an invalidation request
    pub fn validate_invalidation(request: &InvalidateRankings) -> Result<()> {
        if request.reason.is_empty() {
            return Err(LeaderboardError::InvalidMessage {
                reason: "Invalidation reason cannot be empty".to_string(),
            }
            .into());
        }

        // An explicit empty list would invalidate nothing; callers that want
        // everything refreshed must omit the field instead
        if let Some(variants) = &request.variants {
            if variants.is_empty() {
                return Err(LeaderboardError::InvalidMessage {
                    reason: "Variant list cannot be empty; omit it to invalidate all".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Serialize any AMQP message to bytes
    pub fn serialize_message<T: serde::Serialize>(message: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(message).map_err(|e| {
            LeaderboardError::InternalError {
                message: format!("Failed to serialize message: {}", e),
            }
            .into()
        })
    }

    /// Get routing key for a message type
    pub fn get_routing_key(message: &AmqpMessage) -> &'static str {
        match message {
            AmqpMessage::InvalidateRankings(_) => RANKINGS_INVALIDATED_ROUTING_KEY,
            AmqpMessage::LeaderboardPublished(_) => LEADERBOARD_PUBLISHED_ROUTING_KEY,
        }
    }
}
