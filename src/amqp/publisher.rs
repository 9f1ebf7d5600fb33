//! AMQP event publisher for outbound events

use crate::amqp::messages::{
    MessageEnvelope, LEADERBOARD_EVENTS_EXCHANGE, LEADERBOARD_PUBLISHED_ROUTING_KEY,
};
use crate::error::{LeaderboardError, Result};
use crate::types::*;
use amqprs::{
    channel::{BasicPublishArguments, Channel, ExchangeDeclareArguments},
    BasicProperties,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

/// Trait for publishing leaderboard events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a LeaderboardPublished event
    async fn publish_leaderboard_published(&self, event: LeaderboardPublished) -> Result<()>;
}

/// Configuration for event publishing
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub enable_deduplication: bool,
    pub publish_timeout_ms: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 500,
            enable_deduplication: true,
            publish_timeout_ms: 5000,
        }
    }
}

/// Dedup cache cap; a full cache starts a fresh window
const DEDUP_CACHE_LIMIT: usize = 1024;

/// Bounded record of already-published correlation ids
#[derive(Debug, Default)]
struct DedupCache {
    ids: Mutex<HashSet<String>>,
}

impl DedupCache {
    fn contains(&self, correlation_id: &str) -> Result<bool> {
        let ids = self
            .ids
            .lock()
            .map_err(|_| LeaderboardError::InternalError {
                message: "Failed to acquire dedup cache lock".to_string(),
            })?;
        Ok(ids.contains(correlation_id))
    }

    fn remember(&self, correlation_id: &str) -> Result<()> {
        let mut ids = self
            .ids
            .lock()
            .map_err(|_| LeaderboardError::InternalError {
                message: "Failed to acquire dedup cache lock".to_string(),
            })?;

        // Correlation ids never repeat, so only a recent window is needed
        if ids.len() >= DEDUP_CACHE_LIMIT {
            ids.clear();
        }
        ids.insert(correlation_id.to_string());
        Ok(())
    }

    fn len(&self) -> usize {
        self.ids.lock().map(|ids| ids.len()).unwrap_or(0)
    }
}

/// AMQP-based event publisher implementation
pub struct AmqpEventPublisher {
    channel: Channel,
    config: PublisherConfig,
    dedup: DedupCache,
}

impl AmqpEventPublisher {
    /// Create a new event publisher
    pub async fn new(channel: Channel, config: PublisherConfig) -> Result<Self> {
        let publisher = Self {
            channel,
            config,
            dedup: DedupCache::default(),
        };

        publisher.declare_events_exchange().await?;

        Ok(publisher)
    }

    /// Declare the topic exchange that carries leaderboard events
    async fn declare_events_exchange(&self) -> Result<()> {
        let args = ExchangeDeclareArguments::new(LEADERBOARD_EVENTS_EXCHANGE, "topic");
        self.channel.exchange_declare(args).await.map_err(|e| {
            LeaderboardError::AmqpConnectionFailed {
                message: format!("Failed to declare leaderboard events exchange: {}", e),
            }
        })?;

        info!(
            "Declared AMQP exchange {} for leaderboard events",
            LEADERBOARD_EVENTS_EXCHANGE
        );
        Ok(())
    }

    /// Publish an envelope with retry and duplicate suppression
    async fn publish_with_retry(
        &self,
        envelope: &MessageEnvelope<LeaderboardPublished>,
    ) -> Result<()> {
        if self.config.enable_deduplication && self.dedup.contains(&envelope.correlation_id)? {
            debug!(
                "Message {} already published, skipping",
                envelope.correlation_id
            );
            return Ok(());
        }

        let mut delay = Duration::from_millis(self.config.retry_delay_ms);
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                warn!(
                    "Publish attempt {}/{} for message {} failed: {}. Retrying in {:?}",
                    attempt, self.config.max_retries, envelope.correlation_id, last_error, delay
                );
                sleep(delay).await;
                delay = Duration::from_millis((delay.as_millis() as u64 * 2).min(5000));
            }

            match self.try_publish(envelope).await {
                Ok(()) => {
                    if self.config.enable_deduplication {
                        self.dedup.remember(&envelope.correlation_id)?;
                    }

                    debug!(
                        "Published message {} for variant {}",
                        envelope.correlation_id, envelope.payload.variant
                    );
                    return Ok(());
                }
                Err(e) => last_error = e.to_string(),
            }
        }

        error!(
            "Failed to publish message {} after {} retries: {}",
            envelope.correlation_id, self.config.max_retries, last_error
        );
        Err(LeaderboardError::AmqpConnectionFailed {
            message: format!("Publish gave up after retries: {}", last_error),
        }
        .into())
    }

    /// Single publish attempt, bounded by the configured timeout
    async fn try_publish(&self, envelope: &MessageEnvelope<LeaderboardPublished>) -> Result<()> {
        let payload = envelope.to_bytes()?;

        let args = BasicPublishArguments::new(LEADERBOARD_EVENTS_EXCHANGE, &envelope.routing_key);
        let mut properties = BasicProperties::default();
        properties
            .with_message_id(&envelope.correlation_id)
            .with_timestamp(envelope.timestamp.timestamp() as u64)
            .with_content_type("application/json");

        let publish = timeout(
            Duration::from_millis(self.config.publish_timeout_ms),
            self.channel.basic_publish(properties, payload, args),
        );

        match publish.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(LeaderboardError::AmqpConnectionFailed {
                message: format!("Failed to publish message: {}", e),
            }
            .into()),
            Err(_) => Err(LeaderboardError::AmqpConnectionFailed {
                message: format!(
                    "Publish timed out after {}ms",
                    self.config.publish_timeout_ms
                ),
            }
            .into()),
        }
    }

    /// Number of correlation ids currently held for deduplication
    pub fn dedup_cache_size(&self) -> usize {
        self.dedup.len()
    }
}

#[async_trait]
impl EventPublisher for AmqpEventPublisher {
    async fn publish_leaderboard_published(&self, event: LeaderboardPublished) -> Result<()> {
        let envelope = MessageEnvelope::new(event, LEADERBOARD_PUBLISHED_ROUTING_KEY.to_string());
        self.publish_with_retry(&envelope).await
    }
}

/// Publisher that drops all events, used when AMQP is disabled
#[derive(Debug, Default)]
pub struct NoOpEventPublisher;

impl NoOpEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish_leaderboard_published(&self, event: LeaderboardPublished) -> Result<()> {
        debug!(
            "AMQP disabled, dropping LeaderboardPublished event for {}",
            event.variant
        );
        Ok(())
    }
}

/// Mock event publisher for testing
#[derive(Debug, Default)]
pub struct MockEventPublisher {
    published_events: Mutex<Vec<LeaderboardPublished>>,
    fail_publishes: AtomicBool,
}

impl MockEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all published events (for testing)
    pub fn published_events(&self) -> Vec<LeaderboardPublished> {
        self.published_events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Make subsequent publishes fail (for testing)
    pub fn set_fail_publishes(&self, fail: bool) {
        self.fail_publishes.store(fail, Ordering::SeqCst);
    }

    /// Clear published events (for testing)
    pub fn clear_events(&self) {
        if let Ok(mut events) = self.published_events.lock() {
            events.clear();
        }
    }
}

#[async_trait]
impl EventPublisher for MockEventPublisher {
    async fn publish_leaderboard_published(&self, event: LeaderboardPublished) -> Result<()> {
        if self.fail_publishes.load(Ordering::SeqCst) {
            return Err(LeaderboardError::AmqpConnectionFailed {
                message: "Mock publisher configured to fail".to_string(),
            }
            .into());
        }

        if let Ok(mut events) = self.published_events.lock() {
            events.push(event);
        }
        Ok(())
    }
}
