//! AMQP message handlers for processing invalidation requests
//!
//! This module provides the message handling infrastructure for the leaderboard
//! service. Invalidation requests arrive on a queue and are forwarded to a
//! handler that marks the affected variants stale and schedules recomputes.

use crate::amqp::messages::MessageUtils;
use crate::error::{LeaderboardError, Result};
use crate::types::InvalidateRankings;
use amqprs::{
    channel::{BasicAckArguments, BasicCancelArguments, BasicConsumeArguments, Channel},
    consumer::AsyncConsumer,
    BasicProperties, Deliver,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

/// Trait defining the interface for handling AMQP messages
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle an invalidation request from the platform
    async fn handle_invalidation(&self, request: InvalidateRankings) -> Result<()>;

    /// Handle processing errors
    async fn handle_error(&self, error: LeaderboardError, message_data: &[u8]);
}

/// Consumer for handling invalidation messages
pub struct InvalidationConsumer {
    handler: Arc<dyn MessageHandler>,
    channel: Channel,
    consumer_tag: String,
}

impl InvalidationConsumer {
    /// Create a new invalidation consumer
    pub fn new(handler: Arc<dyn MessageHandler>, channel: Channel) -> Self {
        let consumer_tag = format!("invalidation-consumer-{}", uuid::Uuid::new_v4());

        Self {
            handler,
            channel,
            consumer_tag,
        }
    }

    /// Start consuming messages from the queue
    pub async fn start_consuming(&self, queue_name: &str) -> Result<()> {
        let args = BasicConsumeArguments::new(queue_name, &self.consumer_tag);

        self.channel
            .basic_consume(InvalidationQueueConsumer::new(self.handler.clone()), args)
            .await
            .map_err(|e| LeaderboardError::AmqpConnectionFailed {
                message: format!("Failed to start consuming: {}", e),
            })?;

        info!("Started consuming messages from queue: {}", queue_name);
        Ok(())
    }

    /// Stop consuming messages
    pub async fn stop_consuming(&self) -> Result<()> {
        let args = BasicCancelArguments::new(&self.consumer_tag);

        self.channel.basic_cancel(args).await.map_err(|e| {
            LeaderboardError::AmqpConnectionFailed {
                message: format!("Failed to stop consuming: {}", e),
            }
        })?;

        info!("Stopped consuming messages");
        Ok(())
    }
}

/// Internal consumer implementation
struct InvalidationQueueConsumer {
    handler: Arc<dyn MessageHandler>,
}

impl InvalidationQueueConsumer {
    fn new(handler: Arc<dyn MessageHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl AsyncConsumer for InvalidationQueueConsumer {
    async fn consume(
        &mut self,
        channel: &Channel,
        deliver: Deliver,
        _basic_properties: BasicProperties,
        _content: Vec<u8>,
    ) {
        let delivery_tag = deliver.delivery_tag();

        info!(
            "Invalidation message received - delivery_tag: {}, routing_key: '{}', size: {} bytes",
            delivery_tag,
            deliver.routing_key(),
            _content.len()
        );

        let start_time = std::time::Instant::now();

        match self.process_message(&_content).await {
            Ok(_) => {
                info!(
                    "Invalidation handled - delivery_tag: {}, took: {:.2}ms",
                    delivery_tag,
                    start_time.elapsed().as_secs_f64() * 1000.0
                );
            }
            Err(e) => {
                error!(
                    "Invalidation handling failed - delivery_tag: {}, took: {:.2}ms, error: {}",
                    delivery_tag,
                    start_time.elapsed().as_secs_f64() * 1000.0,
                    e
                );
                self.handler
                    .handle_error(
                        LeaderboardError::InternalError {
                            message: e.to_string(),
                        },
                        &_content,
                    )
                    .await;
            }
        }

        // Invalidations are idempotent, so acknowledge either way rather
        // than letting a poison message redeliver forever
        let args = BasicAckArguments::new(delivery_tag, false);
        if let Err(e) = channel.basic_ack(args).await {
            error!("Failed to ack message {}: {}", delivery_tag, e);
        }
    }
}

impl InvalidationQueueConsumer {
    /// Process an incoming message
    async fn process_message(&self, content: &[u8]) -> Result<()> {
        let request = MessageUtils::deserialize_invalidation(content)?;

        match &request.variants {
            Some(variants) => info!(
                "Invalidation parsed - variants: {:?}, reason: '{}'",
                variants, request.reason
            ),
            None => info!(
                "Invalidation parsed - all variants, reason: '{}'",
                request.reason
            ),
        }

        self.handler.handle_invalidation(request).await?;

        Ok(())
    }
}

/// Mock message handler for testing
pub struct MockMessageHandler {
    pub received_invalidations: Arc<tokio::sync::Mutex<Vec<InvalidateRankings>>>,
}

impl Default for MockMessageHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMessageHandler {
    pub fn new() -> Self {
        Self {
            received_invalidations: Arc::new(tokio::sync::Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl MessageHandler for MockMessageHandler {
    async fn handle_invalidation(&self, request: InvalidateRankings) -> Result<()> {
        let mut requests = self.received_invalidations.lock().await;
        requests.push(request);
        Ok(())
    }

    async fn handle_error(&self, error: LeaderboardError, _message_data: &[u8]) {
        eprintln!("Mock handler received error: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use crate::types::LeaderboardVariant;

    use super::*;

    fn create_test_invalidation() -> InvalidateRankings {
        InvalidateRankings {
            variants: Some(vec![LeaderboardVariant::Overall]),
            reason: "signal backfill".to_string(),
            timestamp: crate::utils::current_timestamp(),
        }
    }

    #[tokio::test]
    async fn test_mock_handler() {
        let handler = MockMessageHandler::new();
        let request = create_test_invalidation();

        handler.handle_invalidation(request.clone()).await.unwrap();

        let received = handler.received_invalidations.lock().await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].reason, request.reason);
    }
}
