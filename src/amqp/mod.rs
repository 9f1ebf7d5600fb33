//! AMQP integration for the leaderboard service
//!
//! This module handles the AMQP connection, the invalidation consumer and
//! outbound event publishing for the leaderboard microservice.

pub mod connection;
pub mod handlers;
pub mod messages;
pub mod publisher;

// Re-export commonly used types
pub use connection::AmqpConnection;
pub use handlers::MessageHandler;
pub use messages::*;
pub use publisher::EventPublisher;
