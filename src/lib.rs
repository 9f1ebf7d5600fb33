//! Podium - Leaderboard scoring and ranking engine
//!
//! This crate computes the platform's five leaderboard views from rated
//! user signals, publishes immutable ranking snapshots, and serves them
//! over a paginated HTTP API with AMQP-driven invalidation.

pub mod amqp;
pub mod api;
pub mod config;
pub mod error;
pub mod leaderboard;
pub mod metrics;
pub mod scoring;
pub mod service;
pub mod signals;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LeaderboardError, Result};
pub use types::*;

// Re-export key components
pub use amqp::publisher::EventPublisher;
pub use leaderboard::{RecomputeCoordinator, Snapshot};
pub use signals::{InMemorySignalStore, SignalStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
