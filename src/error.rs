//! Error types for the leaderboard service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific leaderboard scenarios
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("AMQP connection failed: {message}")]
    AmqpConnectionFailed { message: String },

    #[error("Unknown leaderboard type: {requested}")]
    InvalidVariant { requested: String },

    #[error("Invalid message: {reason}")]
    InvalidMessage { reason: String },

    #[error("Signal source unavailable: {message}")]
    SourceUnavailable { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}
