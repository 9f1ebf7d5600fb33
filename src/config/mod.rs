//! Configuration management for the podium service
//!
//! This module handles all configuration loading from environment
//! variables and TOML files, validation, and default values for the
//! leaderboard service.

pub mod app;

// Re-export commonly used types
pub use app::{
    validate_config, AmqpSettings, AppConfig, LeaderboardSettings, ServiceSettings,
};
