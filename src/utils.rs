//! Utility functions for the leaderboard service

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique snapshot ID
pub fn generate_snapshot_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Round a value to one decimal place
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round a value to the nearest integer
pub fn round_to_integer(value: f64) -> f64 {
    value.round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_snapshot_id();
        let id2 = generate_snapshot_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(4.55), 4.6);
        assert_eq!(round_to_tenth(4.54), 4.5);
        assert_eq!(round_to_tenth(4.0), 4.0);
    }

    #[test]
    fn test_round_to_integer() {
        assert_eq!(round_to_integer(1909.5), 1910.0);
        assert_eq!(round_to_integer(1909.4), 1909.0);
        assert_eq!(round_to_integer(8140.0), 8140.0);
    }
}
