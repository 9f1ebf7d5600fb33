//! Signal store interface and implementations
//!
//! This module defines the interface for retrieving user signals and
//! presentation profiles. The engine never writes signals; ingestion and
//! verification happen upstream.

use crate::types::{UserId, UserProfile, UserSignals};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// Trait for signal retrieval operations
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Get the latest signals for every known user (full pull, eventually consistent)
    async fn get_all_user_signals(&self) -> crate::error::Result<Vec<UserSignals>>;

    /// Get the presentation profile for a user, if one exists
    async fn get_profile(&self, user_id: &UserId) -> crate::error::Result<Option<UserProfile>>;
}

/// In-memory signal store implementation
#[derive(Debug, Default)]
pub struct InMemorySignalStore {
    signals: RwLock<HashMap<UserId, UserSignals>>,
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemorySignalStore {
    /// Create a new empty in-memory signal store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user's signals
    pub fn upsert_signals(&self, signals: UserSignals) -> crate::error::Result<()> {
        let mut store =
            self.signals
                .write()
                .map_err(|_| crate::error::LeaderboardError::InternalError {
                    message: "Failed to acquire signals write lock".to_string(),
                })?;

        store.insert(signals.user_id.clone(), signals);
        Ok(())
    }

    /// Insert or replace a user's presentation profile
    pub fn upsert_profile(&self, profile: UserProfile) -> crate::error::Result<()> {
        let mut profiles =
            self.profiles
                .write()
                .map_err(|_| crate::error::LeaderboardError::InternalError {
                    message: "Failed to acquire profiles write lock".to_string(),
                })?;

        profiles.insert(profile.user_id.clone(), profile);
        Ok(())
    }

    /// Remove a user's signals and profile entirely
    pub fn remove_user(&self, user_id: &UserId) -> crate::error::Result<bool> {
        let mut signals =
            self.signals
                .write()
                .map_err(|_| crate::error::LeaderboardError::InternalError {
                    message: "Failed to acquire signals write lock".to_string(),
                })?;
        let mut profiles =
            self.profiles
                .write()
                .map_err(|_| crate::error::LeaderboardError::InternalError {
                    message: "Failed to acquire profiles write lock".to_string(),
                })?;

        let had_signals = signals.remove(user_id).is_some();
        profiles.remove(user_id);
        Ok(had_signals)
    }

    /// Number of users with signals
    pub fn user_count(&self) -> crate::error::Result<usize> {
        let signals =
            self.signals
                .read()
                .map_err(|_| crate::error::LeaderboardError::InternalError {
                    message: "Failed to acquire signals read lock".to_string(),
                })?;

        Ok(signals.len())
    }
}

#[async_trait]
impl SignalStore for InMemorySignalStore {
    async fn get_all_user_signals(&self) -> crate::error::Result<Vec<UserSignals>> {
        let signals =
            self.signals
                .read()
                .map_err(|_| crate::error::LeaderboardError::InternalError {
                    message: "Failed to acquire signals read lock".to_string(),
                })?;

        Ok(signals.values().cloned().collect())
    }

    async fn get_profile(&self, user_id: &UserId) -> crate::error::Result<Option<UserProfile>> {
        let profiles =
            self.profiles
                .read()
                .map_err(|_| crate::error::LeaderboardError::InternalError {
                    message: "Failed to acquire profiles read lock".to_string(),
                })?;

        Ok(profiles.get(user_id).cloned())
    }
}

/// Mock signal store for testing
///
/// Supports preset data, fetch failure injection, and artificial fetch
/// latency so refresh timeout handling can be exercised.
#[derive(Debug, Default)]
pub struct MockSignalStore {
    signals: RwLock<Vec<UserSignals>>,
    profiles: RwLock<HashMap<UserId, UserProfile>>,
    fail_fetches: RwLock<bool>,
    fetch_delay: RwLock<Option<Duration>>,
    fetch_calls: AtomicUsize,
}

impl MockSignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset the signal set returned by `get_all_user_signals`
    pub fn preset_signals(&self, signals: Vec<UserSignals>) {
        if let Ok(mut store) = self.signals.write() {
            *store = signals;
        }
    }

    /// Preset profiles returned by `get_profile`
    pub fn preset_profiles(&self, profiles: Vec<UserProfile>) {
        if let Ok(mut store) = self.profiles.write() {
            *store = profiles
                .into_iter()
                .map(|profile| (profile.user_id.clone(), profile))
                .collect();
        }
    }

    /// Make subsequent fetches fail
    pub fn set_fail_fetches(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_fetches.write() {
            *flag = fail;
        }
    }

    /// Delay every fetch by the given duration
    pub fn set_fetch_delay(&self, delay: Option<Duration>) {
        if let Ok(mut slot) = self.fetch_delay.write() {
            *slot = delay;
        }
    }

    /// Number of full-pull fetches made (for testing)
    pub fn fetch_call_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalStore for MockSignalStore {
    async fn get_all_user_signals(&self) -> crate::error::Result<Vec<UserSignals>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.fetch_delay.read().map(|slot| *slot).unwrap_or(None);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let should_fail = self.fail_fetches.read().map(|flag| *flag).unwrap_or(false);
        if should_fail {
            return Err(crate::error::LeaderboardError::SourceUnavailable {
                message: "Mock signal store configured to fail".to_string(),
            }
            .into());
        }

        let signals =
            self.signals
                .read()
                .map_err(|_| crate::error::LeaderboardError::InternalError {
                    message: "Failed to acquire signals read lock".to_string(),
                })?;

        Ok(signals.clone())
    }

    async fn get_profile(&self, user_id: &UserId) -> crate::error::Result<Option<UserProfile>> {
        let profiles =
            self.profiles
                .read()
                .map_err(|_| crate::error::LeaderboardError::InternalError {
                    message: "Failed to acquire profiles read lock".to_string(),
                })?;

        Ok(profiles.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RankTier;
    use crate::utils::current_timestamp;

    fn create_test_signals(user_id: &str, rating_count: u32) -> UserSignals {
        UserSignals {
            user_id: user_id.to_string(),
            skill_average: 4.0,
            personality_average: 3.5,
            rating_count,
            rank_tier: RankTier::Silver,
            division: None,
            league_points: 0,
            win_rate: Some(50.0),
            updated_at: current_timestamp(),
        }
    }

    fn create_test_profile(user_id: &str, username: &str) -> UserProfile {
        UserProfile {
            user_id: user_id.to_string(),
            username: username.to_string(),
            badges: vec!["founder".to_string()],
            region: "euw".to_string(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_store_basic_operations() {
        let store = InMemorySignalStore::new();

        // Initially empty
        assert!(store.get_all_user_signals().await.unwrap().is_empty());
        assert_eq!(store.user_count().unwrap(), 0);

        store.upsert_signals(create_test_signals("user1", 5)).unwrap();
        store.upsert_signals(create_test_signals("user2", 3)).unwrap();

        let all = store.get_all_user_signals().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(store.user_count().unwrap(), 2);

        // Upsert replaces in place
        let mut updated = create_test_signals("user1", 9);
        updated.skill_average = 4.8;
        store.upsert_signals(updated).unwrap();

        let all = store.get_all_user_signals().await.unwrap();
        assert_eq!(all.len(), 2);
        let user1 = all.iter().find(|s| s.user_id == "user1").unwrap();
        assert_eq!(user1.rating_count, 9);
        assert_eq!(user1.skill_average, 4.8);
    }

    #[tokio::test]
    async fn test_in_memory_store_profiles() {
        let store = InMemorySignalStore::new();

        assert!(store
            .get_profile(&"user1".to_string())
            .await
            .unwrap()
            .is_none());

        store
            .upsert_profile(create_test_profile("user1", "ShotCaller"))
            .unwrap();

        let profile = store
            .get_profile(&"user1".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.username, "ShotCaller");
        assert_eq!(profile.region, "euw");
    }

    #[tokio::test]
    async fn test_in_memory_store_removal() {
        let store = InMemorySignalStore::new();
        store.upsert_signals(create_test_signals("user1", 5)).unwrap();
        store
            .upsert_profile(create_test_profile("user1", "ShotCaller"))
            .unwrap();

        assert!(store.remove_user(&"user1".to_string()).unwrap());
        assert_eq!(store.user_count().unwrap(), 0);
        assert!(store
            .get_profile(&"user1".to_string())
            .await
            .unwrap()
            .is_none());

        // Removing an unknown user reports false
        assert!(!store.remove_user(&"ghost".to_string()).unwrap());
    }

    #[tokio::test]
    async fn test_mock_store_failure_injection() {
        let store = MockSignalStore::new();
        store.preset_signals(vec![create_test_signals("user1", 5)]);

        assert_eq!(store.get_all_user_signals().await.unwrap().len(), 1);

        store.set_fail_fetches(true);
        assert!(store.get_all_user_signals().await.is_err());

        store.set_fail_fetches(false);
        assert_eq!(store.get_all_user_signals().await.unwrap().len(), 1);

        // Every attempt counted, including the failed one
        assert_eq!(store.fetch_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_store_fetch_delay() {
        let store = MockSignalStore::new();
        store.set_fetch_delay(Some(Duration::from_millis(20)));

        let started = std::time::Instant::now();
        store.get_all_user_signals().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
