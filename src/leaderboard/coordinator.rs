//! Recompute coordination and snapshot publication
//!
//! This module owns the materialized leaderboards. Each variant has one
//! slot holding the currently-published snapshot behind a lock whose
//! critical section is a pointer clone, so readers never observe a
//! partially-built ranking and never wait on a recompute in flight.

use crate::amqp::publisher::EventPublisher;
use crate::config::app::LeaderboardSettings;
use crate::error::{LeaderboardError, Result};
use crate::leaderboard::ranking::build_snapshot;
use crate::leaderboard::snapshot::{PageSlice, Snapshot};
use crate::metrics::MetricsCollector;
use crate::signals::SignalStore;
use crate::types::{LeaderboardPublished, LeaderboardVariant, UserSignals};
use crate::utils::current_timestamp;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock};
use strum::IntoEnumIterator;
use tokio::time::{timeout, Duration, Instant};
use tracing::{debug, info, warn};

/// Lifecycle of one variant's materialized ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VariantState {
    /// No snapshot yet, or the published one has been invalidated
    Stale,
    /// A recompute is in flight; the previous snapshot (if any) still serves
    Refreshing,
    /// The latest recompute completed and its snapshot is being served
    Published,
}

/// Result of a refresh request for one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot was computed and swapped in
    Published { total: usize },
    /// A refresh was already in flight for this variant
    Coalesced,
}

/// Counters describing coordinator activity since startup
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoordinatorStats {
    pub refreshes_completed: u64,
    pub refreshes_failed: u64,
    pub refreshes_coalesced: u64,
    pub invalidations: u64,
    pub pages_served: u64,
}

/// Introspection view of one variant's slot, for health and stats endpoints
#[derive(Debug, Clone, Serialize)]
pub struct VariantStatus {
    pub variant: LeaderboardVariant,
    pub state: VariantState,
    pub total_entries: usize,
    pub last_refreshed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Per-variant storage for the published snapshot and refresh bookkeeping
#[derive(Debug)]
struct VariantSlot {
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    state: RwLock<VariantState>,
    refresh_in_flight: AtomicBool,
    last_refreshed_at: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<String>>,
}

impl VariantSlot {
    fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
            state: RwLock::new(VariantState::Stale),
            refresh_in_flight: AtomicBool::new(false),
            last_refreshed_at: RwLock::new(None),
            last_error: RwLock::new(None),
        }
    }
}

/// Coordinates leaderboard recomputes and serves published snapshots
pub struct RecomputeCoordinator {
    /// One slot per variant, fixed at construction
    slots: HashMap<LeaderboardVariant, VariantSlot>,
    /// Source of raw user signals
    signal_store: Arc<dyn SignalStore>,
    /// Publisher for post-publication events
    event_publisher: Arc<dyn EventPublisher>,
    /// Metrics collector for recording refresh and serving activity
    metrics_collector: Arc<MetricsCollector>,
    /// Budget for the full signal pull at the start of a refresh
    fetch_timeout: Duration,
    /// Page size used when the caller does not supply one
    default_page_limit: usize,
    /// Hard cap applied to requested page sizes
    max_page_limit: usize,
    /// Coordinator statistics
    stats: RwLock<CoordinatorStats>,
}

impl RecomputeCoordinator {
    /// Create a coordinator with default settings
    pub fn new(
        signal_store: Arc<dyn SignalStore>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        let metrics_collector = Arc::new(MetricsCollector::new().unwrap_or_else(|_| {
            warn!("Failed to create metrics collector, using default");
            MetricsCollector::default()
        }));

        Self::with_settings(
            signal_store,
            event_publisher,
            metrics_collector,
            &LeaderboardSettings::default(),
        )
    }

    /// Create a coordinator with explicit settings and metrics
    pub fn with_settings(
        signal_store: Arc<dyn SignalStore>,
        event_publisher: Arc<dyn EventPublisher>,
        metrics_collector: Arc<MetricsCollector>,
        settings: &LeaderboardSettings,
    ) -> Self {
        let slots = LeaderboardVariant::iter()
            .map(|variant| (variant, VariantSlot::new()))
            .collect();

        Self {
            slots,
            signal_store,
            event_publisher,
            metrics_collector,
            fetch_timeout: settings.fetch_timeout(),
            default_page_limit: settings.default_page_limit,
            max_page_limit: settings.max_page_limit,
            stats: RwLock::new(CoordinatorStats::default()),
        }
    }

    /// Recompute one variant and atomically publish the result.
    ///
    /// At most one refresh runs per variant; a request arriving while one
    /// is in flight coalesces into it instead of queueing behind it. On
    /// failure the previously published snapshot keeps serving.
    pub async fn refresh(&self, variant: LeaderboardVariant) -> Result<RefreshOutcome> {
        let slot = self.slot(variant);

        if slot
            .refresh_in_flight
            .compare_exchange(false, true, AtomicOrdering::SeqCst, AtomicOrdering::SeqCst)
            .is_err()
        {
            debug!(
                "Refresh already in flight for {} leaderboard, coalescing",
                variant
            );
            self.bump_stats(|stats| stats.refreshes_coalesced += 1);
            self.metrics_collector.record_refresh_coalesced(variant);
            return Ok(RefreshOutcome::Coalesced);
        }

        let outcome = self.run_refresh(variant, slot).await;
        slot.refresh_in_flight.store(false, AtomicOrdering::SeqCst);
        outcome
    }

    async fn run_refresh(
        &self,
        variant: LeaderboardVariant,
        slot: &VariantSlot,
    ) -> Result<RefreshOutcome> {
        let started = Instant::now();
        self.set_state(slot, VariantState::Refreshing);

        info!("Refreshing {} leaderboard...", variant);

        let fetch = timeout(self.fetch_timeout, self.signal_store.get_all_user_signals()).await;
        let signals: Vec<UserSignals> = match fetch {
            Ok(Ok(signals)) => signals,
            Ok(Err(e)) => {
                return self.fail_refresh(variant, slot, format!("signal fetch failed: {}", e));
            }
            Err(_) => {
                return self.fail_refresh(
                    variant,
                    slot,
                    format!("signal fetch timed out after {:?}", self.fetch_timeout),
                );
            }
        };

        let snapshot = Arc::new(build_snapshot(&signals, variant));
        let total = snapshot.total();
        let snapshot_id = snapshot.snapshot_id;

        // Swap the published pointer; readers see the old snapshot or the
        // new one, never anything in between
        {
            let mut published =
                slot.snapshot
                    .write()
                    .map_err(|_| LeaderboardError::InternalError {
                        message: "Failed to acquire snapshot write lock".to_string(),
                    })?;
            *published = Some(Arc::clone(&snapshot));
        }

        self.set_state(slot, VariantState::Published);
        if let Ok(mut last_refreshed_at) = slot.last_refreshed_at.write() {
            *last_refreshed_at = Some(current_timestamp());
        }
        if let Ok(mut last_error) = slot.last_error.write() {
            *last_error = None;
        }
        self.bump_stats(|stats| stats.refreshes_completed += 1);

        let duration = started.elapsed();
        self.metrics_collector
            .record_refresh_completed(variant, duration, total);

        info!(
            "Published {} leaderboard - snapshot: {}, entries: {}, duration: {:.2}ms",
            variant,
            snapshot_id,
            total,
            duration.as_secs_f64() * 1000.0
        );

        let event = LeaderboardPublished {
            variant,
            snapshot_id,
            total_entries: total,
            timestamp: current_timestamp(),
        };
        if let Err(e) = self.event_publisher.publish_leaderboard_published(event).await {
            warn!(
                "Failed to publish LeaderboardPublished event for {}: {}",
                variant, e
            );
        }

        Ok(RefreshOutcome::Published { total })
    }

    fn fail_refresh(
        &self,
        variant: LeaderboardVariant,
        slot: &VariantSlot,
        message: String,
    ) -> Result<RefreshOutcome> {
        warn!(
            "Refresh failed for {} leaderboard, previous snapshot retained: {}",
            variant, message
        );

        self.set_state(slot, VariantState::Stale);
        if let Ok(mut last_error) = slot.last_error.write() {
            *last_error = Some(message.clone());
        }
        self.bump_stats(|stats| stats.refreshes_failed += 1);
        self.metrics_collector.record_refresh_failed(variant);

        Err(LeaderboardError::SourceUnavailable { message }.into())
    }

    /// Refresh every variant concurrently.
    ///
    /// Each variant runs its own independent pass; failures are logged and
    /// dropped from the returned list so one bad fetch never blocks the
    /// others from publishing.
    pub async fn refresh_all(&self) -> Result<Vec<(LeaderboardVariant, RefreshOutcome)>> {
        let refreshes = LeaderboardVariant::iter().map(|variant| async move {
            let outcome = self.refresh(variant).await;
            (variant, outcome)
        });

        let results = futures::future::join_all(refreshes).await;

        let mut outcomes = Vec::with_capacity(results.len());
        for (variant, outcome) in results {
            match outcome {
                Ok(outcome) => outcomes.push((variant, outcome)),
                Err(e) => warn!("Refresh of {} leaderboard failed: {}", variant, e),
            }
        }

        Ok(outcomes)
    }

    /// Get the currently published snapshot for a variant.
    ///
    /// Returns instantly even while a refresh is running; before the first
    /// successful refresh there is nothing to return.
    pub fn get(&self, variant: LeaderboardVariant) -> Option<Arc<Snapshot>> {
        let slot = self.slot(variant);
        slot.snapshot.read().ok().and_then(|published| published.clone())
    }

    /// Page the currently published snapshot.
    ///
    /// A missing limit falls back to the default page size and oversized
    /// limits are clamped to the configured cap. Before the first
    /// successful refresh this returns the explicit empty page.
    pub fn page(&self, variant: LeaderboardVariant, offset: usize, limit: Option<usize>) -> PageSlice {
        let requested = limit.unwrap_or(self.default_page_limit);
        let limit = if requested == 0 {
            self.default_page_limit
        } else {
            requested.min(self.max_page_limit)
        };

        let page = match self.get(variant) {
            Some(snapshot) => snapshot.page(offset, limit),
            None => PageSlice::empty(offset, limit),
        };

        self.bump_stats(|stats| stats.pages_served += 1);
        self.metrics_collector.record_page_served(variant);

        page
    }

    /// Mark a variant's published snapshot stale.
    ///
    /// The stale snapshot keeps serving until a refresh replaces it.
    pub fn invalidate(&self, variant: LeaderboardVariant) {
        let slot = self.slot(variant);
        if let Ok(mut state) = slot.state.write() {
            if *state == VariantState::Published {
                *state = VariantState::Stale;
            }
        }

        self.bump_stats(|stats| stats.invalidations += 1);
        self.metrics_collector.record_invalidation(variant);
        debug!("Marked {} leaderboard stale", variant);
    }

    /// Mark every variant stale
    pub fn invalidate_all(&self) {
        for variant in LeaderboardVariant::iter() {
            self.invalidate(variant);
        }
    }

    /// Introspect one variant's slot
    pub fn variant_status(&self, variant: LeaderboardVariant) -> VariantStatus {
        let slot = self.slot(variant);

        let state = slot
            .state
            .read()
            .map(|state| *state)
            .unwrap_or(VariantState::Stale);
        let total_entries = slot
            .snapshot
            .read()
            .ok()
            .and_then(|published| published.as_ref().map(|snapshot| snapshot.total()))
            .unwrap_or(0);
        let last_refreshed_at = slot
            .last_refreshed_at
            .read()
            .map(|at| *at)
            .unwrap_or(None);
        let last_error = slot
            .last_error
            .read()
            .map(|error| error.clone())
            .unwrap_or(None);

        VariantStatus {
            variant,
            state,
            total_entries,
            last_refreshed_at,
            last_error,
        }
    }

    /// Introspect every variant's slot
    pub fn variant_statuses(&self) -> Vec<VariantStatus> {
        LeaderboardVariant::iter()
            .map(|variant| self.variant_status(variant))
            .collect()
    }

    /// Get current coordinator statistics
    pub fn stats(&self) -> CoordinatorStats {
        self.stats
            .read()
            .map(|stats| stats.clone())
            .unwrap_or_default()
    }

    fn slot(&self, variant: LeaderboardVariant) -> &VariantSlot {
        self.slots
            .get(&variant)
            .expect("slot initialized for every variant at construction")
    }

    fn set_state(&self, slot: &VariantSlot, state: VariantState) {
        if let Ok(mut current) = slot.state.write() {
            *current = state;
        }
    }

    fn bump_stats(&self, update: impl FnOnce(&mut CoordinatorStats)) {
        if let Ok(mut stats) = self.stats.write() {
            update(&mut stats);
        }
    }
}
