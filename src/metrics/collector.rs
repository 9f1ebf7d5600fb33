//! Metrics collection using Prometheus
//!
//! This module provides comprehensive metrics collection for the podium
//! leaderboard service using Prometheus metrics.

use crate::types::LeaderboardVariant;
use anyhow::Result;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the leaderboard service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Recompute and refresh metrics
    refresh_metrics: RefreshMetrics,

    /// Published snapshot metrics
    snapshot_metrics: SnapshotMetrics,

    /// Read API metrics
    api_metrics: ApiMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Total AMQP messages processed
    pub amqp_messages_total: IntCounterVec,

    /// AMQP message processing errors
    pub amqp_errors_total: IntCounterVec,

    /// AMQP operation durations
    pub amqp_operation_duration: HistogramVec,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Component health status
    pub component_health: IntGaugeVec,
}

/// Refresh-related metrics
#[derive(Clone)]
pub struct RefreshMetrics {
    /// Total refreshes that published a snapshot
    pub refreshes_completed_total: IntCounterVec,

    /// Total refreshes that failed
    pub refreshes_failed_total: IntCounterVec,

    /// Total refresh requests coalesced into an in-flight one
    pub refreshes_coalesced_total: IntCounterVec,

    /// Total invalidation requests applied
    pub invalidations_total: IntCounterVec,

    /// Time spent recomputing a variant
    pub refresh_duration_seconds: HistogramVec,
}

/// Snapshot-related metrics
#[derive(Clone)]
pub struct SnapshotMetrics {
    /// Entry count of the currently published snapshot
    pub snapshot_entries: IntGaugeVec,

    /// Total snapshots published
    pub snapshots_published_total: IntCounterVec,
}

/// Read API metrics
#[derive(Clone)]
pub struct ApiMetrics {
    /// Total leaderboard pages served
    pub pages_served_total: IntCounterVec,

    /// Requests rejected for an unknown leaderboard type
    pub invalid_requests_total: IntCounter,

    /// API request handling duration
    pub request_duration_seconds: HistogramVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let refresh_metrics = RefreshMetrics::new(&registry)?;
        let snapshot_metrics = SnapshotMetrics::new(&registry)?;
        let api_metrics = ApiMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            refresh_metrics,
            snapshot_metrics,
            api_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get service metrics
    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    /// Get refresh metrics
    pub fn refresh(&self) -> &RefreshMetrics {
        &self.refresh_metrics
    }

    /// Get snapshot metrics
    pub fn snapshot(&self) -> &SnapshotMetrics {
        &self.snapshot_metrics
    }

    /// Get API metrics
    pub fn api(&self) -> &ApiMetrics {
        &self.api_metrics
    }

    /// Record a completed refresh that published a new snapshot
    pub fn record_refresh_completed(
        &self,
        variant: LeaderboardVariant,
        duration: Duration,
        total_entries: usize,
    ) {
        self.refresh_metrics
            .refreshes_completed_total
            .with_label_values(&[variant.as_str()])
            .inc();

        self.refresh_metrics
            .refresh_duration_seconds
            .with_label_values(&[variant.as_str()])
            .observe(duration.as_secs_f64());

        self.snapshot_metrics
            .snapshots_published_total
            .with_label_values(&[variant.as_str()])
            .inc();

        self.snapshot_metrics
            .snapshot_entries
            .with_label_values(&[variant.as_str()])
            .set(total_entries as i64);
    }

    /// Record a failed refresh
    pub fn record_refresh_failed(&self, variant: LeaderboardVariant) {
        self.refresh_metrics
            .refreshes_failed_total
            .with_label_values(&[variant.as_str()])
            .inc();
    }

    /// Record a refresh request coalesced into one already running
    pub fn record_refresh_coalesced(&self, variant: LeaderboardVariant) {
        self.refresh_metrics
            .refreshes_coalesced_total
            .with_label_values(&[variant.as_str()])
            .inc();
    }

    /// Record an invalidation being applied to a variant
    pub fn record_invalidation(&self, variant: LeaderboardVariant) {
        self.refresh_metrics
            .invalidations_total
            .with_label_values(&[variant.as_str()])
            .inc();
    }

    /// Record a leaderboard page being served
    pub fn record_page_served(&self, variant: LeaderboardVariant) {
        self.api_metrics
            .pages_served_total
            .with_label_values(&[variant.as_str()])
            .inc();
    }

    /// Record a request rejected for an unknown leaderboard type
    pub fn record_invalid_request(&self) {
        self.api_metrics.invalid_requests_total.inc();
    }

    /// Record API request handling duration
    pub fn record_api_request(&self, endpoint: &str, duration: Duration) {
        self.api_metrics
            .request_duration_seconds
            .with_label_values(&[endpoint])
            .observe(duration.as_secs_f64());
    }

    /// Record AMQP operation
    pub fn record_amqp_operation(&self, operation: &str, success: bool, duration: Duration) {
        let status = if success { "success" } else { "error" };

        self.service_metrics
            .amqp_messages_total
            .with_label_values(&[operation, status])
            .inc();

        if !success {
            self.service_metrics
                .amqp_errors_total
                .with_label_values(&[operation])
                .inc();
        }

        self.service_metrics
            .amqp_operation_duration
            .with_label_values(&[operation, status])
            .observe(duration.as_secs_f64());
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Update component health
    pub fn update_component_health(&self, component: &str, healthy: bool) {
        let status = if healthy { 1 } else { 0 };
        self.service_metrics
            .component_health
            .with_label_values(&[component])
            .set(status);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds = IntGauge::new("podium_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let amqp_messages_total = IntCounterVec::new(
            Opts::new("podium_amqp_messages_total", "Total AMQP messages processed"),
            &["operation", "status"],
        )?;
        registry.register(Box::new(amqp_messages_total.clone()))?;

        let amqp_errors_total = IntCounterVec::new(
            Opts::new("podium_amqp_errors_total", "Total AMQP errors"),
            &["operation"],
        )?;
        registry.register(Box::new(amqp_errors_total.clone()))?;

        let amqp_operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "podium_amqp_operation_duration_seconds",
                "AMQP operation duration",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation", "status"],
        )?;
        registry.register(Box::new(amqp_operation_duration.clone()))?;

        let health_status = IntGauge::new(
            "podium_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let component_health = IntGaugeVec::new(
            Opts::new("podium_component_health", "Component health status"),
            &["component"],
        )?;
        registry.register(Box::new(component_health.clone()))?;

        Ok(Self {
            uptime_seconds,
            amqp_messages_total,
            amqp_errors_total,
            amqp_operation_duration,
            health_status,
            component_health,
        })
    }
}

impl RefreshMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let refreshes_completed_total = IntCounterVec::new(
            Opts::new(
                "podium_refreshes_completed_total",
                "Total refreshes that published a snapshot",
            ),
            &["variant"],
        )?;
        registry.register(Box::new(refreshes_completed_total.clone()))?;

        let refreshes_failed_total = IntCounterVec::new(
            Opts::new("podium_refreshes_failed_total", "Total failed refreshes"),
            &["variant"],
        )?;
        registry.register(Box::new(refreshes_failed_total.clone()))?;

        let refreshes_coalesced_total = IntCounterVec::new(
            Opts::new(
                "podium_refreshes_coalesced_total",
                "Total refresh requests coalesced",
            ),
            &["variant"],
        )?;
        registry.register(Box::new(refreshes_coalesced_total.clone()))?;

        let invalidations_total = IntCounterVec::new(
            Opts::new(
                "podium_invalidations_total",
                "Total invalidation requests applied",
            ),
            &["variant"],
        )?;
        registry.register(Box::new(invalidations_total.clone()))?;

        let refresh_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "podium_refresh_duration_seconds",
                "Time spent recomputing a variant",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]),
            &["variant"],
        )?;
        registry.register(Box::new(refresh_duration_seconds.clone()))?;

        Ok(Self {
            refreshes_completed_total,
            refreshes_failed_total,
            refreshes_coalesced_total,
            invalidations_total,
            refresh_duration_seconds,
        })
    }
}

impl SnapshotMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let snapshot_entries = IntGaugeVec::new(
            Opts::new(
                "podium_snapshot_entries",
                "Entry count of the published snapshot",
            ),
            &["variant"],
        )?;
        registry.register(Box::new(snapshot_entries.clone()))?;

        let snapshots_published_total = IntCounterVec::new(
            Opts::new(
                "podium_snapshots_published_total",
                "Total snapshots published",
            ),
            &["variant"],
        )?;
        registry.register(Box::new(snapshots_published_total.clone()))?;

        Ok(Self {
            snapshot_entries,
            snapshots_published_total,
        })
    }
}

impl ApiMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let pages_served_total = IntCounterVec::new(
            Opts::new("podium_pages_served_total", "Total leaderboard pages served"),
            &["variant"],
        )?;
        registry.register(Box::new(pages_served_total.clone()))?;

        let invalid_requests_total = IntCounter::new(
            "podium_invalid_requests_total",
            "Requests rejected for an unknown leaderboard type",
        )?;
        registry.register(Box::new(invalid_requests_total.clone()))?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "podium_request_duration_seconds",
                "API request handling duration",
            )
            .buckets(vec![0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
            &["endpoint"],
        )?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        Ok(Self {
            pages_served_total,
            invalid_requests_total,
            request_duration_seconds,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        // Test that we can access all metric groups
        let _service = collector.service();
        let _refresh = collector.refresh();
        let _snapshot = collector.snapshot();
        let _api = collector.api();
    }

    #[test]
    fn test_refresh_recording() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_refresh_completed(
            LeaderboardVariant::Skill,
            Duration::from_millis(100),
            250,
        );
        collector.record_refresh_failed(LeaderboardVariant::Rank);
        collector.record_refresh_coalesced(LeaderboardVariant::Skill);

        let entries = collector
            .snapshot()
            .snapshot_entries
            .with_label_values(&["skill"])
            .get();
        assert_eq!(entries, 250);
    }

    #[test]
    fn test_api_recording() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_page_served(LeaderboardVariant::Overall);
        collector.record_invalid_request();
        collector.record_api_request("leaderboard", Duration::from_micros(250));
        collector.record_invalidation(LeaderboardVariant::Overall);
    }

    #[test]
    fn test_health_status_updates() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.update_health_status(2); // Healthy
        collector.update_component_health("coordinator", true);
        collector.update_component_health("amqp", false);
    }

    #[test]
    fn test_metrics_timer() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        let timer = collector.start_timer();

        std::thread::sleep(Duration::from_millis(10));
        let duration = timer.elapsed();

        assert!(duration >= Duration::from_millis(10));

        let final_duration = timer.stop();
        assert!(final_duration >= Duration::from_millis(10));
    }
}
