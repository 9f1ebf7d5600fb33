//! Health check endpoints and monitoring
//!
//! This module provides health check functionality for the podium
//! leaderboard service, including readiness and liveness probes.

use crate::leaderboard::coordinator::VariantState;
use crate::service::app::AppState;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "✅ healthy"),
            HealthStatus::Degraded => write!(f, "⚠️  degraded"),
            HealthStatus::Unhealthy => write!(f, "❌ unhealthy"),
        }
    }
}

impl HealthStatus {
    /// The more severe of two statuses
    pub fn worst(self, other: HealthStatus) -> HealthStatus {
        match (self, other) {
            (HealthStatus::Unhealthy, _) | (_, HealthStatus::Unhealthy) => HealthStatus::Unhealthy,
            (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded) => HealthStatus::Degraded,
            _ => HealthStatus::Healthy,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Service version (could be from environment)
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    /// Service statistics
    pub stats: ServiceStats,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional error message if unhealthy
    pub message: Option<String>,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

/// Service statistics for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStats {
    /// Number of variants with a published snapshot
    pub published_variants: usize,
    /// Total entries across all published snapshots
    pub total_entries: usize,
    /// Total refreshes completed since service start
    pub refreshes_completed: u64,
    /// Total refreshes failed since service start
    pub refreshes_failed: u64,
    /// Total leaderboard pages served since service start
    pub pages_served: u64,
    /// Service uptime information
    pub uptime_info: String,
}

impl HealthCheck {
    /// Perform a comprehensive health check of the service
    pub async fn check(app_state: Arc<AppState>) -> Result<Self> {
        let checks = vec![
            Self::check_service_running(&app_state).await,
            Self::check_coordinator(&app_state).await,
            Self::check_amqp_health(&app_state).await,
        ];

        // Overall status is the worst any component reports
        let status = checks
            .iter()
            .fold(HealthStatus::Healthy, |overall, check| {
                overall.worst(check.status.clone())
            });

        let stats = Self::gather_service_stats(&app_state).await;

        Ok(HealthCheck {
            status,
            service: app_state.config().service.name.clone(),
            version: std::env::var("SERVICE_VERSION").unwrap_or_else(|_| "unknown".to_string()),
            timestamp: chrono::Utc::now(),
            checks,
            stats,
        })
    }

    /// Simple liveness check - just verify service is running
    pub async fn liveness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if app_state.is_running().await {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy)
        }
    }

    /// Readiness check - verify service can handle requests
    pub async fn readiness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        // Service must be running
        if !app_state.is_running().await {
            return Ok(HealthStatus::Unhealthy);
        }

        // Serving empty pages before the first refresh is expected, so the
        // coordinator check decides here, not snapshot presence
        match Self::check_coordinator(&app_state).await.status {
            HealthStatus::Healthy => Ok(HealthStatus::Healthy),
            HealthStatus::Degraded => Ok(HealthStatus::Degraded),
            HealthStatus::Unhealthy => Ok(HealthStatus::Unhealthy),
        }
    }

    /// Check if service is running
    async fn check_service_running(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = if app_state.is_running().await {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Unhealthy,
                Some("Service is not running".to_string()),
            )
        };

        ComponentCheck {
            name: "service_running".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Check recompute coordinator health
    async fn check_coordinator(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let statuses = app_state.coordinator().variant_statuses();
        let failing: Vec<String> = statuses
            .iter()
            .filter(|status| status.last_error.is_some())
            .map(|status| status.variant.to_string())
            .collect();

        let (status, message) = if failing.is_empty() {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Degraded,
                Some(format!("Last refresh failed for: {}", failing.join(", "))),
            )
        };

        ComponentCheck {
            name: "coordinator".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Check AMQP health
    async fn check_amqp_health(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = match app_state.amqp_connection() {
            Some(connection) => {
                if connection.is_alive() {
                    (HealthStatus::Healthy, None)
                } else {
                    (
                        HealthStatus::Degraded,
                        Some("AMQP connection lost".to_string()),
                    )
                }
            }
            None => (HealthStatus::Healthy, Some("AMQP disabled".to_string())),
        };

        ComponentCheck {
            name: "amqp_connection".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Convert health check to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize health check: {}", e))
    }

    /// Gather current service statistics
    async fn gather_service_stats(app_state: &AppState) -> ServiceStats {
        let coordinator = app_state.coordinator();
        let coordinator_stats = coordinator.stats();
        let statuses = coordinator.variant_statuses();

        let published_variants = statuses
            .iter()
            .filter(|status| status.state == VariantState::Published)
            .count();
        let total_entries = statuses.iter().map(|status| status.total_entries).sum();

        ServiceStats {
            published_variants,
            total_entries,
            refreshes_completed: coordinator_stats.refreshes_completed,
            refreshes_failed: coordinator_stats.refreshes_failed,
            pages_served: coordinator_stats.pages_served,
            uptime_info: format!(
                "Refreshes completed: {}, coalesced: {}",
                coordinator_stats.refreshes_completed, coordinator_stats.refreshes_coalesced
            ),
        }
    }
}
