//! Axum server for the leaderboard read API

use crate::leaderboard::coordinator::RecomputeCoordinator;
use crate::metrics::collector::MetricsCollector;
use crate::scoring::score::display_score;
use crate::signals::SignalStore;
use crate::types::LeaderboardVariant;
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port to bind the API server to
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Shared state for the API server
#[derive(Clone)]
pub struct ApiState {
    pub coordinator: Arc<RecomputeCoordinator>,
    pub signal_store: Arc<dyn SignalStore>,
    pub metrics_collector: Arc<MetricsCollector>,
}

/// HTTP server exposing the paginated leaderboard views
pub struct ApiServer {
    config: ApiServerConfig,
    state: ApiState,
    shutdown_tx: broadcast::Sender<()>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiServerConfig, state: ApiState) -> Self {
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);

        Self {
            config,
            state,
            shutdown_tx,
        }
    }

    /// Start the API server
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid API server address")?;

        let app = self.create_router();
        let listener = TcpListener::bind(addr).await?;

        info!("Leaderboard API listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API server shutdown signal received");
            })
            .await?;

        info!("API server stopped");
        Ok(())
    }

    /// Create the Axum router with all API endpoints
    fn create_router(&self) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/leaderboard", get(leaderboard_handler))
            .with_state(self.state.clone())
    }

    /// Stop the API server
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping API server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to API server: {}", e);
        }

        Ok(())
    }
}

/// Query parameters accepted by the leaderboard endpoint
#[derive(Debug, Deserialize)]
struct LeaderboardQuery {
    #[serde(rename = "type")]
    variant: Option<String>,
    offset: Option<usize>,
    limit: Option<usize>,
}

/// One leaderboard entry on the wire, with optional profile enrichment
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryResponse {
    position: u32,
    user_id: String,
    /// Display-rounded score; ordering uses full precision internally
    score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    badges: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaginationResponse {
    total: usize,
    offset: usize,
    limit: usize,
    has_more: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeaderboardResponse {
    entries: Vec<EntryResponse>,
    pagination: PaginationResponse,
}

/// Root endpoint handler - shows service information
async fn root_handler() -> impl IntoResponse {
    let info = json!({
        "service": "podium",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/leaderboard?type={overall|skill|personality|rank|ingame}&offset=N&limit=M"
        ]
    });

    Json(info)
}

/// Serve one page of a leaderboard
async fn leaderboard_handler(
    State(state): State<ApiState>,
    Query(query): Query<LeaderboardQuery>,
) -> Response {
    let timer = state.metrics_collector.start_timer();

    let requested = match query.variant.as_deref() {
        Some(requested) => requested,
        None => {
            state.metrics_collector.record_invalid_request();
            return error_response(
                StatusCode::BAD_REQUEST,
                "Missing required query parameter: type",
            );
        }
    };

    let variant = match LeaderboardVariant::from_str(requested) {
        Ok(variant) => variant,
        Err(e) => {
            debug!("Rejected leaderboard request: {}", e);
            state.metrics_collector.record_invalid_request();
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    let page = state
        .coordinator
        .page(variant, query.offset.unwrap_or(0), query.limit);

    // Enrich with profile data; a user missing from the store between
    // refresh and page keeps their entry without the display fields
    let mut entries = Vec::with_capacity(page.entries.len());
    for entry in &page.entries {
        let profile = match state.signal_store.get_profile(&entry.user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                debug!("Profile lookup failed for '{}': {}", entry.user_id, e);
                None
            }
        };

        entries.push(EntryResponse {
            position: entry.position,
            user_id: entry.user_id.clone(),
            score: display_score(entry.score, variant),
            username: profile.as_ref().map(|profile| profile.username.clone()),
            badges: profile.as_ref().map(|profile| profile.badges.clone()),
            region: profile.as_ref().map(|profile| profile.region.clone()),
        });
    }

    let response = LeaderboardResponse {
        entries,
        pagination: PaginationResponse {
            total: page.total,
            offset: page.offset,
            limit: page.limit,
            has_more: page.has_more,
        },
    };

    state
        .metrics_collector
        .record_api_request("leaderboard", timer.stop());

    (StatusCode::OK, Json(response)).into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amqp::publisher::MockEventPublisher;
    use crate::config::LeaderboardSettings;
    use crate::signals::InMemorySignalStore;
    use crate::types::{Division, RankTier, UserProfile, UserSignals};
    use crate::utils::current_timestamp;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt; // for oneshot

    fn create_test_signals(user_id: &str, skill: f64, rating_count: u32) -> UserSignals {
        UserSignals {
            user_id: user_id.to_string(),
            skill_average: skill,
            personality_average: 4.0,
            rating_count,
            rank_tier: RankTier::Gold,
            division: Some(Division::II),
            league_points: 0,
            win_rate: Some(55.0),
            updated_at: current_timestamp(),
        }
    }

    async fn create_test_router(seed: Vec<UserSignals>) -> Router {
        let store = Arc::new(InMemorySignalStore::new());
        for signals in seed {
            store.upsert_signals(signals).unwrap();
        }
        store
            .upsert_profile(UserProfile {
                user_id: "alice".to_string(),
                username: "Alice".to_string(),
                badges: vec!["founder".to_string()],
                region: "eu-west".to_string(),
            })
            .unwrap();

        let coordinator = Arc::new(RecomputeCoordinator::with_settings(
            store.clone(),
            Arc::new(MockEventPublisher::new()),
            Arc::new(MetricsCollector::new().unwrap()),
            &LeaderboardSettings::default(),
        ));
        coordinator
            .refresh(LeaderboardVariant::Skill)
            .await
            .unwrap();

        let state = ApiState {
            coordinator,
            signal_store: store,
            metrics_collector: Arc::new(MetricsCollector::new().unwrap()),
        };

        ApiServer::new(ApiServerConfig::default(), state).create_router()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let app = create_test_router(vec![]).await;

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_leaderboard_page_with_enrichment() {
        let app = create_test_router(vec![
            create_test_signals("alice", 4.55, 10),
            create_test_signals("bob", 3.2, 5),
        ])
        .await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/leaderboard?type=skill")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;

        assert_eq!(body["pagination"]["total"], 2);
        assert_eq!(body["pagination"]["hasMore"], false);

        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);

        // alice leads and carries her profile; 4.55 rounds up to 4.6
        assert_eq!(entries[0]["userId"], "alice");
        assert_eq!(entries[0]["position"], 1);
        assert_eq!(entries[0]["score"], 4.6);
        assert_eq!(entries[0]["username"], "Alice");
        assert_eq!(entries[0]["region"], "eu-west");

        // bob has no profile, so the display fields are omitted entirely
        assert_eq!(entries[1]["userId"], "bob");
        assert!(entries[1].get("username").is_none());
    }

    #[tokio::test]
    async fn test_leaderboard_pagination_window() {
        let seed = (0..30)
            .map(|index| create_test_signals(&format!("user{:02}", index), 4.9 - index as f64 * 0.1, 10))
            .collect();
        let app = create_test_router(seed).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/leaderboard?type=skill&offset=10&limit=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;

        assert_eq!(body["pagination"]["total"], 30);
        assert_eq!(body["pagination"]["offset"], 10);
        assert_eq!(body["pagination"]["limit"], 5);
        assert_eq!(body["pagination"]["hasMore"], true);

        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0]["position"], 11);
        assert_eq!(entries[4]["position"], 15);
    }

    #[tokio::test]
    async fn test_unknown_variant_is_rejected() {
        let app = create_test_router(vec![]).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/leaderboard?type=bogus")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Unknown leaderboard type: bogus");
    }

    #[tokio::test]
    async fn test_missing_variant_is_rejected() {
        let app = create_test_router(vec![]).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/leaderboard")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_page_before_first_refresh_is_empty() {
        let store = Arc::new(InMemorySignalStore::new());
        let coordinator = Arc::new(RecomputeCoordinator::with_settings(
            store.clone(),
            Arc::new(MockEventPublisher::new()),
            Arc::new(MetricsCollector::new().unwrap()),
            &LeaderboardSettings::default(),
        ));

        let state = ApiState {
            coordinator,
            signal_store: store,
            metrics_collector: Arc::new(MetricsCollector::new().unwrap()),
        };
        let app = ApiServer::new(ApiServerConfig::default(), state).create_router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/leaderboard?type=overall")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["pagination"]["total"], 0);
        assert!(body["entries"].as_array().unwrap().is_empty());
    }
}
