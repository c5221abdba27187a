use crate::server::RelayServer;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::response::Json;
use axum::routing::get;
use chrono::SecondsFormat;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handler::{websocket_handler, websocket_room_handler, websocket_room_user_handler};
use crate::metrics::MetricsSnapshot;

/// Create the Axum router for the stream transport and its HTTP endpoints.
pub fn create_router(allowed_origin: &str) -> axum::Router<Arc<RelayServer>> {
    axum::Router::new()
        .route("/ws", get(websocket_handler))
        .route("/ws/{room}", get(websocket_room_handler))
        .route("/ws/{room}/{username}", get(websocket_room_user_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(cors_layer(allowed_origin))
        .layer(TraceLayer::new_for_http())
}

/// `*` (or nothing usable) means permissive; otherwise a comma-separated origin list.
fn cors_layer(allowed_origin: &str) -> CorsLayer {
    if allowed_origin.trim() == "*" {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("No valid CORS origins configured, using permissive CORS");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub commit: &'static str,
    pub build_time: &'static str,
    pub server_time: String,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("FANOUT_RELAY_COMMIT").unwrap_or("dev"),
        build_time: option_env!("FANOUT_RELAY_BUILD_TIME").unwrap_or("dev"),
        server_time: chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub rooms: usize,
    #[serde(flatten)]
    pub counters: MetricsSnapshot,
}

/// Relay counters as JSON
async fn metrics_handler(State(server): State<Arc<RelayServer>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        rooms: server.hub().room_count(),
        counters: server.metrics().snapshot(),
    })
}
