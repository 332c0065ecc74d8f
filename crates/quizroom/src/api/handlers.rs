//! HTTP handlers.

use axum::{Json, extract::State};
use serde::Serialize;

use super::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// WebSocket debug info.
#[derive(Debug, Serialize)]
pub struct WsDebugResponse {
    pub connections: usize,
    pub rooms: usize,
}

/// Get WebSocket debug info (public, harmless).
pub async fn ws_debug(State(state): State<AppState>) -> Json<WsDebugResponse> {
    Json(WsDebugResponse {
        connections: state.hub.connection_count(),
        rooms: state.coordinator.room_count().await,
    })
}
