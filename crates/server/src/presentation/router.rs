use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::websocket::{WsState, ws_handler};

/// `GET /` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "TWAP server running".to_string(),
    })
}

/// Create the service router
///
/// ```text
/// GET /         health
/// GET /ws-twap  TWAP channel (WebSocket upgrade)
/// ```
pub fn create_router(state: Arc<WsState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/ws-twap", get(ws_handler))
        .with_state(state)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
