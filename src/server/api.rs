use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use super::models::{DataResponse, HealthStatus, NavigationResponse};
use crate::shell::nav_items;

// ── Shared application state ──────────────────────────────────────────

/// Read-only state shared by every request.
pub struct AppState {
    pub environment: String,
    pub debug: String,
    pub static_dir: PathBuf,
}

pub type SharedState = Arc<AppState>;

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/data", get(get_data))
        .route("/api/navigation", get(get_navigation))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check(State(state): State<SharedState>) -> Json<HealthStatus> {
    Json(HealthStatus::healthy(&state.environment, &state.debug))
}

async fn get_data() -> Json<DataResponse> {
    Json(DataResponse::sample())
}

async fn get_navigation() -> Json<NavigationResponse> {
    Json(NavigationResponse { items: nav_items() })
}
