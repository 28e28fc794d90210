//! HTTP gateway (Axum) for answer scoring.
//!
//! Routes:
//! - `POST /similarity` scores one answer against one reference answer.
//! - `POST /evaluate` grades a list of answers against their accepted references.
//! - `GET /healthz` and `GET /ready` for probes.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::{evaluate_handler, similarity_handler};
pub use state::HandlerState;

use crate::constants::{QUIZSIM_STATUS_HEADER, QUIZSIM_STATUS_HEALTHY, QUIZSIM_STATUS_READY};

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/similarity", post(similarity_handler))
        .route("/evaluate", post(evaluate_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ReadyResponse {
    pub status: String,
    pub model: String,
    pub embedder_mode: String,
    pub device: String,
    pub embedding_dim: usize,
    pub cache_enabled: bool,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        QUIZSIM_STATUS_HEADER,
        HeaderValue::from_static(QUIZSIM_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
        .into_response()
}

/// The model is loaded before the listener binds, so a responding server is ready.
#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<HandlerState>) -> Response {
    let embedder = state.scorer.embedder();
    let embedder_mode = if embedder.is_stub() { "stub" } else { "real" };

    let mut headers = HeaderMap::new();
    headers.insert(
        QUIZSIM_STATUS_HEADER,
        HeaderValue::from_static(QUIZSIM_STATUS_READY),
    );

    (
        StatusCode::OK,
        headers,
        Json(ReadyResponse {
            status: "ok".to_string(),
            model: state.model_id().to_string(),
            embedder_mode: embedder_mode.to_string(),
            device: embedder.device_name().to_string(),
            embedding_dim: embedder.embedding_dim(),
            cache_enabled: state.scorer.cache().is_enabled(),
        }),
    )
        .into_response()
}
