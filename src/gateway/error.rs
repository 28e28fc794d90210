use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::constants::{
    QUIZSIM_STATUS_HEADER, QUIZSIM_STATUS_INTERNAL_ERROR, QUIZSIM_STATUS_INVALID_REQUEST,
    QUIZSIM_STATUS_SCORING_ERROR,
};
use crate::scoring::ScoringError;

/// Body text for rejected requests; clients match on it.
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("scoring failed: {0}")]
    ScoringFailed(#[from] ScoringError),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error, detail, quizsim_status) = match &self {
            GatewayError::InvalidInput(reason)
            | GatewayError::ScoringFailed(ScoringError::InvalidInput { reason }) => (
                StatusCode::BAD_REQUEST,
                INVALID_INPUT_MESSAGE.to_string(),
                Some(reason.clone()),
                QUIZSIM_STATUS_INVALID_REQUEST,
            ),
            GatewayError::ScoringFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                self.to_string(),
                None,
                QUIZSIM_STATUS_SCORING_ERROR,
            ),
            GatewayError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                self.to_string(),
                None,
                QUIZSIM_STATUS_INTERNAL_ERROR,
            ),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            QUIZSIM_STATUS_HEADER,
            HeaderValue::from_static(quizsim_status),
        );

        let body = Json(ErrorResponse {
            error,
            code: status.as_u16(),
            detail,
        });

        (status, headers, body).into_response()
    }
}
