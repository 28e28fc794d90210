use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::constants::QUIZSIM_STATUS_HEADER;
use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::scoring::{AnswerSubmission, QuizEvaluation, ScoringError, grade};

/// Header value on successful scoring responses.
pub const QUIZSIM_STATUS_SCORED: &str = "scored";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResponse {
    pub similarity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub answers: Vec<AnswerSubmission>,
}

/// Pulls `answer` and `correct_answer` out of a request body.
///
/// Both must be present, strings, and non-empty.
pub fn extract_texts(body: &Value) -> Result<(String, String), GatewayError> {
    let field = |name: &str| {
        body.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| GatewayError::InvalidInput(format!("'{name}' must be a non-empty string")))
    };

    Ok((field("answer")?, field("correct_answer")?))
}

#[instrument(skip(state, payload))]
pub async fn similarity_handler(
    State(state): State<HandlerState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(body) = payload.map_err(|e| GatewayError::InvalidInput(e.body_text()))?;
    let (answer, correct_answer) = extract_texts(&body)?;

    debug!(
        answer_len = answer.len(),
        reference_len = correct_answer.len(),
        "Scoring similarity request"
    );

    let scorer = Arc::clone(&state.scorer);
    let similarity = run_blocking(move || scorer.score(&answer, &correct_answer)).await?;

    info!(similarity, "Similarity computed");

    Ok(scored(Json(SimilarityResponse { similarity })))
}

#[instrument(skip(state, payload))]
pub async fn evaluate_handler(
    State(state): State<HandlerState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(body) = payload.map_err(|e| GatewayError::InvalidInput(e.body_text()))?;
    let request: EvaluateRequest = serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidInput(format!("invalid request schema: {e}")))?;

    debug!(answers = request.answers.len(), "Evaluating quiz submission");

    let scorer = Arc::clone(&state.scorer);
    let evaluation: QuizEvaluation =
        run_blocking(move || grade(scorer.as_ref(), &request.answers)).await?;

    info!(
        answers = evaluation.results.len(),
        score = evaluation.score,
        "Quiz evaluated"
    );

    Ok(scored(Json(evaluation)))
}

/// Runs CPU-bound inference off the async worker threads.
async fn run_blocking<T, F>(f: F) -> Result<T, GatewayError>
where
    F: FnOnce() -> Result<T, ScoringError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| GatewayError::InternalError(format!("scoring task failed: {e}")))?
        .map_err(GatewayError::from)
}

fn scored<T: IntoResponse>(body: T) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        QUIZSIM_STATUS_HEADER,
        HeaderValue::from_static(QUIZSIM_STATUS_SCORED),
    );
    (StatusCode::OK, headers, body).into_response()
}
