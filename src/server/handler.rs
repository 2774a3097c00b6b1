use std::time::Duration;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::constants::{DEADLINE_HEADER, EVALUATOR_STATUS_HEADER};
use crate::evaluation::{EvaluationRequest, EvaluationResult};
use crate::ollama::LlmGateway;
use crate::server::error::ServerError;
use crate::server::state::HandlerState;

/// Body returned by `POST /v1/evaluate`.
#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    #[serde(flatten)]
    pub result: EvaluationResult,
    pub request_id: String,
    pub evaluated_at: String,
}

#[instrument(
    skip(state, headers, payload),
    fields(request_id = tracing::field::Empty, url = tracing::field::Empty)
)]
pub async fn evaluate_handler<G>(
    State(state): State<HandlerState<G>>,
    headers: HeaderMap,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, ServerError>
where
    G: LlmGateway + 'static,
{
    let request_id = Uuid::new_v4().to_string();
    let span = tracing::Span::current();
    span.record("request_id", tracing::field::display(&request_id));

    let deadline = parse_deadline(&headers)?;
    let Json(request) = payload?;

    let request: EvaluationRequest = serde_json::from_value(request)
        .map_err(|e| ServerError::InvalidRequest(format!("Invalid request schema: {}", e)))?;
    span.record("url", tracing::field::display(&request.url));

    debug!(
        text_chars = request.text.chars().count(),
        deadline_ms = deadline.map(|d| d.as_millis() as u64),
        "Processing evaluation request"
    );

    let result = match deadline {
        Some(deadline) => {
            state
                .evaluator
                .evaluate_with_deadline(&request, deadline)
                .await?
        }
        None => state.evaluator.evaluate(&request).await?,
    };

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        EVALUATOR_STATUS_HEADER,
        HeaderValue::from_static(result.verdict.as_str()),
    );

    let body = EvaluationResponse {
        result,
        request_id,
        evaluated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    Ok((StatusCode::OK, response_headers, Json(body)).into_response())
}

/// Reads the optional per-request deadline in milliseconds.
///
/// A present header must hold a positive integer.
pub(crate) fn parse_deadline(headers: &HeaderMap) -> Result<Option<Duration>, ServerError> {
    let Some(raw) = headers.get(DEADLINE_HEADER) else {
        return Ok(None);
    };

    let millis = raw
        .to_str()
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .ok_or_else(|| {
            ServerError::InvalidRequest(format!(
                "{} must be a positive integer",
                DEADLINE_HEADER
            ))
        })?;

    Ok(Some(Duration::from_millis(millis)))
}
