use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

use crate::constants::{EVALUATOR_STATUS_ERROR, EVALUATOR_STATUS_HEADER};
use crate::evaluation::EvaluationError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid request body: {message}")]
    InvalidBody { status: StatusCode, message: String },

    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        // Gateway details stay in the logs; callers only learn the failure class.
        let (status, error_message, evaluator_status) = match &self {
            ServerError::InvalidRequest(_) => (
                StatusCode::BAD_REQUEST,
                self.to_string(),
                EVALUATOR_STATUS_ERROR,
            ),
            ServerError::InvalidBody { status, .. } => {
                (*status, self.to_string(), EVALUATOR_STATUS_ERROR)
            }
            ServerError::Evaluation(EvaluationError::Timeout { .. }) => (
                StatusCode::GATEWAY_TIMEOUT,
                "model gateway timed out".to_string(),
                "timeout",
            ),
            ServerError::Evaluation(EvaluationError::GatewayUnavailable(_)) => (
                StatusCode::BAD_GATEWAY,
                "model gateway unavailable".to_string(),
                "gateway_unavailable",
            ),
        };

        if let ServerError::Evaluation(err) = &self {
            warn!(error = %err, kind = %err.kind(), "Evaluation request failed");
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            EVALUATOR_STATUS_HEADER,
            HeaderValue::from_static(evaluator_status),
        );

        let body = Json(ErrorResponse {
            error: error_message,
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
