//! HTTP facade (Axum) over the evaluator.
//!
//! Routes:
//! - `GET /healthz`: process liveness, never touches the model server.
//! - `GET /ready`: `200` only when the model server answers its probe and lists the
//!   configured model.
//! - `POST /v1/evaluate`: scores one page. Accepts an optional
//!   `x-evaluation-deadline-ms` header.

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

pub use error::{ErrorResponse, ServerError};
pub use handler::{EvaluationResponse, evaluate_handler};
pub use state::HandlerState;

use crate::constants::{
    EVALUATOR_STATUS_HEADER, EVALUATOR_STATUS_HEALTHY, EVALUATOR_STATUS_NOT_READY,
    EVALUATOR_STATUS_READY,
};
use crate::ollama::LlmGateway;

pub fn create_router_with_state<G>(state: HandlerState<G>) -> Router
where
    G: LlmGateway + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/v1/evaluate", post(evaluate_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub gateway: &'static str,
    pub model: String,
    pub model_available: bool,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        EVALUATOR_STATUS_HEADER,
        HeaderValue::from_static(EVALUATOR_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<G>(State(state): State<HandlerState<G>>) -> Response
where
    G: LlmGateway + 'static,
{
    let gateway_ready = state.evaluator.health_check().await;
    let model_available = gateway_ready && state.evaluator.model_available().await;

    let components = ComponentStatus {
        http: EVALUATOR_STATUS_READY,
        gateway: if gateway_ready {
            EVALUATOR_STATUS_READY
        } else {
            EVALUATOR_STATUS_NOT_READY
        },
        model: state.evaluator.gateway().model().to_string(),
        model_available,
    };

    let (status_code, status_msg) = if model_available {
        (StatusCode::OK, EVALUATOR_STATUS_READY)
    } else {
        if gateway_ready {
            tracing::warn!(model = %components.model, "Configured model not installed");
        } else {
            tracing::warn!("Model server failed readiness probe");
        }
        (StatusCode::SERVICE_UNAVAILABLE, EVALUATOR_STATUS_NOT_READY)
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        EVALUATOR_STATUS_HEADER,
        HeaderValue::from_static(status_msg),
    );

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
