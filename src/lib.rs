//! Page evaluator library crate (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`], [`Rubric`] - Environment-driven configuration
//! - [`Evaluator`] - Prompt, model call and verdict parsing for one page
//! - [`EvaluationRequest`], [`EvaluationResult`], [`Verdict`] - Evaluation data
//!
//! ## Model Gateway
//! - [`LlmGateway`] - Backend seam used by the evaluator
//! - [`OllamaClient`] - HTTP client for an Ollama-compatible server
//! - [`GatewayError`], [`GatewayErrorKind`] - Classified gateway failures
//!
//! ## HTTP
//! - [`server`] - Axum router exposing `/healthz`, `/ready` and `/v1/evaluate`
//!
//! ## Test/Mock Support
//! [`MockGateway`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod evaluation;
pub mod ollama;
pub mod server;

pub use config::{Config, ConfigError, Rubric};
pub use evaluation::{
    EvaluationError, EvaluationRequest, EvaluationResult, Evaluator, ParseError, ParsedVerdict,
    Verdict, parse_response,
};
pub use ollama::{GatewayError, GatewayErrorKind, GatewayResponse, LlmGateway, OllamaClient};
#[cfg(any(test, feature = "mock"))]
pub use ollama::{MockGateway, MockReply, RecordedPrompt};
