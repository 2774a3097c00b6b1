use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
    pub stream: bool,
}

/// Non-streaming reply of `POST /api/generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: String,
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

/// Reply of `GET /api/tags`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// One locally available model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

/// Outcome of a successful generate call.
///
/// `text` is the model output exactly as returned; nothing at this layer interprets it.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    /// Generated text, verbatim.
    pub text: String,
    /// Model name echoed by the server (may be empty).
    pub model: String,
    /// Whether the server reported the generation as complete.
    pub done: bool,
    /// Wall-clock time spent on the call.
    pub elapsed: Duration,
}

impl GatewayResponse {
    /// Elapsed time in whole milliseconds, for log fields.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}
