//! Cross-cutting, shared constants.
//!
//! Defaults mirror the values the evaluator has historically shipped with. Runtime
//! overrides go through [`Config`](crate::config::Config).

use std::time::Duration;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b-instruct-q4_K_M";
pub const DEFAULT_OLLAMA_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 100;
pub const DEFAULT_MIN_QUALITY_SCORE: f64 = 0.6;
pub const DEFAULT_MAX_AD_RATIO: f64 = 0.3;

/// Reserved for a future result cache; parsed and validated only.
pub const DEFAULT_EVALUATION_CACHE_TTL_SECS: u64 = 3600;

pub const DEFAULT_PORT: u16 = 8000;

/// Upper bound for the liveness probe against the model server.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Page text beyond this many characters is not sent to the model.
pub const MAX_PROMPT_CONTENT_CHARS: usize = 2000;

/// Reasons returned to callers are capped at this many characters.
pub const MAX_REASON_CHARS: usize = 500;

pub const DEFAULT_LANGUAGE: &str = "en";

pub const EVALUATOR_STATUS_HEADER: &str = "X-Evaluator-Status";
pub const EVALUATOR_STATUS_HEALTHY: &str = "healthy";
pub const EVALUATOR_STATUS_READY: &str = "ready";
pub const EVALUATOR_STATUS_NOT_READY: &str = "not_ready";
pub const EVALUATOR_STATUS_ERROR: &str = "error";

/// Optional per-request deadline accepted by the HTTP facade.
pub const DEADLINE_HEADER: &str = "x-evaluation-deadline-ms";
