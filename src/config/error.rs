//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
///
/// Any of these aborts startup; the evaluator never falls back to a default
/// rubric when an explicit value was supplied and rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// An integer setting could not be parsed.
    #[error("failed to parse {name}='{value}' as an integer: {source}")]
    IntParseError {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// A float setting could not be parsed.
    #[error("failed to parse {name}='{value}' as a number: {source}")]
    FloatParseError {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// A ratio/score setting is outside `[0, 1]`.
    #[error("{name} must be between 0.0 and 1.0")]
    OutOfUnitRange { name: &'static str },

    /// Gateway URL is not an absolute http(s) URL.
    #[error("invalid gateway url '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    /// Request timeout must be at least one second.
    #[error("OLLAMA_TIMEOUT must be greater than zero")]
    ZeroTimeout,

    /// A string setting was set but empty.
    #[error("{name} must not be empty")]
    Empty { name: &'static str },
}
