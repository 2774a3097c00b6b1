use std::time::Duration;

use thiserror::Error;

/// Coarse classification of a failed gateway call.
///
/// Every [`GatewayError`] maps to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayErrorKind {
    /// No reply within the configured budget.
    Timeout,
    /// Connection-level failure or non-success HTTP status.
    Unavailable,
    /// A 2xx reply whose body did not match the expected shape.
    MalformedResponse,
}

impl GatewayErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayErrorKind::Timeout => "timeout",
            GatewayErrorKind::Unavailable => "gateway_unavailable",
            GatewayErrorKind::MalformedResponse => "malformed_response",
        }
    }
}

impl std::fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
/// Errors returned by model server calls.
pub enum GatewayError {
    /// The request did not complete in time.
    #[error("request to '{url}' timed out after {}ms", timeout.as_millis())]
    Timeout {
        /// Endpoint URL.
        url: String,
        /// Budget that was exceeded.
        timeout: Duration,
    },

    /// Connection refused, DNS failure, or a non-2xx status.
    #[error("gateway at '{url}' unavailable: {message}")]
    Unavailable {
        /// Endpoint URL.
        url: String,
        /// HTTP status, when the server answered.
        status: Option<u16>,
        /// Error message.
        message: String,
    },

    /// The server answered 2xx with an unexpected body.
    #[error("malformed response from '{url}': {message}")]
    MalformedResponse {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },
}

impl GatewayError {
    /// Returns the error's kind.
    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            GatewayError::Timeout { .. } => GatewayErrorKind::Timeout,
            GatewayError::Unavailable { .. } => GatewayErrorKind::Unavailable,
            GatewayError::MalformedResponse { .. } => GatewayErrorKind::MalformedResponse,
        }
    }

    /// Classifies a transport error from `reqwest`.
    pub(crate) fn from_reqwest(url: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else if err.is_decode() {
            GatewayError::MalformedResponse {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            GatewayError::Unavailable {
                url: url.to_string(),
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}
