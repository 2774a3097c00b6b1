use std::time::Duration;

use thiserror::Error;

use crate::ollama::{GatewayError, GatewayErrorKind};

/// Failures that `evaluate` surfaces to its caller.
///
/// Malformed model output never appears here; it degrades to a fallback result.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The gateway call did not finish within the evaluation budget.
    #[error("evaluation timed out after {}ms", budget.as_millis())]
    Timeout { budget: Duration },

    /// The model server could not be reached or refused the request.
    #[error("model gateway unavailable: {0}")]
    GatewayUnavailable(#[source] GatewayError),
}

impl EvaluationError {
    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            EvaluationError::Timeout { .. } => GatewayErrorKind::Timeout,
            EvaluationError::GatewayUnavailable(_) => GatewayErrorKind::Unavailable,
        }
    }
}
