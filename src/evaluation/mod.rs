//! Page quality evaluation.
//!
//! [`Evaluator::evaluate`] runs one page through three steps:
//!
//! 1. **Precheck**: empty or too-short pages get a deterministic `0.0` without a model call.
//! 2. **Generate**: one gateway call with the rubric as system instruction, bounded by
//!    the request timeout (or a tighter caller deadline).
//! 3. **Parse**: the reply is reduced to a clamped score and a short reason by
//!    [`parse_response`]. Unparsable replies degrade to a `0.0` fallback instead of
//!    failing the evaluation.
//!
//! Only `Timeout` and `GatewayUnavailable` reach the caller as errors.

pub mod error;
pub mod evaluator;
pub mod parser;
pub mod prompt;
pub mod types;


pub use error::EvaluationError;
pub use evaluator::{EMPTY_CONTENT_REASON, Evaluator, PARSE_FAILURE_REASON, TOO_SHORT_REASON};
pub use parser::{FALLBACK_REASON, ParseError, ParsedVerdict, parse_response};
pub use types::{EvaluationRequest, EvaluationResult, Verdict, clamp_score};
