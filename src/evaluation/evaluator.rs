use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::config::{Config, Rubric};
use crate::ollama::{GatewayError, LlmGateway};

use super::error::EvaluationError;
use super::parser::parse_response;
use super::prompt::{system_prompt, user_prompt};
use super::types::{EvaluationRequest, EvaluationResult, Verdict};

pub const EMPTY_CONTENT_REASON: &str = "Empty or no content";
pub const TOO_SHORT_REASON: &str = "Content too short to evaluate";
pub const PARSE_FAILURE_REASON: &str = "Unable to parse model response";

/// Scores page content through an [`LlmGateway`].
///
/// Holds no per-call state, so one instance can serve any number of concurrent
/// evaluations.
pub struct Evaluator<G> {
    gateway: G,
    config: Arc<Config>,
}

impl<G> std::fmt::Debug for Evaluator<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("model", &self.config.ollama_model)
            .field("timeout", &self.config.request_timeout)
            .finish_non_exhaustive()
    }
}

impl<G: LlmGateway> Evaluator<G> {
    pub fn new(gateway: G, config: Arc<Config>) -> Self {
        Self { gateway, config }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn rubric(&self) -> &Rubric {
        &self.config.rubric
    }

    /// Evaluates `request` within the configured request timeout.
    pub async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        self.run(request, self.config.request_timeout).await
    }

    /// Like [`evaluate`](Self::evaluate), but never waits longer than `deadline`.
    ///
    /// The configured timeout still applies when it is shorter.
    pub async fn evaluate_with_deadline(
        &self,
        request: &EvaluationRequest,
        deadline: Duration,
    ) -> Result<EvaluationResult, EvaluationError> {
        self.run(request, deadline.min(self.config.request_timeout))
            .await
    }

    /// Returns `true` if the model server answers its liveness probe.
    pub async fn health_check(&self) -> bool {
        self.gateway.health_check().await
    }

    /// Returns `true` if the configured model is installed on the model server.
    pub async fn model_available(&self) -> bool {
        self.gateway.model_available().await
    }

    /// Decides trivially disqualified pages without calling the model.
    pub fn precheck(&self, request: &EvaluationRequest) -> Option<EvaluationResult> {
        let text = request.text.trim();

        let reason = if text.is_empty() && request.title.trim().is_empty() {
            EMPTY_CONTENT_REASON
        } else if text.chars().count() < self.rubric().min_content_length {
            TOO_SHORT_REASON
        } else {
            return None;
        };

        Some(EvaluationResult::new(
            request.url.as_str(),
            0.0,
            reason,
            Verdict::ShortCircuit,
            self.rubric(),
        ))
    }

    fn parse_fallback(&self, request: &EvaluationRequest) -> EvaluationResult {
        EvaluationResult::new(
            request.url.as_str(),
            0.0,
            PARSE_FAILURE_REASON,
            Verdict::ParseFallback,
            self.rubric(),
        )
    }

    #[instrument(
        skip(self, request),
        fields(url = %request.url, model = self.gateway.model(), budget_ms = budget.as_millis() as u64)
    )]
    async fn run(
        &self,
        request: &EvaluationRequest,
        budget: Duration,
    ) -> Result<EvaluationResult, EvaluationError> {
        if let Some(result) = self.precheck(request) {
            debug!(verdict = %result.verdict, "Skipping model call");
            return Ok(result);
        }

        let system = system_prompt(self.rubric());
        let prompt = user_prompt(request);

        // Dropping the gateway future on expiry also drops its in-flight connection.
        let response =
            match tokio::time::timeout(budget, self.gateway.generate(&prompt, Some(&system)))
                .await
            {
                Ok(Ok(response)) => response,
                Ok(Err(GatewayError::MalformedResponse { message, .. })) => {
                    warn!(error = %message, "Model server returned a malformed body");
                    return Ok(self.parse_fallback(request));
                }
                Ok(Err(GatewayError::Timeout { .. })) | Err(_) => {
                    warn!("Model call exceeded its budget");
                    return Err(EvaluationError::Timeout { budget });
                }
                Ok(Err(err @ GatewayError::Unavailable { .. })) => {
                    warn!(error = %err, "Model server unavailable");
                    return Err(EvaluationError::GatewayUnavailable(err));
                }
            };

        let result = match parse_response(&response.text) {
            Ok(parsed) => EvaluationResult::new(
                request.url.as_str(),
                parsed.score,
                parsed.reason,
                Verdict::Model,
                self.rubric(),
            ),
            Err(e) => {
                warn!(
                    error = %e,
                    response_len = response.text.len(),
                    "Could not parse model response"
                );
                self.parse_fallback(request)
            }
        };

        info!(
            score = result.score,
            is_useful = result.is_useful,
            verdict = %result.verdict,
            elapsed_ms = response.elapsed_ms(),
            "Evaluation complete"
        );

        Ok(result)
    }
}
