use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use super::error::GatewayError;
use super::model::{GatewayResponse, GenerateRequest, GenerateResponse, ModelTag, TagsResponse};
use crate::config::Config;
use crate::constants::HEALTH_CHECK_TIMEOUT;

const GENERATE_PATH: &str = "/api/generate";
const TAGS_PATH: &str = "/api/tags";

#[derive(Clone)]
/// HTTP client for an Ollama-compatible model server.
///
/// Cheap to clone; clones share one connection pool.
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OllamaClient {
    /// Creates a client for `base_url` that applies `timeout` to every generate call.
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Unavailable {
                url: base_url.clone(),
                status: None,
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url,
            model: model.into(),
            timeout,
        })
    }

    /// Creates a client from the gateway section of `config`.
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        Self::new(
            &config.ollama_url,
            config.ollama_model.clone(),
            config.request_timeout,
        )
    }

    /// Returns the base URL (without trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model identifier sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends one non-streaming generate request.
    ///
    /// No retries. The caller decides what to do with a failure.
    #[instrument(skip(self, prompt, system), fields(model = %self.model, prompt_len = prompt.len()))]
    pub async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<GatewayResponse, GatewayError> {
        let url = self.endpoint(GENERATE_PATH);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
        };

        let started = Instant::now();

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(&url, self.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Model server returned non-success status");
            return Err(GatewayError::Unavailable {
                url,
                status: Some(status.as_u16()),
                message: format!("HTTP {}", status),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::from_reqwest(&url, self.timeout, e))?;

        let elapsed = started.elapsed();
        debug!(
            elapsed_ms = elapsed.as_millis() as u64,
            done = parsed.done,
            response_len = parsed.response.len(),
            "Generate call completed"
        );

        Ok(GatewayResponse {
            text: parsed.response,
            model: parsed.model,
            done: parsed.done,
            elapsed,
        })
    }

    /// Lists models available on the server.
    pub async fn list_models(&self) -> Result<Vec<ModelTag>, GatewayError> {
        let url = self.endpoint(TAGS_PATH);
        let probe_timeout = self.probe_timeout();

        let response = self
            .http
            .get(&url)
            .timeout(probe_timeout)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(&url, probe_timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Unavailable {
                url,
                status: Some(status.as_u16()),
                message: format!("HTTP {}", status),
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::from_reqwest(&url, probe_timeout, e))?;

        Ok(tags.models)
    }

    /// Liveness probe. Any failure yields `false`.
    pub async fn health_check(&self) -> bool {
        let url = self.endpoint(TAGS_PATH);

        match self
            .http
            .get(&url)
            .timeout(self.probe_timeout())
            .send()
            .await
        {
            Ok(res) if res.status().is_success() => true,
            Ok(res) => {
                debug!(status = res.status().as_u16(), "Health probe failed");
                false
            }
            Err(e) => {
                debug!(error = %e, "Health probe failed");
                false
            }
        }
    }

    /// Reports whether the configured model is present in the server's listing.
    pub async fn has_model(&self) -> Result<bool, GatewayError> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| model_matches(&m.name, &self.model)))
    }

    fn probe_timeout(&self) -> Duration {
        HEALTH_CHECK_TIMEOUT.min(self.timeout)
    }
}

/// Ollama reports untagged models as `name:latest`.
fn model_matches(listed: &str, wanted: &str) -> bool {
    if listed == wanted {
        return true;
    }
    !wanted.contains(':') && listed.strip_suffix(":latest") == Some(wanted)
}

/// Minimal async interface the evaluator depends on.
pub trait LlmGateway: Send + Sync {
    /// Generates text for `prompt`, optionally steered by a system instruction.
    fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> impl Future<Output = Result<GatewayResponse, GatewayError>> + Send;

    /// Returns `true` if the backend is ready to serve.
    fn health_check(&self) -> impl Future<Output = bool> + Send;

    /// Returns `true` if the configured model is installed on the backend.
    fn model_available(&self) -> impl Future<Output = bool> + Send;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

impl LlmGateway for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<GatewayResponse, GatewayError> {
        self.generate(prompt, system).await
    }

    async fn health_check(&self) -> bool {
        self.health_check().await
    }

    async fn model_available(&self) -> bool {
        match self.has_model().await {
            Ok(present) => present,
            Err(e) => {
                debug!(error = %e, "Model listing failed");
                false
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}
