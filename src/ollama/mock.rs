use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::client::LlmGateway;
use super::error::{GatewayError, GatewayErrorKind};
use super::model::GatewayResponse;

const MOCK_URL: &str = "mock://gateway";
const MOCK_MODEL: &str = "mock-model";

/// What the mock answers with.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    Text(String),
    Error(GatewayErrorKind),
}

/// Prompt pair captured from the most recent call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPrompt {
    pub prompt: String,
    pub system: Option<String>,
}

/// In-memory gateway with call counting and optional artificial latency.
pub struct MockGateway {
    reply: Mutex<MockReply>,
    delay: Option<Duration>,
    healthy: AtomicBool,
    model_available: AtomicBool,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<RecordedPrompt>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::with_text("SCORE: 0.8\nREASON: Mock evaluation")
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self::with_reply(MockReply::Text(text.into()))
    }

    pub fn failing(kind: GatewayErrorKind) -> Self {
        Self::with_reply(MockReply::Error(kind))
    }

    pub fn with_reply(reply: MockReply) -> Self {
        Self {
            reply: Mutex::new(reply),
            delay: None,
            healthy: AtomicBool::new(true),
            model_available: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Sleeps for `delay` before answering each generate call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_reply(&self, reply: MockReply) {
        *self.reply.lock().unwrap_or_else(PoisonError::into_inner) = reply;
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn set_model_available(&self, available: bool) {
        self.model_available.store(available, Ordering::SeqCst);
    }

    /// Number of generate calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<RecordedPrompt> {
        self.last_prompt
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, prompt: &str, system: Option<&str>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_prompt
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(RecordedPrompt {
            prompt: prompt.to_string(),
            system: system.map(str::to_string),
        });
    }

    fn current_reply(&self) -> MockReply {
        self.reply
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LlmGateway for MockGateway {
    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<GatewayResponse, GatewayError> {
        self.record(prompt, system);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.current_reply() {
            MockReply::Text(text) => Ok(GatewayResponse {
                text,
                model: MOCK_MODEL.to_string(),
                done: true,
                elapsed: self.delay.unwrap_or_default(),
            }),
            MockReply::Error(GatewayErrorKind::Timeout) => Err(GatewayError::Timeout {
                url: MOCK_URL.to_string(),
                timeout: self.delay.unwrap_or_default(),
            }),
            MockReply::Error(GatewayErrorKind::Unavailable) => Err(GatewayError::Unavailable {
                url: MOCK_URL.to_string(),
                status: Some(503),
                message: "mock gateway unavailable".to_string(),
            }),
            MockReply::Error(GatewayErrorKind::MalformedResponse) => {
                Err(GatewayError::MalformedResponse {
                    url: MOCK_URL.to_string(),
                    message: "mock body is not JSON".to_string(),
                })
            }
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    async fn model_available(&self) -> bool {
        self.model_available.load(Ordering::SeqCst)
    }

    fn model(&self) -> &str {
        MOCK_MODEL
    }
}
