//! Client for an Ollama-compatible model server.
//!
//! The evaluator talks to the backend only through [`LlmGateway`]. [`OllamaClient`] is the
//! production implementation; a call-counting mock is available behind
//! `#[cfg(any(test, feature = "mock"))]`.
//!
//! Every failure resolves to one [`GatewayErrorKind`]: `Timeout`, `Unavailable` or
//! `MalformedResponse`. Nothing here retries.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::{LlmGateway, OllamaClient};
pub use error::{GatewayError, GatewayErrorKind};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockGateway, MockReply, RecordedPrompt};
pub use model::{GatewayResponse, ModelTag};
