//! Minimal stand-in for an Ollama server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub enum FakeReply {
    /// `200` with `{"response": <text>, "done": true}`.
    Generate(String),
    /// A bare status with an empty body.
    Status(u16),
    /// `200` with a body that is not valid JSON.
    Garbage,
}

#[derive(Clone)]
struct FakeState {
    reply: FakeReply,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

pub struct FakeOllama {
    pub addr: SocketAddr,
    calls: Arc<AtomicUsize>,
}

impl FakeOllama {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn generate_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn generate(State(state): State<FakeState>) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    match state.reply {
        FakeReply::Generate(text) => Json(serde_json::json!({
            "model": "fake",
            "response": text,
            "done": true
        }))
        .into_response(),
        FakeReply::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        FakeReply::Garbage => (StatusCode::OK, "<html>not json</html>").into_response(),
    }
}

async fn tags() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "models": [{"name": "fake:latest", "size": 1}]
    }))
}

pub async fn spawn_fake_ollama(reply: FakeReply, delay: Option<Duration>) -> FakeOllama {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = FakeState {
        reply,
        delay,
        calls: Arc::clone(&calls),
    };

    let app = Router::new()
        .route("/api/generate", post(generate))
        .route("/api/tags", get(tags))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake ollama");
    let addr = listener.local_addr().expect("fake ollama addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    FakeOllama { addr, calls }
}
