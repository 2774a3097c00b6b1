//! Test server harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use evaluator::config::Config;
use evaluator::evaluation::Evaluator;
use evaluator::ollama::LlmGateway;
use evaluator::server::{HandlerState, create_router_with_state};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

pub struct TestServer<G: LlmGateway + 'static> {
    pub addr: SocketAddr,
    pub evaluator: Arc<Evaluator<G>>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl<G: LlmGateway + 'static> TestServer<G> {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn gateway(&self) -> &G {
        self.evaluator.gateway()
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl<G: LlmGateway + 'static> Drop for TestServer<G> {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
}

/// Spawns the HTTP facade on an ephemeral port, backed by `gateway`.
///
/// Pass a `MockGateway` for handler-level tests or an `OllamaClient` pointed at
/// [`spawn_fake_ollama`](super::fake_ollama::spawn_fake_ollama) to exercise the full stack.
pub async fn spawn_test_server<G>(
    gateway: G,
    config: Config,
) -> Result<TestServer<G>, ServerStartupError>
where
    G: LlmGateway + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let local_addr = listener.local_addr()?;

    let evaluator = Arc::new(Evaluator::new(gateway, Arc::new(config)));
    let app = create_router_with_state(HandlerState::from_shared(Arc::clone(&evaluator)));

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        evaluator,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
