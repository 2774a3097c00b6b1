//! Page evaluator HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use evaluator::config::Config;
use evaluator::evaluation::Evaluator;
use evaluator::ollama::OllamaClient;
use evaluator::server::{HandlerState, create_router_with_state};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        ollama_url = %config.ollama_url,
        model = %config.ollama_model,
        timeout_secs = config.request_timeout.as_secs(),
        "Page evaluator starting"
    );

    let client = OllamaClient::from_config(&config)?;

    if client.health_check().await {
        match client.has_model().await {
            Ok(true) => tracing::info!("Model server reachable, model available"),
            Ok(false) => tracing::warn!(
                model = %config.ollama_model,
                "Configured model not found on model server; evaluations will fail until it is pulled"
            ),
            Err(e) => tracing::warn!("Failed to list models: {}", e),
        }
    } else {
        tracing::warn!("Model server not reachable yet; /ready will report not_ready");
    }

    let evaluator = Evaluator::new(client, Arc::new(config));
    let state = HandlerState::new(evaluator);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Page evaluator shutdown complete");
    Ok(())
}

async fn run_health_check() -> i32 {
    let Ok(config) = Config::from_env() else {
        return 1;
    };
    let url = config.health_check_url();

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
