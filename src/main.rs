use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

mod config;
mod error;
mod handlers;
mod metrics;
mod middleware;
mod routes;
mod server;
mod telemetry;

use config::Config;
use error::StartupError;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Request counters and latency histograms, updated by the timing middleware.
    pub metrics: Arc<metrics::RequestMetrics>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    telemetry::init(&config);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), StartupError> {
    // ── 1. Metrics registry ──────────────────────────────────────
    let metrics = Arc::new(metrics::RequestMetrics::new()?);

    // ── 2. Build shared state ────────────────────────────────────
    let state = Arc::new(AppState {
        metrics: metrics.clone(),
    });

    // ── 3. Build Axum router ─────────────────────────────────────
    let app = server::create_router(state);

    // ── 4. Bind & serve ──────────────────────────────────────────
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    tracing::info!(%addr, version = env!("CARGO_PKG_VERSION"), "server listening");
    for route in routes::ROUTES {
        tracing::info!(path = route.path, endpoint = route.endpoint, "route registered");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    tracing::info!(
        requests_served = metrics.total_requests(),
        "server stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
