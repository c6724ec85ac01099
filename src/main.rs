use anyhow::Context;
use clap::Parser; // for cli
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use portfolio_gateway::build_router;
use portfolio_gateway::config::Args;
use portfolio_gateway::rate_limit::sweeper;
use portfolio_gateway::state::AppState;

// how long shutdown waits for queued telemetry
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // parse cli arguments
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.mode.default_log_filter())),
        )
        .init();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("building HTTP client")?;

    // creating shared state
    let state = Arc::new(AppState::from_args(&args, client));

    // spawn the background sweeper
    let shutdown = CancellationToken::new();
    let sweeper_handle = tokio::spawn(sweeper(
        state.limiter.clone(),
        args.sweep_interval(),
        shutdown.clone(),
    ));

    let app = build_router(state.clone());

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(addr = %addr, mode = ?args.mode, "Portfolio gateway listening");
    info!(
        limit = args.rate_limit,
        window_secs = args.rate_window,
        "Rate limit: {} requests per {} seconds",
        args.rate_limit,
        args.rate_window
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("Shutting down");
    shutdown.cancel();
    let _ = sweeper_handle.await;

    state.batcher.shutdown();
    if tokio::time::timeout(DRAIN_TIMEOUT, state.batcher.drain())
        .await
        .is_err()
    {
        warn!(pending = state.batcher.pending(), "Telemetry not fully drained before exit");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
