//! `threadline serve`: run the webhook server until Ctrl+C or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use console::style;

use threadline_infra::config::Secrets;
use threadline_types::config::AppConfig;

use crate::http::router::build_router;
use crate::state::AppState;

pub async fn run(config: AppConfig, data_dir: PathBuf) -> anyhow::Result<()> {
    let state = AppState::init(config, &data_dir, Secrets::from_env()).await?;

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    println!(
        "  {} Threadline listening on {}",
        style("⚡").bold(),
        style(format!("http://{addr}")).cyan()
    );
    println!("  {}", style("Press Ctrl+C to stop").dim());

    let bot = Arc::clone(&state.bot);
    let grace = Duration::from_secs(state.config.shutdown_grace_secs);
    let router = build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(grace_secs = grace.as_secs(), "draining in-flight responses");
    bot.shutdown(grace).await;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
