mod bootstrap;
mod chat;
mod clients;
mod handlers;
mod health;
mod router;

use std::time::Duration;

use anyhow::Result;
use sijang_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use sijang_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    // Bootstrap using the same config we already loaded
    let app = bootstrap::bootstrap_with_config(config).await?;

    spawn_context_sweeper(&app);

    let routes = chat::router(app.chat_router.clone()).merge(health::router(app.db_pool.clone()));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        "sijang-server listening"
    );

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    let server = axum::serve(listener, routes).with_graceful_shutdown(wait_for_shutdown());

    tokio::select! {
        result = server => {
            result?;
            tracing::info!(event_name = "system.server.stopped", "sijang-server stopped");
        }
        _ = shutdown_deadline(grace) => {
            tracing::warn!(
                event_name = "system.server.shutdown_deadline",
                grace_secs = grace.as_secs(),
                "graceful shutdown deadline exceeded, aborting open connections"
            );
        }
    }

    Ok(())
}

/// Periodically drops per-user conversation context that has sat idle past
/// the configured window.
fn spawn_context_sweeper(app: &bootstrap::Application) {
    let context = app.context.clone();
    let idle = Duration::from_secs(app.config.context.idle_secs);
    let sweep = Duration::from_secs(app.config.context.sweep_secs);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep);
        // The first tick fires immediately; skip it so a restart does not
        // sweep before anyone has talked.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = context.evict_idle(idle);
            if evicted > 0 {
                tracing::debug!(
                    event_name = "context.sweep.evicted",
                    evicted,
                    "dropped idle conversation contexts"
                );
            }
        }
    });
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.signal_error",
            error = %error,
            "failed to listen for shutdown signal"
        );
    }
    tracing::info!(event_name = "system.server.stopping", "shutdown signal received");
}

async fn shutdown_deadline(grace: Duration) {
    let _ = tokio::signal::ctrl_c().await;
    tokio::time::sleep(grace).await;
}
