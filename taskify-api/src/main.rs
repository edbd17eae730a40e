//! # Taskify API Server
//!
//! Backend for the Taskify Kanban board: projects, tasks with strict
//! per-column ordering, comments, an AI help sidebar and real-time board
//! updates over WebSocket.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskify-api
//! ```

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskify_api::app::{build_router, AppState};
use taskify_api::config::Config;
use taskify_api::help::HelpClient;
use taskify_shared::db::migrations::run_migrations;
use taskify_shared::db::pool::{create_pool, DatabaseConfig};
use taskify_shared::realtime::{ProjectSubscriber, RedisBroadcast, RedisClient, RedisConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskify_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskify API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let redis = RedisClient::new(RedisConfig::from_env()?).await?;
    let events = Arc::new(RedisBroadcast::new(redis.get_connection()));
    let subscriber = ProjectSubscriber::new(redis.raw_client());

    let help = config.help.clone().map(HelpClient::new);

    let bind_address = config.bind_address();
    let state = AppState::new(pool, events, subscriber, help, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
