//! Storefront Server
//!
//! Serves storefront content and the session-protected admin save routes.
//!
//! # Configuration
//!
//! Settings come from the config file (`--config`, `STOREFRONT_CONFIG`, or
//! `~/.config/storefront/config.yaml`) and are overridden by environment
//! variables:
//! - `STOREFRONT_DATABASE_PATH`: SQLite database file
//! - `STOREFRONT_PORT`: Port to listen on (default: 8080)
//! - `STOREFRONT_SESSION_TTL_MINUTES`: Admin session lifetime (default: 720)
//!
//! Admin accounts are managed with `storefront-admin`.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storefront::auth::{Argon2Hasher, SessionStore};
use storefront::config::Config;
use storefront::db::init_db;
use storefront::server::{router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Parser)]
#[command(name = "storefront-server")]
#[command(version)]
#[command(about = "Storefront content server")]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(cli.config)?;

    tracing::info!("Database: {}", config.database_path.display());
    let pool = init_db(&config.database_path).await?;

    let sessions = Arc::new(SessionStore::new(config.session_ttl_minutes));
    let state = AppState::new(pool.clone(), Argon2Hasher::default(), sessions.clone());

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sessions.cleanup_expired();
            if removed > 0 {
                tracing::debug!("Removed {} expired session(s)", removed);
            }
        }
    });

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=info,storefront_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
