//! lcm-admin - lesson content admin service
//!
//! Serves the admin HTTP API over the SQLite document store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lcm_admin::{build_router, AppState};
use lcm_common::config::{CliOverrides, ServerConfig, TomlConfig};
use lcm_common::db::init_database;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for lcm-admin
#[derive(Parser, Debug)]
#[command(name = "lcm-admin")]
#[command(about = "Lesson content admin service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "LCM_PORT")]
    port: Option<u16>,

    /// Folder holding the lcm.db database
    #[arg(short, long, env = "LCM_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long, env = "LCM_BIND_ADDRESS")]
    bind: Option<String>,

    /// Explicit TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Shared admin password
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (toml_config, config_source) = TomlConfig::load_or_default(args.config.as_deref());

    // Initialize tracing
    let default_filter = format!(
        "lcm_admin={level},lcm_common={level},tower_http={level}",
        level = toml_config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting lcm-admin v{}", env!("CARGO_PKG_VERSION"));
    config_source.log();

    let config = ServerConfig::resolve(
        CliOverrides {
            root_folder: args.root_folder,
            bind_address: args.bind,
            port: args.port,
            admin_password: args.password,
        },
        &toml_config,
    )
    .context("Invalid configuration")?;

    if config.password_is_default {
        warn!("ADMIN_PASSWORD not set, using the built-in default password");
    }

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let state = AppState::from_pool(pool, Some(config.admin_password.clone()));
    let app = build_router(state);

    let addr = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    let local_addr = listener
        .local_addr()
        .context("Failed to read bound address")?;
    info!("lcm-admin listening on http://{}", local_addr);
    info!("Health check: http://{}/health", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
