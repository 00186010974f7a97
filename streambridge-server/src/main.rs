//! # StreamBridge Server
//!
//! Addon server that exposes Emby libraries as Stremio catalogs.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use streambridge_config::{ConfigLoad, ConfigLoader};
use streambridge_core::EmbyConnector;
use streambridge_server::{AppState, create_app};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "streambridge-server")]
#[command(about = "Stremio addon server for Emby libraries")]
struct Cli {
    /// Path to streambridge.toml
    #[arg(short, long, env = "STREAMBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Server host (overrides config)
    #[arg(long, env = "STREAMBRIDGE_HOST")]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(short, long, env = "STREAMBRIDGE_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    info!(
        catalog.default_limit = config.catalog.default_limit,
        catalog.fallback_limit = config.catalog.fallback_limit,
        emby.request_timeout = ?config.emby.request_timeout,
        "catalog configuration in effect"
    );

    let connector = Arc::new(EmbyConnector::new(config.client_settings()));
    let addr = config.server.bind_addr();
    let app = create_app(AppState::new(config, connector));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("StreamBridge listening on http://{addr}/manifest.json");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
