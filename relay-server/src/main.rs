//! relay-server binary entry point.
//!
//! Usage:
//! ```bash
//! relay-server --config relay.toml
//! relay-server --bind 127.0.0.1:8080 --database /tmp/relay.db
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use nearby_relay_server::cleanup::spawn_cleanup_task;
use nearby_relay_server::config::Config;
use nearby_relay_server::http;
use nearby_relay_server::TokenRelay;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Discovery token relay server.
#[derive(Parser, Debug)]
#[command(name = "relay-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (defaults apply if it is missing)
    #[arg(long, short, env = "RELAY_CONFIG", default_value = "relay.toml")]
    config: PathBuf,

    /// Override `server.bind_address`
    #[arg(long)]
    bind: Option<String>,

    /// Override `storage.database`
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nearby_relay_server=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(database) = cli.database {
        config.storage.database = database;
    }

    let relay = Arc::new(
        TokenRelay::open(config.clone())
            .await
            .context("Failed to start relay")?,
    );
    http::health::init_start_time();

    let cleanup = spawn_cleanup_task(
        relay.storage_arc(),
        relay.rate_limits().clone(),
        config.cleanup.clone(),
    );

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;
    tracing::info!(
        "relay-server v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        listener.local_addr()?
    );

    http::serve(relay, listener, shutdown_signal())
        .await
        .context("HTTP server error")?;

    cleanup.abort();
    tracing::info!("relay-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let mut sigterm = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).ok()
    };

    tokio::select! {
        _ = async {
            #[cfg(unix)]
            {
                if let Some(ref mut sigterm) = sigterm {
                    sigterm.recv().await;
                    return;
                }
            }
            std::future::pending::<()>().await;
        } => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        }
    }
}
