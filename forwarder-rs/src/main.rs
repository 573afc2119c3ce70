//! forwarder-rs: DirectAdmin forwarder manager
//!
//! Usage: `forwarder-rs [config.toml]`

use forwarder_rs::api::ApiServer;
use forwarder_rs::Config;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_PATH: &str = "forwarder.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forwarder_rs=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting forwarder-rs v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if config_path.exists() {
        info!("Loading configuration from {}", config_path.display());
    } else {
        info!("No config file at {}, using defaults and environment", config_path.display());
    }

    let config = Config::load(Some(&config_path))?;

    info!("Configuration loaded");
    info!("  Listening on: {}", config.server.listen_addr);
    info!("  DirectAdmin: {}", config.directadmin.url);
    info!("  Domain: {}", config.directadmin.domain);

    let server = ApiServer::new(&config)?;
    server.run().await?;

    Ok(())
}
