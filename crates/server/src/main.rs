//! geocache server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use geocache_client::{GoogleConfig, GoogleGeocoder};
use geocache_core::{AppConfig, CacheDb, Resolver};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    if let Err(e) = config.require_api_key() {
        tracing::warn!("{e}; uncached addresses will fail until a key is configured");
    }

    let cache = CacheDb::open(&config.db_path)
        .await?
        .with_local_offset(config.local_offset());
    tracing::info!("Opened geocode cache at {}", config.db_path.display());

    let geocoder = GoogleGeocoder::new(GoogleConfig::from_app_config(&config))?;
    let resolver = Resolver::new(Arc::new(cache), Arc::new(geocoder), Arc::new(config.clone()))
        .with_retry_window(config.retry_window());

    tracing::info!("Starting geocache server on stdio transport");

    let handler = handler::GeocacheServer::new(resolver);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
