//! # DucoBox Agent
//!
//! Keeps a DucoBox under continuous observation and exposes it as entities.
//!
//! ## Architecture
//!
//! 1. **Detection**: confirms a Communication Print answers at `DUCOBOX_HOST`
//! 2. **Polling**: the coordinator publishes one snapshot per cycle
//! 3. **Entities**: ventilation control, sensor readings, and config numbers
//!    read snapshots and issue control calls
//! 4. **Commands**: line commands on stdin drive the entities

use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod entities;
mod runtime;

pub use config::AgentConfig;
pub use runtime::Agent;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting DucoBox agent"
    );

    let config = AgentConfig::from_env()?;
    tracing::info!(base_url = %config.client.base_url, "Configuration loaded");

    Agent::new(config).run().await?;

    Ok(())
}
