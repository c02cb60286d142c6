//! Agent configuration.

use anyhow::{bail, Context, Result};
use ducobox_adapter_http::DucoClientConfig;
use ducobox_poller::PollerConfig;
use std::time::Duration;

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Device client configuration
    pub client: DucoClientConfig,

    /// Poll cadence
    pub poller: PollerConfig,
}

impl AgentConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DUCOBOX_HOST`: Device host or IP address (required)
    /// - `DUCOBOX_POLL_INTERVAL_SECS`: Cycle period (default 15)
    /// - `DUCOBOX_NODE_INTERVAL_SECS`: Node rescan interval (default 9)
    /// - `DUCOBOX_ENERGY_INTERVAL_SECS`: Energy refetch interval (default 60)
    /// - `DUCOBOX_REQUEST_TIMEOUT_SECS`: Standard request timeout (default 10)
    /// - `DUCOBOX_PROBE_TIMEOUT_SECS`: Discovery probe timeout (default 2)
    ///
    /// # Errors
    ///
    /// Returns error if `DUCOBOX_HOST` is missing or a number is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AgentConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("DUCOBOX_HOST")
            .filter(|h| !h.trim().is_empty())
            .context("DUCOBOX_HOST is required")?;

        let mut client = DucoClientConfig::for_host(host.trim());
        let mut poller = PollerConfig::default();

        if let Some(secs) = seconds(&lookup, "DUCOBOX_POLL_INTERVAL_SECS")? {
            poller.poll_interval = secs;
        }
        if let Some(secs) = seconds(&lookup, "DUCOBOX_NODE_INTERVAL_SECS")? {
            poller.node_interval = secs;
        }
        if let Some(secs) = seconds(&lookup, "DUCOBOX_ENERGY_INTERVAL_SECS")? {
            poller.energy_interval = secs;
        }
        if let Some(secs) = seconds(&lookup, "DUCOBOX_REQUEST_TIMEOUT_SECS")? {
            client.timeout = secs;
        }
        if let Some(secs) = seconds(&lookup, "DUCOBOX_PROBE_TIMEOUT_SECS")? {
            client.probe_timeout = secs;
        }

        Ok(Self { client, poller })
    }
}

/// A positive whole number of seconds, if the variable is set.
fn seconds(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid {key}: {raw:?}"))?;
    if secs == 0 {
        bail!("Invalid {key}: must be greater than zero");
    }
    Ok(Some(Duration::from_secs(secs)))
}
