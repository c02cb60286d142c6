//! Agent runtime orchestration.

use crate::commands::Command;
use crate::config::AgentConfig;
use crate::entities::{readings, ConfigNumber, EntityError, VentilationFan};
use anyhow::{Context, Result};
use ducobox_adapter_http::{DucoApi, DucoClient};
use ducobox_core::Snapshot;
use ducobox_poller::PollCoordinator;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// The main agent runtime.
pub struct Agent {
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent.
    #[must_use]
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }

    /// Detect the device, start polling, and serve stdin commands until
    /// Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be detected or identified. Nothing
    /// after startup is fatal.
    pub async fn run(self) -> Result<()> {
        tracing::info!("Starting agent runtime");

        let client = DucoClient::detect(self.config.client.clone())
            .await
            .context("Failed to detect DucoBox Communication Print")?;
        let device = client
            .get_device_info()
            .await
            .context("Failed to read device info")?;
        tracing::info!(
            model = %device.model(),
            serial = %device.serial_number,
            firmware = device.firmware_version.as_deref().unwrap_or("unknown"),
            "Connected to DucoBox"
        );

        let api = Arc::new(client);
        let coordinator = PollCoordinator::new(Arc::clone(&api), self.config.poller.clone());
        let mut snapshots = coordinator.start();
        let mut fan = VentilationFan::new(Arc::clone(&api), snapshots.clone());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        tracing::info!("Agent running, press Ctrl+C to stop");

        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        tracing::error!("Poller stopped");
                        break;
                    }
                    let snapshot = Arc::clone(&snapshots.borrow_and_update());
                    log_snapshot(&snapshot);
                }

                line = lines.next_line(), if stdin_open => {
                    match line {
                        Ok(Some(line)) => handle_line(&api, &mut fan, &line).await,
                        Ok(None) => {
                            tracing::debug!("stdin closed, commands disabled");
                            stdin_open = false;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to read stdin, commands disabled");
                            stdin_open = false;
                        }
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        tracing::info!("Agent stopped");
        Ok(())
    }
}

fn log_snapshot(snapshot: &Snapshot) {
    let state = snapshot
        .box_state
        .as_ref()
        .and_then(ducobox_core::BoxState::state_name);
    tracing::info!(
        generation = snapshot.generation,
        availability = ?snapshot.availability,
        stale = ?snapshot.stale,
        state = state.as_deref().unwrap_or("unknown"),
        nodes = snapshot.nodes.as_ref().map_or(0, |n| n.len()),
        "Snapshot"
    );
    for reading in readings(snapshot) {
        tracing::debug!(key = %reading.key, value = reading.value, unit = reading.unit, "Reading");
    }
}

async fn handle_line<A: DucoApi + ?Sized>(api: &Arc<A>, fan: &mut VentilationFan<A>, line: &str) {
    let command = match Command::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring command");
            return;
        }
    };

    match execute(api, fan, &command).await {
        Ok(()) => tracing::info!(?command, "Command applied"),
        Err(e) => tracing::warn!(?command, error = %e, "Command failed"),
    }
}

async fn execute<A: DucoApi + ?Sized>(
    api: &Arc<A>,
    fan: &mut VentilationFan<A>,
    command: &Command,
) -> Result<(), EntityError> {
    match command {
        Command::Preset(state) => fan.set_preset(*state).await,
        Command::Percent(pct) => fan.set_percentage(*pct).await,
        Command::Clear => fan.clear_override().await,
        Command::On => fan.turn_on().await,
        Command::Off => fan.turn_off(),
        Command::Set { node, param, value } => {
            let mut number = ConfigNumber::find(api, *node, param).await?;
            tracing::debug!(
                node_id = %number.node(),
                para = number.name(),
                current = number.param().value,
                "Writing config parameter"
            );
            number.set_value(*value).await
        }
        Command::Status => {
            let presets: Vec<&str> = fan.preset_modes().into_iter().map(|s| s.code()).collect();
            tracing::info!(
                available = fan.is_available(),
                mode = ?fan.mode(),
                percentage = ?fan.percentage(),
                presets = %presets.join(","),
                "Fan status"
            );
            Ok(())
        }
    }
}
