//! # DucoBox CLI
//!
//! One-shot commands for inspecting and controlling a DucoBox.

use anyhow::{Context, Result};
use ducobox_adapter_http::{DucoApi, DucoClient, DucoClientConfig};
use ducobox_core::units::{decode_comfort_temperature, encode_comfort_temperature};
use ducobox_core::{NodeId, OverrideValue, ParamError, VentilationState};
use serde::Serialize;
use std::env;
use tracing_subscriber::EnvFilter;

const DEVICE_COMMANDS: [&str; 10] = [
    "detect",
    "info",
    "state",
    "energy",
    "nodes",
    "node",
    "config",
    "set-state",
    "override",
    "set-config",
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "comfort-encode" => {
            if args.len() < 3 {
                eprintln!("Usage: ducobox comfort-encode <celsius>");
                std::process::exit(1);
            }
            let celsius: f64 = args[2].parse().context("Invalid temperature")?;
            println!("{}", encode_comfort_temperature(celsius));
        }
        "comfort-decode" => {
            if args.len() < 3 {
                eprintln!("Usage: ducobox comfort-decode <raw>");
                std::process::exit(1);
            }
            let raw: i64 = args[2].parse().context("Invalid raw value")?;
            println!("{}", decode_comfort_temperature(raw));
        }
        "help" | "--help" | "-h" => {
            print_help();
        }
        cmd if DEVICE_COMMANDS.contains(&cmd) => {
            if args.len() < 3 {
                eprintln!("Usage: ducobox {cmd} <host> ...");
                std::process::exit(1);
            }
            device_command(cmd, &args[2], &args[3..]).await?;
        }
        cmd => {
            eprintln!("Unknown command: {cmd}");
            print_help();
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn device_command(cmd: &str, host: &str, args: &[String]) -> Result<()> {
    let config = DucoClientConfig::for_host(host);

    if cmd == "detect" {
        DucoClient::detect(config)
            .await
            .with_context(|| format!("No supported DucoBox at {host}"))?;
        println!("DucoBox Communication Print detected at {host}");
        return Ok(());
    }

    let client = DucoClient::new(config).context("Failed to create client")?;

    match (cmd, args) {
        ("info", []) => {
            let info = client
                .get_device_info()
                .await
                .context("Failed to read device info")?;
            print_json(&serde_json::json!({
                "model": info.model(),
                "device": info,
            }))?;
        }
        ("state", []) => {
            let state = client
                .get_box_state()
                .await
                .context("Failed to read box state")?;
            print_json(&serde_json::json!({
                "state_name": state.state_name(),
                "box": state,
            }))?;
        }
        ("energy", []) => {
            let energy = client
                .get_energy_info()
                .await
                .context("Failed to read energy info")?;
            print_json(&energy)?;
        }
        ("nodes", []) => {
            let nodes = client.scan_nodes().await.context("Failed to scan nodes")?;
            print_json(&nodes)?;
        }
        ("node", [node]) => {
            let node = parse_node(node)?;
            let info = client
                .get_node_info(node)
                .await
                .with_context(|| format!("Failed to read node {node}"))?;
            print_json(&info)?;
        }
        ("config", [node]) => {
            let node = parse_node(node)?;
            let config = client
                .get_node_config(node)
                .await
                .with_context(|| format!("Failed to read config of node {node}"))?;
            print_json(&config)?;
        }
        ("set-state", [state]) => {
            let state: VentilationState = state.parse()?;
            client
                .set_ventilation_state(state)
                .await
                .context("Failed to set ventilation state")?;
            println!("Ventilation state set to {state} ({})", state.code());
        }
        ("override", [node, value]) => {
            let node = parse_node(node)?;
            let value = if value.eq_ignore_ascii_case("clear") {
                OverrideValue::Clear
            } else {
                OverrideValue::percent(value.parse().context("Invalid percentage")?)?
            };
            client
                .set_override(node, value)
                .await
                .context("Failed to set override")?;
            println!("Override on node {node} set to {}", value.raw());
        }
        ("set-config", [node, param, value]) => {
            let node = parse_node(node)?;
            let value: f64 = value.parse().context("Invalid value")?;
            let config = client
                .get_node_config(node)
                .await
                .with_context(|| format!("Failed to read config of node {node}"))?;
            let current = config
                .get(param)
                .ok_or_else(|| ParamError::Unknown(param.clone()))?;
            let write = current.write(param, value)?;
            client
                .set_config(node, &write)
                .await
                .context("Failed to write config parameter")?;
            let raw = write.raw();
            println!("{param} on node {node} set to {value} (raw {raw})");
        }
        _ => {
            eprintln!("Wrong arguments for {cmd}");
            print_help();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn parse_node(raw: &str) -> Result<NodeId> {
    let id = raw
        .parse()
        .with_context(|| format!("Invalid node ID: {raw}"))?;
    Ok(NodeId(id))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_help() {
    println!(
        r#"DucoBox CLI

USAGE:
    ducobox <COMMAND> [OPTIONS]

COMMANDS:
    detect <host>                            Check for a Communication Print board
    info <host>                              Show device identity
    state <host>                             Show box state
    energy <host>                            Show temperatures, bypass, filter, fans
    nodes <host>                             Scan for sensor nodes
    node <host> <node>                       Show one node's readings and diagnostics
    config <host> <node>                     Show node configuration
    set-state <host> <STATE>                 Set ventilation state (AUTO, MAN1, EMPT, ...)
    override <host> <node> <pct|clear>       Force or clear a flow override
    set-config <host> <node> <param> <value> Write a configuration parameter
    comfort-encode <celsius>                 Encode a comfort temperature
    comfort-decode <raw>                     Decode a raw comfort temperature
    help                                     Show this help message

EXAMPLES:
    ducobox state 192.168.1.50
    ducobox set-state 192.168.1.50 MAN2
    ducobox set-config 192.168.1.50 5 CO2Setpoint 950
    ducobox comfort-encode 20.0
"#
    );
}
