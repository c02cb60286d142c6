//! Line commands accepted on stdin.

use anyhow::{bail, Context, Result};
use ducobox_core::{NodeId, VentilationState};

const COMMANDS: [&str; 7] = ["preset", "percent", "clear", "on", "off", "status", "set"];

/// A parsed stdin command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `preset <STATE>`
    Preset(VentilationState),
    /// `percent <N>`
    Percent(u8),
    /// `clear`
    Clear,
    /// `on`
    On,
    /// `off`
    Off,
    /// `set <node> <param> <value>`
    Set {
        /// Target node
        node: NodeId,
        /// Parameter name
        param: String,
        /// Value in engineering units
        value: f64,
    },
    /// `status`
    Status,
}

impl Command {
    /// Parse one line. Blank lines yield `None`.
    ///
    /// # Errors
    ///
    /// Returns error for unknown commands or malformed arguments.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&cmd, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match (cmd.to_ascii_lowercase().as_str(), args) {
            ("preset", [state]) => Self::Preset(state.parse()?),
            ("percent", [pct]) => {
                let pct = pct
                    .parse()
                    .with_context(|| format!("Invalid percentage: {pct}"))?;
                Self::Percent(pct)
            }
            ("clear", []) => Self::Clear,
            ("on", []) => Self::On,
            ("off", []) => Self::Off,
            ("status", []) => Self::Status,
            ("set", [node, param, value]) => Self::Set {
                node: NodeId(parse_node(node)?),
                param: (*param).to_string(),
                value: value
                    .parse()
                    .with_context(|| format!("Invalid value: {value}"))?,
            },
            (name, _) if COMMANDS.contains(&name) => {
                bail!("Wrong arguments for {cmd}; {}", usage())
            }
            _ => bail!("Unknown command: {cmd}; {}", usage()),
        };

        Ok(Some(command))
    }
}

fn parse_node(raw: &str) -> Result<u16> {
    raw.parse().with_context(|| format!("Invalid node: {raw}"))
}

fn usage() -> &'static str {
    "expected: preset <STATE> | percent <N> | clear | on | off | \
     set <node> <param> <value> | status"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_commands() {
        assert_eq!(
            Command::parse("preset CNT2").unwrap(),
            Some(Command::Preset(VentilationState::Cnt2))
        );
        assert_eq!(
            Command::parse("preset away").unwrap(),
            Some(Command::Preset(VentilationState::Empt))
        );
        assert_eq!(
            Command::parse("percent 40").unwrap(),
            Some(Command::Percent(40))
        );
        assert_eq!(Command::parse("  CLEAR ").unwrap(), Some(Command::Clear));
        assert_eq!(Command::parse("on").unwrap(), Some(Command::On));
        assert_eq!(Command::parse("off").unwrap(), Some(Command::Off));
        assert_eq!(Command::parse("status").unwrap(), Some(Command::Status));
        assert_eq!(
            Command::parse("set 5 CO2Setpoint 950").unwrap(),
            Some(Command::Set {
                node: NodeId(5),
                param: "CO2Setpoint".to_string(),
                value: 950.0,
            })
        );
        assert_eq!(Command::parse("").unwrap(), None);
    }

    #[test]
    fn reject_malformed_commands() {
        assert!(Command::parse("preset TURBO").is_err());
        assert!(Command::parse("percent lots").is_err());
        assert!(Command::parse("percent 300").is_err());
        assert!(Command::parse("set 5 CO2Setpoint").is_err());
        assert!(Command::parse("clear now").is_err());
        assert!(Command::parse("reboot").is_err());
    }
}
