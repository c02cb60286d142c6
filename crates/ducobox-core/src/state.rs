//! Ventilation states and flow overrides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating state of the box, as accepted by `nodesetoperstate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VentilationState {
    /// Demand-controlled automatic ventilation
    Auto,
    /// Manual level 1 (timed)
    Man1,
    /// Manual level 2 (timed)
    Man2,
    /// Manual level 3 (timed)
    Man3,
    /// Manual level 1 held until changed
    Cnt1,
    /// Manual level 2 held until changed
    Cnt2,
    /// Manual level 3 held until changed
    Cnt3,
    /// Away / absence mode
    Empt,
}

impl VentilationState {
    /// Every state in the order the device documentation lists them.
    pub const ALL: [Self; 8] = [
        Self::Auto,
        Self::Man1,
        Self::Cnt1,
        Self::Man2,
        Self::Cnt2,
        Self::Man3,
        Self::Cnt3,
        Self::Empt,
    ];

    /// Wire code used by the device.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::Man1 => "MAN1",
            Self::Man2 => "MAN2",
            Self::Man3 => "MAN3",
            Self::Cnt1 => "CNT1",
            Self::Cnt2 => "CNT2",
            Self::Cnt3 => "CNT3",
            Self::Empt => "EMPT",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Man1 => "Manual 1",
            Self::Man2 => "Manual 2",
            Self::Man3 => "Manual 3",
            Self::Cnt1 => "Manual 1 Forced",
            Self::Cnt2 => "Manual 2 Forced",
            Self::Cnt3 => "Manual 3 Forced",
            Self::Empt => "Away",
        }
    }

    /// Look up a state by its wire code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl fmt::Display for VentilationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VentilationState {
    type Err = UnknownState;

    /// Accepts either the wire code (`MAN2`) or the label (`Manual 2`),
    /// ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|state| {
                state.code().eq_ignore_ascii_case(s) || state.label().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

/// A ventilation state string that matched neither a code nor a label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ventilation state: {0}")]
pub struct UnknownState(pub String);

/// Value sent to `nodesetoverrule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideValue {
    /// Force the flow to a percentage (0..=100)
    Percent(u8),
    /// Remove any override
    Clear,
}

impl OverrideValue {
    /// Raw value the device uses to clear an override.
    pub const CLEAR_RAW: u8 = 255;

    /// Build a percentage override.
    ///
    /// # Errors
    ///
    /// Returns error if `percent` exceeds 100.
    pub fn percent(percent: u8) -> Result<Self, OverrideError> {
        if percent > 100 {
            return Err(OverrideError::OutOfRange(percent));
        }
        Ok(Self::Percent(percent))
    }

    /// Interpret a raw `ovrl` reading. 255 and anything above 100 mean no override.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        if raw <= 100 {
            Self::Percent(raw)
        } else {
            Self::Clear
        }
    }

    /// Raw value on the wire.
    #[must_use]
    pub fn raw(self) -> u8 {
        match self {
            Self::Percent(p) => p,
            Self::Clear => Self::CLEAR_RAW,
        }
    }
}

/// Override percentage outside 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverrideError {
    /// Percentage above 100
    #[error("override percentage {0} is outside 0..=100")]
    OutOfRange(u8),
}
