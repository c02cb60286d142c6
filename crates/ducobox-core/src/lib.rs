//! # DucoBox Core
//!
//! Domain model shared by the DucoBox adapter crates.
//!
//! This crate provides:
//! - Typed device, box, energy, and node records in engineering units
//! - Unit conversion for deciselsius and the comfort temperature offset encoding
//! - Configuration parameters with the box/node namespace routing table
//! - The snapshot type published by the poll coordinator

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod model;
pub mod params;
pub mod snapshot;
pub mod state;
pub mod units;

pub use model::{BoxState, DeviceInfo, EnergyInfo, NodeId, NodeInfo, RfDiagnostics, BOX_NODE_ID};
pub use params::{ConfigParameter, ConfigWrite, Namespace, NodeConfig, ParamError};
pub use snapshot::{Availability, Category, Snapshot};
pub use state::{OverrideError, OverrideValue, UnknownState, VentilationState};
