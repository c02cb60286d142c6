//! # DucoBox HTTP Adapter
//!
//! Client for the DucoBox Communication Print (0000-4251) REST interface.
//!
//! ## Boundary rules
//!
//! - **Timeouts**: 10 s for standard calls, 2 s for node-discovery probes
//! - **Units**: temperatures leave this crate in °C; the comfort temperature
//!   offset is decoded on read and encoded on write
//! - **Routing**: box-level parameters go through `/boxconfigset?mod=Energy`,
//!   everything else through `/nodeconfigset`
//! - **Retries**: none; the caller's poll cycle is the retry boundary

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod client;
pub mod convert;
pub mod discovery;
#[cfg(feature = "stub")]
pub mod stub;

pub use api::DucoApi;
pub use client::{ClientError, DucoClient, DucoClientConfig};
pub use discovery::{default_node_ranges, NodeRange};
#[cfg(feature = "stub")]
pub use stub::{StubApi, StubCall};
