//! # DucoBox Protocol
//!
//! Raw JSON shapes and endpoint definitions of the Communication Print
//! (0000-4251) HTTP interface.
//!
//! ## Messages
//!
//! - `NodeInfoResponse`: `/nodeinfoget`, flat per-node live state
//! - `BoxInfoResponse`: `/boxinfoget`, `EnergyInfo` and `EnergyFan` sections
//! - `ConfigSection`: parameter objects (`Val`/`Min`/`Max`/`Inc`) from
//!   `/nodeconfigget` and each module of `/boxconfigget`
//!
//! ## Endpoints
//!
//! Every call is an unauthenticated `GET` with query parameters; write
//! endpoints answer HTTP 200 with no body.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod endpoints;
pub mod messages;

pub use endpoints::Endpoint;
pub use messages::{
    BoxConfigResponse, BoxInfoResponse, ConfigSection, EnergyFanSection, EnergyInfoSection,
    NodeInfoResponse, RawParam,
};
