//! # DucoBox Poller
//!
//! Differential polling for a DucoBox.
//!
//! Box state is fetched on every cycle. Node readings and energy telemetry are
//! cached and only refetched once their own interval has elapsed. Each cycle
//! publishes one immutable [`Snapshot`](ducobox_core::Snapshot) in which every
//! category is present as long as it was ever fetched successfully.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod coordinator;

pub use cache::{Cached, PollState};
pub use coordinator::{poll_cycle, PollCoordinator, PollerConfig};
