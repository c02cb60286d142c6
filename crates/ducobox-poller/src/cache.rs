//! Per-category cache owned by the coordinator.

use ducobox_core::{EnergyInfo, NodeInfo};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Last good value of a category and when it was fetched.
///
/// A failed fetch leaves both untouched, so the category stays due and is
/// retried on the next cycle.
#[derive(Debug)]
pub struct Cached<T> {
    value: Option<Arc<T>>,
    fetched_at: Option<Instant>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self {
            value: None,
            fetched_at: None,
        }
    }
}

impl<T> Clone for Cached<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            fetched_at: self.fetched_at,
        }
    }
}

impl<T> Cached<T> {
    /// Whether the category must be fetched at `now`.
    #[must_use]
    pub fn is_due(&self, now: Instant, interval: Duration) -> bool {
        match self.fetched_at {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= interval,
        }
    }

    /// Store a freshly fetched value.
    pub fn record(&mut self, value: T, now: Instant) -> Arc<T> {
        let value = Arc::new(value);
        self.value = Some(Arc::clone(&value));
        self.fetched_at = Some(now);
        value
    }

    /// Last good value.
    #[must_use]
    pub fn value(&self) -> Option<&Arc<T>> {
        self.value.as_ref()
    }

    /// When the last good value was fetched.
    #[must_use]
    pub fn fetched_at(&self) -> Option<Instant> {
        self.fetched_at
    }
}

/// Everything the coordinator carries from one cycle to the next.
#[derive(Debug, Clone, Default)]
pub struct PollState {
    /// Discovered nodes
    pub nodes: Cached<Vec<NodeInfo>>,
    /// Energy telemetry
    pub energy: Cached<EnergyInfo>,
    /// Generation of the last published snapshot
    pub generation: u64,
}
