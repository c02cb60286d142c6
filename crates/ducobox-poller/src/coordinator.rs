//! Poll cycle and the timer loop that drives it.

use crate::cache::PollState;
use chrono::Utc;
use ducobox_adapter_http::DucoApi;
use ducobox_core::{Availability, Category, Snapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

/// Poll cadence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Cycle period; box state is fetched every cycle
    pub poll_interval: Duration,
    /// Minimum age before nodes are rescanned
    pub node_interval: Duration,
    /// Minimum age before energy telemetry is refetched
    pub energy_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            node_interval: Duration::from_secs(9),
            energy_interval: Duration::from_secs(60),
        }
    }
}

/// Run one poll cycle.
///
/// Takes the previous state and returns the next one together with the
/// snapshot to publish. If box state cannot be read the cycle is unavailable
/// and no other category is fetched; cached categories are still carried.
pub async fn poll_cycle<A: DucoApi + ?Sized>(
    api: &A,
    config: &PollerConfig,
    mut state: PollState,
    now: Instant,
) -> (PollState, Snapshot) {
    let box_state = match api.get_box_state().await {
        Ok(box_state) => Some(box_state),
        Err(e) => {
            tracing::warn!(error = %e, "Box state fetch failed, marking device unavailable");
            None
        }
    };

    let mut stale = Vec::new();

    if state.nodes.is_due(now, config.node_interval) {
        if box_state.is_none() {
            stale.push(Category::Nodes);
        } else {
            let known = state.nodes.value().is_some_and(|n| !n.is_empty());
            match api.scan_nodes().await {
                // An empty scan while nodes are known means every probe failed
                Ok(nodes) if nodes.is_empty() && known => {
                    tracing::warn!("Node scan found nothing, keeping cached nodes");
                    stale.push(Category::Nodes);
                }
                Ok(nodes) => {
                    tracing::debug!(count = nodes.len(), "Nodes refreshed");
                    state.nodes.record(nodes, now);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Node scan failed, serving cached nodes");
                    stale.push(Category::Nodes);
                }
            }
        }
    }

    if state.energy.is_due(now, config.energy_interval) {
        if box_state.is_none() {
            stale.push(Category::Energy);
        } else {
            match api.get_energy_info().await {
                Ok(energy) => {
                    tracing::debug!("Energy telemetry refreshed");
                    state.energy.record(energy, now);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Energy fetch failed, serving cached telemetry");
                    stale.push(Category::Energy);
                }
            }
        }
    }

    let availability = match (&box_state, stale.is_empty()) {
        (None, _) => Availability::Unavailable,
        (Some(_), true) => Availability::Available,
        (Some(_), false) => Availability::Degraded,
    };

    state.generation += 1;
    let snapshot = Snapshot {
        generation: state.generation,
        availability,
        stale,
        box_state,
        nodes: state.nodes.value().cloned(),
        energy: state.energy.value().cloned(),
        refreshed_at: Utc::now(),
    };

    (state, snapshot)
}

/// Owns the poll state and publishes snapshots.
pub struct PollCoordinator<A: ?Sized> {
    api: Arc<A>,
    config: PollerConfig,
    state: PollState,
    tx: watch::Sender<Arc<Snapshot>>,
}

impl<A: DucoApi + ?Sized + 'static> PollCoordinator<A> {
    /// Create a coordinator. Subscribers see [`Snapshot::pending`] until the
    /// first cycle completes.
    #[must_use]
    pub fn new(api: Arc<A>, config: PollerConfig) -> Self {
        let (tx, _) = watch::channel(Arc::new(Snapshot::pending()));
        Self {
            api,
            config,
            state: PollState::default(),
            tx,
        }
    }

    /// Receive every future snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    /// Most recently published snapshot.
    #[must_use]
    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.tx.borrow())
    }

    /// Poll state carried into the next cycle.
    #[must_use]
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Run one cycle now and publish its snapshot.
    pub async fn refresh(&mut self) -> Arc<Snapshot> {
        let state = std::mem::take(&mut self.state);
        let (state, snapshot) =
            poll_cycle(self.api.as_ref(), &self.config, state, Instant::now()).await;
        self.state = state;

        let snapshot = Arc::new(snapshot);
        self.tx.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    /// Spawn the timer loop. The first cycle runs immediately; the loop ends
    /// once every receiver has been dropped.
    #[must_use]
    pub fn start(mut self) -> watch::Receiver<Arc<Snapshot>> {
        let rx = self.tx.subscribe();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if self.tx.is_closed() {
                    tracing::info!("All snapshot receivers dropped, stopping poller");
                    return;
                }

                let snapshot = self.refresh().await;
                tracing::debug!(
                    generation = snapshot.generation,
                    availability = ?snapshot.availability,
                    stale = ?snapshot.stale,
                    "Published snapshot"
                );
            }
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ducobox_adapter_http::{ClientError, StubApi, StubCall};

    fn stub_with_nodes() -> StubApi {
        let stub = StubApi::new();
        stub.set_nodes(Ok(vec![StubApi::sample_node(2), StubApi::sample_node(5)]));
        stub
    }

    fn comm_error() -> ClientError {
        ClientError::Communication("timed out".to_string())
    }

    #[tokio::test]
    async fn first_cycle_fetches_everything() {
        let stub = stub_with_nodes();
        let config = PollerConfig::default();

        let (state, snapshot) =
            poll_cycle(&stub, &config, PollState::default(), Instant::now()).await;

        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.availability, Availability::Available);
        assert!(snapshot.stale.is_empty());
        assert!(snapshot.box_state.is_some());
        assert_eq!(snapshot.nodes.as_deref().map(Vec::len), Some(2));
        assert!(snapshot.energy.is_some());
        assert_eq!(state.generation, 1);
        assert_eq!(
            stub.calls(),
            vec![StubCall::BoxState, StubCall::ScanNodes, StubCall::EnergyInfo]
        );
    }

    #[tokio::test]
    async fn not_due_categories_are_served_from_cache() {
        let stub = stub_with_nodes();
        let config = PollerConfig::default();
        let t0 = Instant::now();

        let (state, first) = poll_cycle(&stub, &config, PollState::default(), t0).await;
        let (_, second) =
            poll_cycle(&stub, &config, state, t0 + Duration::from_secs(5)).await;

        assert_eq!(second.generation, 2);
        assert_eq!(second.availability, Availability::Available);
        assert!(Arc::ptr_eq(
            first.nodes.as_ref().unwrap(),
            second.nodes.as_ref().unwrap()
        ));
        assert!(Arc::ptr_eq(
            first.energy.as_ref().unwrap(),
            second.energy.as_ref().unwrap()
        ));
        assert_eq!(stub.count(|c| *c == StubCall::ScanNodes), 1);
        assert_eq!(stub.count(|c| *c == StubCall::BoxState), 2);
    }

    #[tokio::test]
    async fn nodes_rescanned_after_interval() {
        let stub = stub_with_nodes();
        let config = PollerConfig::default();
        let t0 = Instant::now();

        let (state, first) = poll_cycle(&stub, &config, PollState::default(), t0).await;
        let (_, second) =
            poll_cycle(&stub, &config, state, t0 + config.poll_interval).await;

        assert_eq!(stub.count(|c| *c == StubCall::ScanNodes), 2);
        assert!(!Arc::ptr_eq(
            first.nodes.as_ref().unwrap(),
            second.nodes.as_ref().unwrap()
        ));
        assert!(Arc::ptr_eq(
            first.energy.as_ref().unwrap(),
            second.energy.as_ref().unwrap()
        ));
    }

    #[tokio::test]
    async fn box_state_failure_is_unavailable() {
        let stub = stub_with_nodes();
        let config = PollerConfig::default();
        let t0 = Instant::now();

        let (state, first) = poll_cycle(&stub, &config, PollState::default(), t0).await;
        stub.set_box_state(Err(comm_error()));
        stub.clear_calls();

        let later = t0 + Duration::from_secs(120);
        let (state, snapshot) = poll_cycle(&stub, &config, state, later).await;

        assert_eq!(snapshot.availability, Availability::Unavailable);
        assert!(!snapshot.is_available());
        assert!(snapshot.box_state.is_none());
        assert!(Arc::ptr_eq(
            first.nodes.as_ref().unwrap(),
            snapshot.nodes.as_ref().unwrap()
        ));
        assert_eq!(snapshot.stale, vec![Category::Nodes, Category::Energy]);
        assert_eq!(stub.calls(), vec![StubCall::BoxState]);
        assert_eq!(state.nodes.fetched_at(), Some(t0));
        assert_eq!(state.energy.fetched_at(), Some(t0));
    }

    #[tokio::test]
    async fn box_state_failure_on_first_cycle() {
        let stub = stub_with_nodes();
        stub.set_box_state(Err(comm_error()));

        let (state, snapshot) = poll_cycle(
            &stub,
            &PollerConfig::default(),
            PollState::default(),
            Instant::now(),
        )
        .await;

        assert_eq!(snapshot.availability, Availability::Unavailable);
        assert!(snapshot.nodes.is_none());
        assert!(snapshot.energy.is_none());
        assert!(state.nodes.fetched_at().is_none());
    }

    #[tokio::test]
    async fn failed_fetch_does_not_advance_timestamp() {
        let stub = stub_with_nodes();
        let config = PollerConfig::default();
        let t0 = Instant::now();

        let (state, first) = poll_cycle(&stub, &config, PollState::default(), t0).await;

        stub.set_energy(Err(comm_error()));
        let t60 = t0 + Duration::from_secs(60);
        let (state, degraded) = poll_cycle(&stub, &config, state, t60).await;

        assert_eq!(degraded.availability, Availability::Degraded);
        assert_eq!(degraded.stale, vec![Category::Energy]);
        assert!(Arc::ptr_eq(
            first.energy.as_ref().unwrap(),
            degraded.energy.as_ref().unwrap()
        ));
        assert_eq!(state.energy.fetched_at(), Some(t0));

        stub.set_energy(Ok(StubApi::sample_energy()));
        let t75 = t0 + Duration::from_secs(75);
        let (state, recovered) = poll_cycle(&stub, &config, state, t75).await;

        assert_eq!(recovered.availability, Availability::Available);
        assert_eq!(state.energy.fetched_at(), Some(t75));
        assert!(!Arc::ptr_eq(
            first.energy.as_ref().unwrap(),
            recovered.energy.as_ref().unwrap()
        ));
    }

    #[tokio::test]
    async fn empty_scan_keeps_known_nodes() {
        let stub = stub_with_nodes();
        let config = PollerConfig::default();
        let t0 = Instant::now();

        let (state, first) = poll_cycle(&stub, &config, PollState::default(), t0).await;
        stub.set_nodes(Ok(Vec::new()));
        let (state, second) =
            poll_cycle(&stub, &config, state, t0 + Duration::from_secs(15)).await;

        assert_eq!(second.availability, Availability::Degraded);
        assert_eq!(second.stale, vec![Category::Nodes]);
        assert!(Arc::ptr_eq(
            first.nodes.as_ref().unwrap(),
            second.nodes.as_ref().unwrap()
        ));
        assert_eq!(state.nodes.fetched_at(), Some(t0));
    }

    #[tokio::test]
    async fn empty_first_scan_is_recorded() {
        let stub = StubApi::new();
        let (state, snapshot) = poll_cycle(
            &stub,
            &PollerConfig::default(),
            PollState::default(),
            Instant::now(),
        )
        .await;

        assert_eq!(snapshot.availability, Availability::Available);
        assert_eq!(snapshot.nodes.as_deref().map(Vec::len), Some(0));
        assert!(state.nodes.fetched_at().is_some());
    }

    #[tokio::test]
    async fn refresh_publishes_to_subscribers() {
        let stub = Arc::new(stub_with_nodes());
        let mut coordinator = PollCoordinator::new(Arc::clone(&stub), PollerConfig::default());
        let mut rx = coordinator.subscribe();

        assert_eq!(coordinator.latest().generation, 0);

        let published = coordinator.refresh().await;
        assert!(rx.has_changed().unwrap());
        let received = Arc::clone(&rx.borrow_and_update());
        assert!(Arc::ptr_eq(&published, &received));
        assert_eq!(coordinator.latest().generation, 1);
        assert_eq!(coordinator.state().generation, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_runs_cycles_on_timer() {
        let stub = Arc::new(stub_with_nodes());
        let coordinator = PollCoordinator::new(Arc::clone(&stub), PollerConfig::default());
        let mut rx = coordinator.start();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().generation, 1);

        rx.changed().await.unwrap();
        let second = Arc::clone(&rx.borrow_and_update());
        assert_eq!(second.generation, 2);
        assert_eq!(second.availability, Availability::Available);
        assert_eq!(stub.count(|c| *c == StubCall::BoxState), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_stops_when_receivers_dropped() {
        let stub = Arc::new(stub_with_nodes());
        let coordinator = PollCoordinator::new(Arc::clone(&stub), PollerConfig::default());
        let mut rx = coordinator.start();

        rx.changed().await.unwrap();
        drop(rx);

        tokio::time::sleep(Duration::from_secs(60)).await;
        let polled = stub.count(|c| *c == StubCall::BoxState);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(stub.count(|c| *c == StubCall::BoxState), polled);
        assert!(polled <= 2);
    }
}
