//! Ventilation control entity.
//!
//! Actions are optimistic: after a successful call the requested mode is
//! reported until the coordinator publishes its next snapshot, which then
//! becomes the source of truth again.

use super::EntityError;
use ducobox_adapter_http::DucoApi;
use ducobox_core::{BoxState, OverrideValue, Snapshot, VentilationState, BOX_NODE_ID};
use std::sync::Arc;
use tokio::sync::watch;

/// What the fan is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanMode {
    /// Demand-controlled ventilation
    Auto,
    /// A manual, forced, or away state
    Preset(VentilationState),
    /// Flow forced to a percentage
    Override(u8),
}

impl FanMode {
    /// Mode reported by the box. An override takes precedence over the state;
    /// without one, an unrecognized state code yields `None`.
    #[must_use]
    pub fn from_box_state(box_state: &BoxState) -> Option<Self> {
        match box_state.override_value {
            OverrideValue::Percent(p) => Some(Self::Override(p)),
            OverrideValue::Clear => box_state.state().map(Self::for_state),
        }
    }

    fn for_state(state: VentilationState) -> Self {
        match state {
            VentilationState::Auto => Self::Auto,
            other => Self::Preset(other),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingIntent {
    mode: FanMode,
    generation: u64,
}

/// The box's ventilation as a controllable fan.
pub struct VentilationFan<A: ?Sized> {
    api: Arc<A>,
    snapshots: watch::Receiver<Arc<Snapshot>>,
    pending: Option<PendingIntent>,
}

impl<A: DucoApi + ?Sized> VentilationFan<A> {
    /// Create the entity on top of a snapshot subscription.
    #[must_use]
    pub fn new(api: Arc<A>, snapshots: watch::Receiver<Arc<Snapshot>>) -> Self {
        Self {
            api,
            snapshots,
            pending: None,
        }
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Whether the last snapshot carried fresh box state.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.snapshot().is_available()
    }

    /// Current mode, including an optimistic intent not yet confirmed by a
    /// newer snapshot. `None` while box state is unknown or unrecognized.
    #[must_use]
    pub fn mode(&self) -> Option<FanMode> {
        let snapshot = self.snapshot();
        if let Some(pending) = self.pending {
            if pending.generation == snapshot.generation {
                return Some(pending.mode);
            }
        }
        let box_state = snapshot.box_state.as_ref()?;
        let mode = FanMode::from_box_state(box_state);
        if mode.is_none() {
            tracing::warn!(state = ?box_state.state_code, "Unrecognized ventilation state");
        }
        mode
    }

    /// Flow percentage: the override if one is active, otherwise the target flow.
    #[must_use]
    pub fn percentage(&self) -> Option<u8> {
        match self.mode()? {
            FanMode::Override(p) => Some(p),
            FanMode::Auto | FanMode::Preset(_) => self.snapshot().box_state.as_ref()?.target_flow,
        }
    }

    /// Selectable presets.
    #[must_use]
    pub fn preset_modes(&self) -> Vec<VentilationState> {
        self.api.ventilation_state_options()
    }

    /// Force the flow to `percent`.
    ///
    /// # Errors
    ///
    /// Returns error if `percent` exceeds 100 or the device call fails.
    pub async fn set_percentage(&mut self, percent: u8) -> Result<(), EntityError> {
        let value = OverrideValue::percent(percent)?;
        self.api.set_override(BOX_NODE_ID, value).await?;
        self.remember(FanMode::Override(percent));
        Ok(())
    }

    /// Remove the override and fall back to the box's own state.
    ///
    /// # Errors
    ///
    /// Returns error if the device call fails.
    pub async fn clear_override(&mut self) -> Result<(), EntityError> {
        self.api
            .set_override(BOX_NODE_ID, OverrideValue::Clear)
            .await?;
        match self.snapshot().box_state.as_ref().and_then(BoxState::state) {
            Some(state) => self.remember(FanMode::for_state(state)),
            None => self.pending = None,
        }
        Ok(())
    }

    /// Switch the box to `state`. The box drops any override on a state change.
    ///
    /// # Errors
    ///
    /// Returns error if the device call fails.
    pub async fn set_preset(&mut self, state: VentilationState) -> Result<(), EntityError> {
        self.api.set_ventilation_state(state).await?;
        self.remember(FanMode::for_state(state));
        Ok(())
    }

    /// Return to automatic ventilation.
    ///
    /// # Errors
    ///
    /// Returns error if the device call fails.
    pub async fn turn_on(&mut self) -> Result<(), EntityError> {
        self.set_preset(VentilationState::Auto).await
    }

    /// The box cannot be switched off.
    ///
    /// # Errors
    ///
    /// Always returns [`EntityError::Unsupported`].
    pub fn turn_off(&self) -> Result<(), EntityError> {
        Err(EntityError::Unsupported("turn_off"))
    }

    fn remember(&mut self, mode: FanMode) {
        let generation = self.snapshots.borrow().generation;
        tracing::debug!(?mode, generation, "Pending fan intent");
        self.pending = Some(PendingIntent { mode, generation });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ducobox_adapter_http::{ClientError, StubApi, StubCall};
    use ducobox_core::Availability;

    fn snapshot(generation: u64, box_state: BoxState) -> Arc<Snapshot> {
        Arc::new(Snapshot {
            generation,
            availability: Availability::Available,
            box_state: Some(box_state),
            ..Snapshot::pending()
        })
    }

    fn box_state(code: &str, override_value: OverrideValue) -> BoxState {
        BoxState {
            state_code: Some(code.to_string()),
            override_value,
            ..StubApi::sample_box_state()
        }
    }

    fn fan(
        stub: &Arc<StubApi>,
        initial: BoxState,
    ) -> (watch::Sender<Arc<Snapshot>>, VentilationFan<StubApi>) {
        let (tx, rx) = watch::channel(snapshot(1, initial));
        (tx, VentilationFan::new(Arc::clone(stub), rx))
    }

    #[test]
    fn mode_from_box_state() {
        assert_eq!(
            FanMode::from_box_state(&box_state("AUTO", OverrideValue::Clear)),
            Some(FanMode::Auto)
        );
        assert_eq!(
            FanMode::from_box_state(&box_state("CNT2", OverrideValue::Clear)),
            Some(FanMode::Preset(VentilationState::Cnt2))
        );
        assert_eq!(
            FanMode::from_box_state(&box_state("MAN1", OverrideValue::Percent(40))),
            Some(FanMode::Override(40))
        );
        assert_eq!(
            FanMode::from_box_state(&box_state("WEIRD", OverrideValue::Percent(40))),
            Some(FanMode::Override(40))
        );
        assert_eq!(
            FanMode::from_box_state(&box_state("WEIRD", OverrideValue::Clear)),
            None
        );
    }

    #[tokio::test]
    async fn unrecognized_state_has_no_mode() {
        let stub = Arc::new(StubApi::new());
        let (_tx, mut fan) = fan(&stub, box_state("WEIRD", OverrideValue::Clear));
        assert!(fan.is_available());
        assert_eq!(fan.mode(), None);
        assert_eq!(fan.percentage(), None);

        fan.clear_override().await.unwrap();
        assert_eq!(fan.mode(), None);

        fan.set_percentage(30).await.unwrap();
        assert_eq!(fan.mode(), Some(FanMode::Override(30)));
    }

    #[tokio::test]
    async fn percentage_is_optimistic_until_next_snapshot() {
        let stub = Arc::new(StubApi::new());
        let (tx, mut fan) = fan(&stub, StubApi::sample_box_state());
        assert_eq!(fan.mode(), Some(FanMode::Auto));

        fan.set_percentage(40).await.unwrap();
        assert_eq!(
            stub.calls(),
            vec![StubCall::SetOverride(BOX_NODE_ID, OverrideValue::Percent(40))]
        );
        assert_eq!(fan.mode(), Some(FanMode::Override(40)));
        assert_eq!(fan.percentage(), Some(40));

        let confirmed = stub.get_box_state().await.unwrap();
        tx.send_replace(snapshot(2, confirmed));
        assert_eq!(fan.mode(), Some(FanMode::Override(40)));

        // The device is the source of truth once a newer snapshot arrives
        tx.send_replace(snapshot(3, StubApi::sample_box_state()));
        assert_eq!(fan.mode(), Some(FanMode::Auto));
        assert_eq!(fan.percentage(), Some(25));
    }

    #[tokio::test]
    async fn newer_snapshot_overrides_unconfirmed_intent() {
        let stub = Arc::new(StubApi::new());
        stub.honor_writes(false);
        let (tx, mut fan) = fan(&stub, StubApi::sample_box_state());

        fan.set_percentage(70).await.unwrap();
        assert_eq!(fan.mode(), Some(FanMode::Override(70)));

        tx.send_replace(snapshot(2, StubApi::sample_box_state()));
        assert_eq!(fan.mode(), Some(FanMode::Auto));
    }

    #[tokio::test]
    async fn clear_override_returns_to_preset() {
        let stub = Arc::new(StubApi::new());
        let (_tx, mut fan) = fan(&stub, box_state("CNT1", OverrideValue::Percent(50)));
        assert_eq!(fan.mode(), Some(FanMode::Override(50)));

        fan.clear_override().await.unwrap();
        assert_eq!(
            stub.calls(),
            vec![StubCall::SetOverride(BOX_NODE_ID, OverrideValue::Clear)]
        );
        assert_eq!(fan.mode(), Some(FanMode::Preset(VentilationState::Cnt1)));
    }

    #[tokio::test]
    async fn clear_override_returns_to_auto() {
        let stub = Arc::new(StubApi::new());
        let (_tx, mut fan) = fan(&stub, box_state("AUTO", OverrideValue::Percent(10)));

        fan.clear_override().await.unwrap();
        assert_eq!(fan.mode(), Some(FanMode::Auto));
    }

    #[tokio::test]
    async fn preset_clears_override() {
        let stub = Arc::new(StubApi::new());
        stub.set_box_state(Ok(box_state("AUTO", OverrideValue::Percent(40))));
        let (tx, mut fan) = fan(&stub, box_state("AUTO", OverrideValue::Percent(40)));

        fan.set_preset(VentilationState::Man2).await.unwrap();
        assert_eq!(
            stub.calls(),
            vec![StubCall::SetState(VentilationState::Man2)]
        );
        assert_eq!(fan.mode(), Some(FanMode::Preset(VentilationState::Man2)));

        let confirmed = stub.get_box_state().await.unwrap();
        assert_eq!(confirmed.override_value, OverrideValue::Clear);
        tx.send_replace(snapshot(2, confirmed));
        assert_eq!(fan.mode(), Some(FanMode::Preset(VentilationState::Man2)));
    }

    #[tokio::test]
    async fn turn_on_selects_auto_and_turn_off_is_unsupported() {
        let stub = Arc::new(StubApi::new());
        let (_tx, mut fan) = fan(&stub, box_state("MAN3", OverrideValue::Clear));

        assert!(matches!(fan.turn_off(), Err(EntityError::Unsupported(_))));
        assert!(stub.calls().is_empty());

        fan.turn_on().await.unwrap();
        assert_eq!(
            stub.calls(),
            vec![StubCall::SetState(VentilationState::Auto)]
        );
        assert_eq!(fan.mode(), Some(FanMode::Auto));
    }

    #[tokio::test]
    async fn failed_write_leaves_mode_untouched() {
        let stub = Arc::new(StubApi::new());
        stub.fail_writes(Some(ClientError::Communication("HTTP 500".to_string())));
        let (_tx, mut fan) = fan(&stub, StubApi::sample_box_state());

        let err = fan.set_percentage(40).await.unwrap_err();
        assert!(matches!(
            err,
            EntityError::Client(ClientError::Communication(_))
        ));
        assert_eq!(fan.mode(), Some(FanMode::Auto));

        let err = fan.set_preset(VentilationState::Empt).await.unwrap_err();
        assert!(matches!(err, EntityError::Client(_)));
        assert_eq!(fan.mode(), Some(FanMode::Auto));
    }

    #[tokio::test]
    async fn out_of_range_percentage_is_not_sent() {
        let stub = Arc::new(StubApi::new());
        let (_tx, mut fan) = fan(&stub, StubApi::sample_box_state());

        let err = fan.set_percentage(101).await.unwrap_err();
        assert!(matches!(err, EntityError::Override(_)));
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn unavailable_before_first_cycle() {
        let stub = Arc::new(StubApi::new());
        let (_tx, rx) = watch::channel(Arc::new(Snapshot::pending()));
        let fan = VentilationFan::new(stub, rx);

        assert!(!fan.is_available());
        assert_eq!(fan.mode(), None);
        assert_eq!(fan.percentage(), None);
        assert_eq!(fan.preset_modes().len(), 8);
    }
}
