//! The assembled safety engine.
//!
//! Position samples and manual triggers both funnel through the one shared
//! state machine, so a sample is always evaluated against the status that
//! the previous sample (or trigger) left behind.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, instrument};
use uuid::Uuid;
use voyager_contacts::TrustedContactStore;
use voyager_dispatch::{AlertDispatcher, DispatchSink};
use voyager_emergency::{
    EmergencyEvent, EmergencyResult, EmergencySessionController, HoldGesture, SessionSnapshot,
    SharedSafetyState,
};
use voyager_geofence::GeofenceEvaluator;
use voyager_safety::{SafetyEvent, SafetyStateMachine, SafetyTelemetry, StatusChange};
use voyager_types::{Position, PositionFix, SafetyStatus, SessionId};

use crate::config::VoyagerConfig;
use crate::error::RuntimeResult;

/// Geofence, state machine and emergency controller wired together.
pub struct VoyagerEngine {
    evaluator: GeofenceEvaluator,
    safety: SharedSafetyState,
    controller: EmergencySessionController,
    contacts: Arc<TrustedContactStore>,
}

impl VoyagerEngine {
    /// Build the engine. Must be called from within a Tokio runtime.
    pub fn new(
        config: &VoyagerConfig,
        contacts: Arc<TrustedContactStore>,
        sink: Arc<dyn DispatchSink>,
    ) -> RuntimeResult<Self> {
        let evaluator = GeofenceEvaluator::new(config.zones.iter().cloned());
        let safety: SharedSafetyState = Arc::new(Mutex::new(SafetyStateMachine::new()));
        let controller = EmergencySessionController::new(
            config.emergency.clone(),
            safety.clone(),
            contacts.clone(),
            AlertDispatcher::new(config.dispatch.clone()),
            sink,
        )?;

        info!(
            zones = evaluator.zone_count(),
            contacts = contacts.len(),
            "Voyager engine ready"
        );

        Ok(Self {
            evaluator,
            safety,
            controller,
            contacts,
        })
    }

    /// Process one raw sample.
    pub fn ingest_position(&self, latitude: f64, longitude: f64) -> Option<StatusChange> {
        self.ingest(Position::new(latitude, longitude))
    }

    /// Process one sample to completion: evaluate, apply at most one
    /// transition, and remember it for outgoing alerts if it is usable.
    pub fn ingest(&self, position: Position) -> Option<StatusChange> {
        let verdict = self.evaluator.check(&position);
        let change = {
            let mut safety = self.safety.lock();
            let change = safety.observe(&position, verdict);
            // Status and fix change together under this guard.
            if !verdict.invalid_position {
                self.controller.update_position(PositionFix::now(position));
            }
            change
        };

        if verdict.breach && change.is_some() {
            let zones: Vec<&str> = self
                .evaluator
                .breached_zones(&position)
                .into_iter()
                .map(|z| z.name.as_str())
                .collect();
            info!(position = %position, zones = ?zones, "Entered danger zone buffer");
        }
        change
    }

    /// Drain a position stream sample by sample. Returns when the sender
    /// side is dropped.
    pub async fn run_position_stream(&self, mut positions: mpsc::Receiver<Position>) {
        let mut processed: u64 = 0;
        while let Some(position) = positions.recv().await {
            self.ingest(position);
            processed += 1;
        }
        info!(processed, "Position stream ended");
    }

    #[instrument(skip(self))]
    pub fn declare_emergency(&self) -> Option<SessionId> {
        let session = self.controller.declare_emergency();
        if session.is_none() {
            debug!("Emergency already active");
        }
        session
    }

    pub fn confirm_cancel_hold(&self, gesture: HoldGesture) -> EmergencyResult<()> {
        self.controller.confirm_cancel_hold(gesture)
    }

    pub fn hold_start(&self) -> EmergencyResult<()> {
        self.controller.hold_start()
    }

    pub fn hold_release(&self) -> EmergencyResult<()> {
        self.controller.hold_release()
    }

    pub fn set_broadcast(&self, enabled: bool) -> EmergencyResult<bool> {
        self.controller.set_broadcast(enabled)
    }

    pub fn dial_authorities(&self) -> Uuid {
        self.controller.dial_authorities()
    }

    pub fn status(&self) -> SafetyStatus {
        self.safety.lock().status()
    }

    pub fn telemetry(&self) -> SafetyTelemetry {
        self.safety.lock().telemetry()
    }

    pub fn session(&self) -> Option<SessionSnapshot> {
        self.controller.snapshot()
    }

    pub fn latest_fix(&self) -> Option<PositionFix> {
        self.controller.latest_fix()
    }

    /// Status and latest fix read as one pair, both reflecting the same
    /// last sample.
    pub fn status_with_fix(&self) -> (SafetyStatus, Option<PositionFix>) {
        let safety = self.safety.lock();
        (safety.status(), self.controller.latest_fix())
    }

    pub fn subscribe_safety(&self) -> broadcast::Receiver<SafetyEvent> {
        self.safety.lock().subscribe()
    }

    pub fn subscribe_emergency(&self) -> broadcast::Receiver<EmergencyEvent> {
        self.controller.subscribe()
    }

    pub fn contacts(&self) -> &Arc<TrustedContactStore> {
        &self.contacts
    }

    pub fn evaluator(&self) -> &GeofenceEvaluator {
        &self.evaluator
    }

    /// Stop every session timer. The status is left as it is.
    pub fn shutdown(&self) {
        self.controller.shutdown();
    }
}
