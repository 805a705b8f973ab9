//! Safety status state machine.
//!
//! All status reads and writes go through one owned instance; callers that
//! need to share it wrap it in a lock and process samples one at a time.

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use voyager_geofence::GeofenceVerdict;
use voyager_types::{Notification, Position, SafetyStatus, SessionId};

use crate::events::{SafetyEvent, SafetyTelemetry, StatusChange};

/// Channel capacity for safety events
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Holds the current [`SafetyStatus`] and the id of the live emergency
/// session, if any.
pub struct SafetyStateMachine {
    status: SafetyStatus,
    active_session: Option<SessionId>,
    telemetry: SafetyTelemetry,
    event_tx: broadcast::Sender<SafetyEvent>,
}

impl SafetyStateMachine {
    /// Create a machine in the initial SAFE state.
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            status: SafetyStatus::Safe,
            active_session: None,
            telemetry: SafetyTelemetry::default(),
            event_tx,
        }
    }

    /// Subscribe to status changes and notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SafetyEvent> {
        self.event_tx.subscribe()
    }

    pub fn status(&self) -> SafetyStatus {
        self.status
    }

    pub fn active_session(&self) -> Option<&SessionId> {
        self.active_session.as_ref()
    }

    pub fn telemetry(&self) -> SafetyTelemetry {
        self.telemetry
    }

    /// Consume one geofence verdict.
    ///
    /// Returns the transition taken, if any. At most one transition and at
    /// most one notification result from a single sample.
    pub fn observe(&mut self, position: &Position, verdict: GeofenceVerdict) -> Option<StatusChange> {
        self.telemetry.samples += 1;

        if verdict.invalid_position {
            self.telemetry.invalid_samples += 1;
            self.emit(SafetyEvent::InvalidPosition {
                latitude: position.latitude,
                longitude: position.longitude,
            });
        }
        if verdict.breach {
            self.telemetry.breaches += 1;
        }

        match (self.status, verdict.breach) {
            (SafetyStatus::Emergency, breach) => {
                self.telemetry.suppressed_in_emergency += 1;
                debug!(breach, "Geofence verdict recorded during emergency; no transition");
                None
            }
            (SafetyStatus::Safe, true) => {
                let change = self.transition(SafetyStatus::Caution, None);
                info!(position = %position, "Perimeter breach detected");
                self.emit(SafetyEvent::Notification(Notification::perimeter_caution()));
                Some(change)
            }
            (SafetyStatus::Caution, false) => Some(self.transition(SafetyStatus::Safe, None)),
            // Still inside while in CAUTION, or still clear while SAFE.
            _ => None,
        }
    }

    /// Manual emergency trigger. Allowed from SAFE and CAUTION regardless of
    /// geofence state.
    ///
    /// Returns the id of the newly created session, or `None` when already
    /// in EMERGENCY (the duplicate trigger is absorbed).
    pub fn declare_emergency(&mut self) -> Option<SessionId> {
        if self.status.is_emergency() {
            debug!(
                session_id = ?self.active_session,
                "Emergency already active; duplicate declaration absorbed"
            );
            return None;
        }

        let session_id = SessionId::generate();
        self.active_session = Some(session_id.clone());
        self.transition(SafetyStatus::Emergency, Some(session_id.clone()));
        warn!(session_id = %session_id, "EMERGENCY declared");
        self.emit(SafetyEvent::Notification(Notification::emergency_declared()));

        Some(session_id)
    }

    /// Leave EMERGENCY after a completed hold-to-cancel.
    ///
    /// Only the live session may cancel; a stale or unknown id is ignored
    /// and `false` is returned.
    pub fn confirm_cancel(&mut self, session_id: &SessionId) -> bool {
        if self.active_session.as_ref() != Some(session_id) {
            warn!(
                session_id = %session_id,
                active = ?self.active_session,
                "Cancel for a session that is not active; ignored"
            );
            return false;
        }

        self.active_session = None;
        self.transition(SafetyStatus::Safe, Some(session_id.clone()));
        info!(session_id = %session_id, "Emergency cancelled by confirmed hold");
        self.emit(SafetyEvent::Notification(Notification::emergency_cancelled()));
        true
    }

    fn transition(&mut self, to: SafetyStatus, session_id: Option<SessionId>) -> StatusChange {
        let change = StatusChange {
            from: self.status,
            to,
            session_id,
            at: Utc::now(),
        };
        info!(from = %change.from, to = %change.to, "Safety status changed");
        self.status = to;
        self.emit(SafetyEvent::StatusChanged(change.clone()));
        change
    }

    fn emit(&self, event: SafetyEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

impl Default for SafetyStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
