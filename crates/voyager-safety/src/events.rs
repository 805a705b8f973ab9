use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use voyager_types::{Notification, SafetyStatus, SessionId};

/// A completed status transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: SafetyStatus,
    pub to: SafetyStatus,
    /// The session created or destroyed by this transition, if any.
    pub session_id: Option<SessionId>,
    pub at: DateTime<Utc>,
}

/// Events emitted by the state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SafetyEvent {
    /// Status moved from one value to another.
    StatusChanged(StatusChange),

    /// User-facing notification for the UI side-channel.
    Notification(Notification),

    /// An out-of-range sample was received and treated as "no breach".
    InvalidPosition { latitude: f64, longitude: f64 },
}

/// Counters kept for data-quality and telemetry reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyTelemetry {
    pub samples: u64,
    pub breaches: u64,
    pub invalid_samples: u64,
    /// Breach or clear samples received while in EMERGENCY.
    pub suppressed_in_emergency: u64,
}
