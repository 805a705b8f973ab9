use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voyager_types::{AlertChannel, AlertTarget, ContactId, SessionId};

/// The two manual inputs of the hold-to-cancel gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldGesture {
    Start,
    Stop,
}

/// Events emitted by the emergency controller. Each carries the session it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EmergencyEvent {
    SessionStarted {
        session_id: SessionId,
        countdown: u32,
    },

    CountdownTick {
        session_id: SessionId,
        remaining: u32,
    },

    /// Countdown reached zero. Emitted once per session.
    AutoAlertDue { session_id: SessionId },

    HoldProgress { session_id: SessionId, progress: u8 },

    /// The hold was released before completion; progress is back to 0.
    HoldReset { session_id: SessionId },

    BroadcastEnabled {
        session_id: SessionId,
        primary: ContactId,
    },

    BroadcastDisabled { session_id: SessionId },

    /// A request was handed to the dispatch sink.
    AlertDispatched {
        session_id: Option<SessionId>,
        request_id: Uuid,
        channel: AlertChannel,
        target: AlertTarget,
    },

    SessionEnded { session_id: SessionId },
}

impl EmergencyEvent {
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            EmergencyEvent::SessionStarted { session_id, .. }
            | EmergencyEvent::CountdownTick { session_id, .. }
            | EmergencyEvent::AutoAlertDue { session_id }
            | EmergencyEvent::HoldProgress { session_id, .. }
            | EmergencyEvent::HoldReset { session_id }
            | EmergencyEvent::BroadcastEnabled { session_id, .. }
            | EmergencyEvent::BroadcastDisabled { session_id }
            | EmergencyEvent::SessionEnded { session_id } => Some(session_id),
            EmergencyEvent::AlertDispatched { session_id, .. } => session_id.as_ref(),
        }
    }
}

/// Point-in-time view of the live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub started_at: DateTime<Utc>,
    pub countdown_remaining: u32,
    pub auto_alert_due: bool,
    pub hold_progress: u8,
    pub holding: bool,
    pub broadcast_active: bool,
    pub broadcasts_sent: u64,
}
