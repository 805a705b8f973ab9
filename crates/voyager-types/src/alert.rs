use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{ContactId, SessionId};

/// Category of outbound alert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertChannel {
    Call,
    Message,
}

/// Who an alert is addressed to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum AlertTarget {
    Contact(ContactId),
    /// The configured public emergency line; not tied to any contact.
    Authorities,
}

/// Channel-specific request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum AlertPayload {
    Call { number: String },
    Message { recipient: String, body: String },
}

/// A one-shot request for an external channel adapter.
///
/// The engine never tracks delivery of a request once it is handed off.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertRequest {
    pub id: Uuid,
    pub target: AlertTarget,
    pub channel: AlertChannel,
    pub payload: AlertPayload,
    pub session_id: Option<SessionId>,
    pub created_at: DateTime<Utc>,
}

impl AlertRequest {
    pub fn contact_id(&self) -> Option<&ContactId> {
        match &self.target {
            AlertTarget::Contact(id) => Some(id),
            AlertTarget::Authorities => None,
        }
    }

    pub fn message_body(&self) -> Option<&str> {
        match &self.payload {
            AlertPayload::Message { body, .. } => Some(body),
            AlertPayload::Call { .. } => None,
        }
    }
}
