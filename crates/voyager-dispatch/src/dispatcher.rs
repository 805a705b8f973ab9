//! Alert request construction.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;
use voyager_types::{
    AlertChannel, AlertPayload, AlertRequest, AlertTarget, EmergencyContact, Position, SessionId,
};

/// Dispatcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Number dialled by the "dial authorities" action
    #[serde(default = "default_authority_number")]
    pub authority_number: String,

    /// App-identifying phrase embedded in every message
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Map link prefix; `{lat},{lng}` is appended
    #[serde(default = "default_map_link_base")]
    pub map_link_base: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            authority_number: default_authority_number(),
            app_name: default_app_name(),
            map_link_base: default_map_link_base(),
        }
    }
}

fn default_authority_number() -> String {
    "112".to_string()
}

fn default_app_name() -> String {
    "Voyager".to_string()
}

fn default_map_link_base() -> String {
    "https://www.google.com/maps?q=".to_string()
}

const SEVERITY_MARKER: &str = "[SOS]";
const COORDINATES_UNAVAILABLE: &str = "Coordinates unavailable.";

/// Strip every non-digit character.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Builds alert requests. Stateless apart from its configuration.
#[derive(Debug, Clone, Default)]
pub struct AlertDispatcher {
    config: DispatchConfig,
}

impl AlertDispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Map link with coordinates as decimal degrees, 6 places.
    pub fn map_link(&self, position: &Position) -> String {
        format!(
            "{}{:.6},{:.6}",
            self.config.map_link_base, position.latitude, position.longitude
        )
    }

    /// Templated message body, degraded when no usable position is known.
    pub fn message_body(&self, latest_position: Option<&Position>) -> String {
        let header = format!(
            "{} {} emergency alert. I need help.",
            SEVERITY_MARKER, self.config.app_name
        );
        match latest_position.filter(|p| p.is_valid()) {
            Some(position) => format!("{} My live location: {}", header, self.map_link(position)),
            None => format!("{} {}", header, COORDINATES_UNAVAILABLE),
        }
    }

    /// Build a request addressed to `contact`.
    ///
    /// A phone number with no digits still yields a request (with an empty
    /// recipient); the adapter decides what to do with it.
    pub fn build_request(
        &self,
        contact: &EmergencyContact,
        channel: AlertChannel,
        latest_position: Option<&Position>,
        session_id: Option<&SessionId>,
    ) -> AlertRequest {
        let number = normalize_phone(&contact.phone);
        if number.is_empty() {
            warn!(
                contact_id = %contact.id,
                "Contact phone has no digits; dispatching with empty recipient"
            );
        }

        let payload = match channel {
            AlertChannel::Call => AlertPayload::Call { number },
            AlertChannel::Message => AlertPayload::Message {
                recipient: number,
                body: self.message_body(latest_position),
            },
        };

        self.request(AlertTarget::Contact(contact.id.clone()), channel, payload, session_id)
    }

    /// CALL request to the public emergency line, independent of contacts.
    pub fn authorities_call(&self, session_id: Option<&SessionId>) -> AlertRequest {
        let payload = AlertPayload::Call {
            number: normalize_phone(&self.config.authority_number),
        };
        self.request(AlertTarget::Authorities, AlertChannel::Call, payload, session_id)
    }

    fn request(
        &self,
        target: AlertTarget,
        channel: AlertChannel,
        payload: AlertPayload,
        session_id: Option<&SessionId>,
    ) -> AlertRequest {
        AlertRequest {
            id: Uuid::new_v4(),
            target,
            channel,
            payload,
            session_id: session_id.cloned(),
            created_at: Utc::now(),
        }
    }
}
