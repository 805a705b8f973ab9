use serde::{Deserialize, Serialize};

/// Severity of a user-facing notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Caution,
    Critical,
}

/// Outward event for the UI layer. Rendering, vibration and audio are the
/// consumer's decision; `vibration_ms` is only a hint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vibration_ms: Vec<u64>,
}

impl Notification {
    pub const CAUTION_MESSAGE: &'static str = "Security Caution: Perimeter Buffer Reached";
    pub const EMERGENCY_MESSAGE: &'static str = "Emergency declared: alerting trusted contacts";
    pub const CANCELLED_MESSAGE: &'static str = "Emergency cancelled: status restored to safe";

    /// Fired once on the SAFE -> CAUTION edge.
    pub fn perimeter_caution() -> Self {
        Self {
            severity: Severity::Caution,
            message: Self::CAUTION_MESSAGE.to_string(),
            vibration_ms: vec![200, 100, 200],
        }
    }

    pub fn emergency_declared() -> Self {
        Self {
            severity: Severity::Critical,
            message: Self::EMERGENCY_MESSAGE.to_string(),
            vibration_ms: Vec::new(),
        }
    }

    pub fn emergency_cancelled() -> Self {
        Self {
            severity: Severity::Info,
            message: Self::CANCELLED_MESSAGE.to_string(),
            vibration_ms: Vec::new(),
        }
    }
}
