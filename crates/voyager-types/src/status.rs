use serde::{Deserialize, Serialize};

/// Coarse safety status. Exactly one value holds at any time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyStatus {
    #[default]
    Safe,
    Caution,
    Emergency,
}

impl SafetyStatus {
    pub fn is_emergency(&self) -> bool {
        matches!(self, SafetyStatus::Emergency)
    }
}

impl std::fmt::Display for SafetyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SafetyStatus::Safe => write!(f, "SAFE"),
            SafetyStatus::Caution => write!(f, "CAUTION"),
            SafetyStatus::Emergency => write!(f, "EMERGENCY"),
        }
    }
}
