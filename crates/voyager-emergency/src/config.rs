//! Emergency protocol timing configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EmergencyError, EmergencyResult};

/// Timing parameters for an emergency session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyConfig {
    /// Auto-alert countdown start value, in seconds
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,

    /// Hold-to-cancel sampling period in milliseconds
    #[serde(default = "default_hold_tick_ms")]
    pub hold_tick_ms: u64,

    /// Uninterrupted hold required to cancel, in milliseconds
    #[serde(default = "default_hold_duration_ms")]
    pub hold_duration_ms: u64,

    /// Location broadcast period in seconds
    #[serde(default = "default_broadcast_interval_secs")]
    pub broadcast_interval_secs: u64,

    /// Message every trusted contact when the countdown reaches zero
    #[serde(default)]
    pub escalate_on_countdown: bool,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            countdown_secs: default_countdown_secs(),
            hold_tick_ms: default_hold_tick_ms(),
            hold_duration_ms: default_hold_duration_ms(),
            broadcast_interval_secs: default_broadcast_interval_secs(),
            escalate_on_countdown: false,
        }
    }
}

// Default value helpers
fn default_countdown_secs() -> u32 {
    30
}

fn default_hold_tick_ms() -> u64 {
    50
}

fn default_hold_duration_ms() -> u64 {
    5_000
}

fn default_broadcast_interval_secs() -> u64 {
    60
}

impl EmergencyConfig {
    pub fn validate(&self) -> EmergencyResult<()> {
        if self.hold_tick_ms == 0 {
            return Err(EmergencyError::InvalidConfig(
                "hold_tick_ms must be > 0".into(),
            ));
        }
        if self.hold_duration_ms < self.hold_tick_ms {
            return Err(EmergencyError::InvalidConfig(format!(
                "hold_duration_ms ({}) must be at least one tick ({} ms)",
                self.hold_duration_ms, self.hold_tick_ms
            )));
        }
        if self.broadcast_interval_secs == 0 {
            return Err(EmergencyError::InvalidConfig(
                "broadcast_interval_secs must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Number of consecutive hold ticks needed to cancel.
    pub fn hold_ticks_required(&self) -> u32 {
        let ticks = self.hold_duration_ms.div_ceil(self.hold_tick_ms.max(1));
        u32::try_from(ticks).unwrap_or(u32::MAX).max(1)
    }

    pub fn countdown_period(&self) -> Duration {
        Duration::from_secs(1)
    }

    pub fn hold_tick(&self) -> Duration {
        Duration::from_millis(self.hold_tick_ms)
    }

    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_secs(self.broadcast_interval_secs)
    }
}
