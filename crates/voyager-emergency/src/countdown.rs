//! Auto-alert countdown.

/// Result of advancing the countdown by one second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownTick {
    /// Still counting; seconds left.
    Remaining(u32),
    /// Reached zero on this tick. Returned exactly once.
    Expired,
    /// Already at zero; nothing changes.
    Frozen,
}

/// Monotonically decreasing counter that freezes at zero.
#[derive(Clone, Debug)]
pub struct Countdown {
    remaining: u32,
    expired: bool,
}

impl Countdown {
    pub fn new(start_secs: u32) -> Self {
        Self {
            remaining: start_secs,
            expired: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn tick(&mut self) -> CountdownTick {
        if self.expired {
            return CountdownTick::Frozen;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.expired = true;
            CountdownTick::Expired
        } else {
            CountdownTick::Remaining(self.remaining)
        }
    }
}
