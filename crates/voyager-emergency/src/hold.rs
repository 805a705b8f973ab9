//! Hold-to-cancel confirmation gate.
//!
//! Progress only accrues during one continuous hold. Each hold is an
//! attempt with its own number; ticks for any other attempt are stale and
//! ignored, which is how a tick racing a release is dropped.

/// Result of one hold tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldTick {
    /// Progress after this tick, 0..100 exclusive.
    Progress(u8),
    /// Reached 100 on this tick. Returned at most once per gate.
    Completed,
    /// Not holding, a different attempt, or already completed.
    Stale,
}

#[derive(Clone, Debug)]
pub struct HoldGate {
    required_ticks: u32,
    ticks: u32,
    attempt: u64,
    holding: bool,
    completed: bool,
}

impl HoldGate {
    pub fn new(required_ticks: u32) -> Self {
        Self {
            required_ticks: required_ticks.max(1),
            ticks: 0,
            attempt: 0,
            holding: false,
            completed: false,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Current progress in percent, never above 100.
    pub fn progress(&self) -> u8 {
        if self.completed {
            return 100;
        }
        let percent = u64::from(self.ticks) * 100 / u64::from(self.required_ticks);
        percent.min(100) as u8
    }

    /// Begin a hold. Returns the new attempt number, or `None` when a hold
    /// is already in progress or the gate has completed.
    pub fn start(&mut self) -> Option<u64> {
        if self.holding || self.completed {
            return None;
        }
        self.attempt += 1;
        self.holding = true;
        self.ticks = 0;
        Some(self.attempt)
    }

    /// End the current hold and discard its progress.
    ///
    /// Returns `false` if no hold was in progress.
    pub fn release(&mut self) -> bool {
        if !self.holding {
            return false;
        }
        self.holding = false;
        self.ticks = 0;
        true
    }

    pub fn tick(&mut self, attempt: u64) -> HoldTick {
        if !self.holding || self.completed || attempt != self.attempt {
            return HoldTick::Stale;
        }

        self.ticks += 1;
        if self.ticks >= self.required_ticks {
            self.completed = true;
            self.holding = false;
            HoldTick::Completed
        } else {
            HoldTick::Progress(self.progress())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_hold_completes_exactly_once() {
        let mut gate = HoldGate::new(100);
        let attempt = gate.start().unwrap();

        for i in 1..100 {
            assert_eq!(gate.tick(attempt), HoldTick::Progress(i as u8));
        }
        assert_eq!(gate.tick(attempt), HoldTick::Completed);
        assert_eq!(gate.progress(), 100);

        assert_eq!(gate.tick(attempt), HoldTick::Stale);
        assert!(gate.start().is_none());
    }

    #[test]
    fn release_discards_progress() {
        let mut gate = HoldGate::new(100);
        let first = gate.start().unwrap();
        for _ in 0..98 {
            gate.tick(first);
        }
        assert_eq!(gate.progress(), 98);

        assert!(gate.release());
        assert_eq!(gate.progress(), 0);
        assert!(!gate.release());

        let second = gate.start().unwrap();
        assert_ne!(first, second);
        for _ in 0..99 {
            assert!(matches!(gate.tick(second), HoldTick::Progress(_)));
        }
        assert_eq!(gate.tick(second), HoldTick::Completed);
    }

    #[test]
    fn ticks_from_an_old_attempt_are_stale() {
        let mut gate = HoldGate::new(10);
        let first = gate.start().unwrap();
        gate.release();
        let second = gate.start().unwrap();

        assert_eq!(gate.tick(first), HoldTick::Stale);
        assert_eq!(gate.tick(second), HoldTick::Progress(10));
    }

    #[test]
    fn tick_after_release_is_stale() {
        let mut gate = HoldGate::new(10);
        let attempt = gate.start().unwrap();
        gate.tick(attempt);
        gate.release();
        assert_eq!(gate.tick(attempt), HoldTick::Stale);
        assert_eq!(gate.progress(), 0);
    }

    #[test]
    fn duplicate_start_keeps_current_attempt() {
        let mut gate = HoldGate::new(10);
        let attempt = gate.start().unwrap();
        gate.tick(attempt);
        assert!(gate.start().is_none());
        assert_eq!(gate.progress(), 10);
    }

    #[test]
    fn coarse_ticks_never_overshoot() {
        let mut gate = HoldGate::new(3);
        let attempt = gate.start().unwrap();
        assert_eq!(gate.tick(attempt), HoldTick::Progress(33));
        assert_eq!(gate.tick(attempt), HoldTick::Progress(66));
        assert_eq!(gate.tick(attempt), HoldTick::Completed);
        assert!(gate.progress() <= 100);
    }
}
