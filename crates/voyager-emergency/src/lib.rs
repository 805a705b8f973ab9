//! # voyager-emergency
//!
//! Emergency session lifecycle. A session exists from a manual emergency
//! declaration until a confirmed hold-to-cancel, and runs three
//! independent timing processes:
//!
//! - **Auto-alert countdown**: 1 Hz, 30 → 0, freezes at 0 and signals
//!   [`EmergencyEvent::AutoAlertDue`] exactly once.
//! - **Hold-to-cancel**: while the cancel gesture is held, progress rises
//!   one point per 50 ms tick; an uninterrupted 5 s hold reaches 100 and
//!   cancels the emergency exactly once. Release resets progress to 0.
//! - **Location broadcast**: opt-in; messages the primary contact
//!   immediately and then every 60 s with the latest known position.
//!
//! Every timer task carries the [`SessionId`](voyager_types::SessionId) it
//! was spawned for and re-checks it under the session lock before acting.
//! Teardown aborts all tasks and clears the session under that same lock,
//! so nothing from a destroyed session can tick, dispatch or notify.

pub mod config;
pub mod controller;
pub mod countdown;
pub mod error;
pub mod events;
pub mod hold;

pub use config::EmergencyConfig;
pub use controller::{EmergencySessionController, SharedSafetyState};
pub use countdown::{Countdown, CountdownTick};
pub use error::{EmergencyError, EmergencyResult};
pub use events::{EmergencyEvent, HoldGesture, SessionSnapshot};
pub use hold::{HoldGate, HoldTick};
