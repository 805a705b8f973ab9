//! # voyager-safety
//!
//! The single owner of [`SafetyStatus`](voyager_types::SafetyStatus).
//!
//! ```text
//! SAFE ──breach──▶ CAUTION ──clear──▶ SAFE
//!   │                 │
//!   └──declare────────┴──declare──▶ EMERGENCY ──confirmed cancel──▶ SAFE
//! ```
//!
//! - The caution notification fires on the SAFE → CAUTION edge only.
//! - EMERGENCY ignores geofence verdicts; only a confirmed cancel for the
//!   live session leaves it.
//! - Re-declaring while already in EMERGENCY is absorbed as a no-op.

pub mod events;
pub mod machine;

pub use events::{SafetyEvent, SafetyTelemetry, StatusChange};
pub use machine::SafetyStateMachine;
