//! Voyager Types - Core data model for traveler safety monitoring
//!
//! Voyager tracks a traveler's position against known danger zones,
//! derives a coarse safety status, and runs a time-boxed emergency
//! protocol that alerts trusted contacts.
//!
//! ## Architectural Boundaries
//!
//! - **voyager-geofence** owns: breach evaluation (pure)
//! - **voyager-safety** owns: the [`SafetyStatus`] value and its transitions
//! - **voyager-emergency** owns: emergency session state and its timers
//! - **voyager-dispatch** owns: alert formatting; delivery is external
//! - **voyager-contacts** owns: the bounded trusted-contact collection
//!
//! ## Key Concepts
//!
//! - **Position**: a single `(latitude, longitude)` sample
//! - **DangerZone**: a circular risk perimeter
//! - **EmergencyContact**: a member of the trusted circle (at most five)
//! - **AlertRequest**: a one-shot dispatch request handed to an adapter
//! - **Notification**: a user-facing event emitted on status transitions

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod alert;
pub mod contact;
pub mod ids;
pub mod notification;
pub mod position;
pub mod status;
pub mod zone;

pub use alert::{AlertChannel, AlertPayload, AlertRequest, AlertTarget};
pub use contact::{ContactUpdate, EmergencyContact, MAX_TRUSTED_CONTACTS};
pub use ids::{ContactId, SessionId, ZoneId};
pub use notification::{Notification, Severity};
pub use position::{Position, PositionFix};
pub use status::SafetyStatus;
pub use zone::{DangerZone, ZoneError, ZoneKind};
