//! Voyager runtime
//!
//! Composition root for the safety engine:
//! - `VoyagerConfig`: layered configuration (defaults, file, environment)
//! - `VoyagerEngine`: geofence, state machine and emergency controller
//!   wired to one contact store and one dispatch sink
//! - `Command`: the line protocol spoken by `voyagerd`

pub mod command;
pub mod config;
pub mod engine;
pub mod error;

pub use command::{Command, ParseCommandError};
pub use config::{ContactsConfig, LoggingConfig, VoyagerConfig};
pub use engine::VoyagerEngine;
pub use error::{RuntimeError, RuntimeResult};
