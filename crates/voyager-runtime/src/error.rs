//! Error types for the Voyager runtime

use thiserror::Error;
use voyager_contacts::ContactError;
use voyager_emergency::EmergencyError;

/// Runtime errors
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Contacts error: {0}")]
    Contacts(#[from] ContactError),

    #[error("Emergency controller error: {0}")]
    Emergency(#[from] EmergencyError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for RuntimeError {
    fn from(err: config::ConfigError) -> Self {
        RuntimeError::Config(err.to_string())
    }
}

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
