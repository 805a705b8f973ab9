use thiserror::Error;

/// Errors from the emergency session controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmergencyError {
    #[error("no emergency session is active")]
    NoActiveSession,

    #[error("emergency controller must be created inside a Tokio runtime")]
    NoRuntime,

    #[error("invalid emergency configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for emergency operations
pub type EmergencyResult<T> = Result<T, EmergencyError>;
