use std::path::PathBuf;

use thiserror::Error;
use voyager_types::ContactId;

/// Rejected contact operations and persistence failures.
///
/// A rejection never leaves the store partially modified.
#[derive(Error, Debug)]
pub enum ContactError {
    #[error("trusted circle is full ({capacity} contacts)")]
    CapacityExceeded { capacity: usize },

    #[error("contact {0} already exists")]
    DuplicateId(ContactId),

    #[error("contact {0} not found")]
    NotFound(ContactId),

    #[error("contact file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("contact file {} is not a valid contact list: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for contact operations
pub type ContactResult<T> = Result<T, ContactError>;
