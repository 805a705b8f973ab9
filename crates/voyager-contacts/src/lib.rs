//! # voyager-contacts
//!
//! The trusted circle: at most [`MAX_TRUSTED_CONTACTS`] entries, unique
//! ids, insertion order preserved. The first entry is the primary contact.
//!
//! The store is the only writer of the collection. Readers take
//! [`TrustedContactStore::snapshot`]s and never observe a half-applied
//! edit.

pub mod error;
pub mod repository;
pub mod store;

pub use error::{ContactError, ContactResult};
pub use repository::{ContactRepository, InMemoryContactRepository, JsonFileContactRepository};
pub use store::TrustedContactStore;
pub use voyager_types::MAX_TRUSTED_CONTACTS;
