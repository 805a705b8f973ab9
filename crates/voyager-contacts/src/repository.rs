//! Persistence for the trusted-contact list.
//!
//! The only format guarantee is "array of EmergencyContact, order
//! preserving".

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use voyager_types::EmergencyContact;

use crate::error::{ContactError, ContactResult};

/// Loads and saves the ordered contact list.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Load the persisted list. A missing list loads as empty.
    async fn load(&self) -> ContactResult<Vec<EmergencyContact>>;

    /// Replace the persisted list.
    async fn save(&self, contacts: &[EmergencyContact]) -> ContactResult<()>;
}

/// In-memory repository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryContactRepository {
    contacts: RwLock<Vec<EmergencyContact>>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contacts(contacts: Vec<EmergencyContact>) -> Self {
        Self {
            contacts: RwLock::new(contacts),
        }
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn load(&self) -> ContactResult<Vec<EmergencyContact>> {
        Ok(self.contacts.read().await.clone())
    }

    async fn save(&self, contacts: &[EmergencyContact]) -> ContactResult<()> {
        *self.contacts.write().await = contacts.to_vec();
        Ok(())
    }
}

/// JSON file repository (pretty-printed array).
#[derive(Debug, Clone)]
pub struct JsonFileContactRepository {
    path: PathBuf,
}

impl JsonFileContactRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ContactError {
        ContactError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl ContactRepository for JsonFileContactRepository {
    async fn load(&self) -> ContactResult<Vec<EmergencyContact>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No contact file yet; starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&raw).map_err(|source| ContactError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, contacts: &[EmergencyContact]) -> ContactResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }

        let json = serde_json::to_string_pretty(contacts)?;

        // Write then rename so a crash never leaves a truncated list behind.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), count = contacts.len(), "Contacts saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TrustedContactStore;

    fn circle() -> Vec<EmergencyContact> {
        vec![
            EmergencyContact::new("c1", "Asha", "+91 98300 12345", "Sister"),
            EmergencyContact::new("c2", "Rahul", "+91 98300 54321", "Friend"),
        ]
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileContactRepository::new(dir.path().join("contacts.json"));
        assert!(repo.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileContactRepository::new(dir.path().join("nested/contacts.json"));

        let store = TrustedContactStore::from_contacts(circle());
        store.set_primary(&"c2".into()).unwrap();
        store.save_to(&repo).await.unwrap();

        let reloaded = TrustedContactStore::load_from(&repo).await.unwrap();
        let ids: Vec<_> = reloaded.snapshot().into_iter().map(|c| c.id.0).collect();
        assert_eq!(ids, ["c2", "c1"]);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let repo = JsonFileContactRepository::new(&path);
        assert!(matches!(repo.load().await, Err(ContactError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn in_memory_repository() {
        let repo = InMemoryContactRepository::with_contacts(circle());
        let store = TrustedContactStore::load_from(&repo).await.unwrap();
        assert_eq!(store.len(), 2);

        store.remove(&"c1".into());
        store.save_to(&repo).await.unwrap();
        assert_eq!(repo.load().await.unwrap().len(), 1);
    }
}
