use parking_lot::RwLock;
use tracing::{debug, info, warn};
use voyager_types::{ContactId, ContactUpdate, EmergencyContact, MAX_TRUSTED_CONTACTS};

use crate::error::{ContactError, ContactResult};
use crate::repository::ContactRepository;

/// Bounded, ordered collection of trusted contacts.
#[derive(Debug, Default)]
pub struct TrustedContactStore {
    contacts: RwLock<Vec<EmergencyContact>>,
}

impl TrustedContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a persisted list.
    ///
    /// Duplicate ids keep their first occurrence and entries past the
    /// capacity are dropped, both with a warning.
    pub fn from_contacts(contacts: impl IntoIterator<Item = EmergencyContact>) -> Self {
        let mut kept: Vec<EmergencyContact> = Vec::with_capacity(MAX_TRUSTED_CONTACTS);
        for contact in contacts {
            if kept.iter().any(|c| c.id == contact.id) {
                warn!(contact_id = %contact.id, "Duplicate contact id in persisted list; dropped");
                continue;
            }
            if kept.len() == MAX_TRUSTED_CONTACTS {
                warn!(contact_id = %contact.id, "Persisted list exceeds capacity; contact dropped");
                continue;
            }
            kept.push(contact);
        }

        Self {
            contacts: RwLock::new(kept),
        }
    }

    /// Load the store from a repository.
    pub async fn load_from(repository: &dyn ContactRepository) -> ContactResult<Self> {
        let contacts = repository.load().await?;
        let store = Self::from_contacts(contacts);
        info!(count = store.len(), "Trusted contacts loaded");
        Ok(store)
    }

    /// Persist the current snapshot.
    pub async fn save_to(&self, repository: &dyn ContactRepository) -> ContactResult<()> {
        let snapshot = self.snapshot();
        repository.save(&snapshot).await
    }

    pub fn capacity(&self) -> usize {
        MAX_TRUSTED_CONTACTS
    }

    pub fn len(&self) -> usize {
        self.contacts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.read().is_empty()
    }

    /// Append a contact. Fails without modifying the store when full or
    /// when the id is already present.
    pub fn add(&self, contact: EmergencyContact) -> ContactResult<()> {
        let mut contacts = self.contacts.write();

        if contacts.len() >= MAX_TRUSTED_CONTACTS {
            warn!(contact_id = %contact.id, "Trusted circle full; add rejected");
            return Err(ContactError::CapacityExceeded {
                capacity: MAX_TRUSTED_CONTACTS,
            });
        }
        if contacts.iter().any(|c| c.id == contact.id) {
            return Err(ContactError::DuplicateId(contact.id));
        }

        debug!(contact_id = %contact.id, position = contacts.len(), "Contact added");
        contacts.push(contact);
        Ok(())
    }

    /// Remove a contact. Removing an absent id is not an error.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&self, id: &ContactId) -> bool {
        let mut contacts = self.contacts.write();
        let before = contacts.len();
        contacts.retain(|c| &c.id != id);
        let removed = contacts.len() != before;
        if removed {
            debug!(contact_id = %id, "Contact removed");
        }
        removed
    }

    /// Edit a contact in place; its position is unchanged.
    pub fn update(&self, id: &ContactId, update: ContactUpdate) -> ContactResult<EmergencyContact> {
        let mut contacts = self.contacts.write();
        let contact = contacts
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| ContactError::NotFound(id.clone()))?;

        contact.apply(update);
        debug!(contact_id = %id, "Contact updated");
        Ok(contact.clone())
    }

    /// Move a contact to the front, making it the primary contact. The
    /// relative order of the others is preserved.
    pub fn set_primary(&self, id: &ContactId) -> ContactResult<()> {
        let mut contacts = self.contacts.write();
        let index = contacts
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| ContactError::NotFound(id.clone()))?;

        let contact = contacts.remove(index);
        contacts.insert(0, contact);
        info!(contact_id = %id, "Primary contact changed");
        Ok(())
    }

    pub fn get(&self, id: &ContactId) -> Option<EmergencyContact> {
        self.contacts.read().iter().find(|c| &c.id == id).cloned()
    }

    /// First contact by order, if any.
    pub fn primary(&self) -> Option<EmergencyContact> {
        self.contacts.read().first().cloned()
    }

    /// Ordered copy of the collection.
    pub fn snapshot(&self) -> Vec<EmergencyContact> {
        self.contacts.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(n: usize) -> EmergencyContact {
        EmergencyContact::new(
            format!("c{n}"),
            format!("Contact {n}"),
            format!("+91 98300 0000{n}"),
            "Friend",
        )
    }

    fn ids(store: &TrustedContactStore) -> Vec<String> {
        store.snapshot().into_iter().map(|c| c.id.0).collect()
    }

    #[test]
    fn sixth_add_is_rejected() {
        let store = TrustedContactStore::new();
        for n in 1..=5 {
            store.add(contact(n)).unwrap();
        }

        let err = store.add(contact(6)).unwrap_err();
        assert!(matches!(err, ContactError::CapacityExceeded { capacity: 5 }));
        assert_eq!(store.len(), 5);
        assert_eq!(ids(&store), ["c1", "c2", "c3", "c4", "c5"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let store = TrustedContactStore::new();
        store.add(contact(1)).unwrap();
        assert!(matches!(store.add(contact(1)), Err(ContactError::DuplicateId(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_is_idempotent_and_promotes_next() {
        let store = TrustedContactStore::new();
        for n in 1..=3 {
            store.add(contact(n)).unwrap();
        }

        assert!(store.remove(&ContactId::new("c1")));
        assert!(!store.remove(&ContactId::new("c1")));
        assert_eq!(store.primary().map(|c| c.id.0), Some("c2".to_string()));
    }

    #[test]
    fn update_preserves_order() {
        let store = TrustedContactStore::new();
        for n in 1..=3 {
            store.add(contact(n)).unwrap();
        }

        let updated = store
            .update(&ContactId::new("c2"), ContactUpdate::phone("033 2223 1890"))
            .unwrap();
        assert_eq!(updated.phone, "033 2223 1890");
        assert_eq!(ids(&store), ["c1", "c2", "c3"]);

        assert!(matches!(
            store.update(&ContactId::new("zz"), ContactUpdate::default()),
            Err(ContactError::NotFound(_))
        ));
    }

    #[test]
    fn new_contacts_append() {
        let store = TrustedContactStore::new();
        store.add(contact(2)).unwrap();
        store.add(contact(1)).unwrap();
        assert_eq!(ids(&store), ["c2", "c1"]);
    }

    #[test]
    fn set_primary_moves_to_front() {
        let store = TrustedContactStore::new();
        for n in 1..=4 {
            store.add(contact(n)).unwrap();
        }

        store.set_primary(&ContactId::new("c3")).unwrap();
        assert_eq!(ids(&store), ["c3", "c1", "c2", "c4"]);
        assert!(store.set_primary(&ContactId::new("c9")).is_err());
    }

    #[test]
    fn from_contacts_enforces_invariants() {
        let mut list: Vec<_> = (1..=7).map(contact).collect();
        list.insert(1, contact(1));

        let store = TrustedContactStore::from_contacts(list);
        assert_eq!(ids(&store), ["c1", "c2", "c3", "c4", "c5"]);
    }

    #[test]
    fn empty_store_has_no_primary() {
        let store = TrustedContactStore::new();
        assert!(store.primary().is_none());
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 5);
    }
}
