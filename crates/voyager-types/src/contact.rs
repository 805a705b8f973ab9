use serde::{Deserialize, Serialize};

use crate::ids::ContactId;

/// Upper bound on the trusted circle.
pub const MAX_TRUSTED_CONTACTS: usize = 5;

/// A member of the traveler's trusted circle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
    pub relation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
}

impl EmergencyContact {
    pub fn new(
        id: impl Into<ContactId>,
        name: impl Into<String>,
        phone: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            relation: relation.into(),
            avatar_ref: None,
        }
    }

    /// Apply the present fields of `update`, leaving the rest untouched.
    pub fn apply(&mut self, update: ContactUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(relation) = update.relation {
            self.relation = relation;
        }
        if let Some(avatar_ref) = update.avatar_ref {
            self.avatar_ref = avatar_ref;
        }
    }
}

/// Partial edit of a contact. `avatar_ref: Some(None)` clears the avatar.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub relation: Option<String>,
    pub avatar_ref: Option<Option<String>>,
}

impl ContactUpdate {
    pub fn phone(phone: impl Into<String>) -> Self {
        Self {
            phone: Some(phone.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_only_touches_present_fields() {
        let mut contact = EmergencyContact::new("c1", "Asha", "+91 98300 12345", "Sister");
        contact.avatar_ref = Some("asha.png".into());

        contact.apply(ContactUpdate::phone("033 2204 1100"));
        assert_eq!(contact.phone, "033 2204 1100");
        assert_eq!(contact.name, "Asha");
        assert_eq!(contact.avatar_ref.as_deref(), Some("asha.png"));

        contact.apply(ContactUpdate {
            avatar_ref: Some(None),
            ..Default::default()
        });
        assert!(contact.avatar_ref.is_none());
    }
}
