//! Configured card identity.
//!
//! The identity scopes state lookup, event filtering and persistence keys.
//! It is fixed once the card configuration is accepted.

use std::fmt::{Display, Formatter};

/// Prefix of the persisted notification blob key.
pub const STORAGE_KEY_PREFIX: &str = "savedNotifications_";

const PERSON_DOMAIN: &str = "person";

/// Whose notifications a card shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// A person by name, resolved as the `person.<name>` state object.
    Person(String),
    /// Any state object by full entity id.
    Entity(String),
}

impl Identity {
    /// Key used in event target lists and persistence keys.
    pub fn key(&self) -> &str {
        match self {
            Self::Person(name) => name,
            Self::Entity(entity_id) => entity_id,
        }
    }

    /// State object id looked up in the host context.
    pub fn entity_id(&self) -> String {
        match self {
            Self::Person(name) => format!("{PERSON_DOMAIN}.{name}"),
            Self::Entity(entity_id) => entity_id.clone(),
        }
    }

    /// Persistence key for the last accepted notification list.
    pub fn storage_key(&self) -> String {
        format!("{STORAGE_KEY_PREFIX}{}", self.key())
    }

    /// Returns whether an event target entry refers to this identity.
    ///
    /// Targets may carry either the bare key or the full entity id.
    pub fn matches_target(&self, target: &str) -> bool {
        target == self.key() || target == self.entity_id()
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.entity_id())
    }
}

#[cfg(test)]
mod tests {
    use super::Identity;

    #[test]
    fn person_identity_derives_entity_and_storage_keys() {
        let identity = Identity::Person("alice".to_string());
        assert_eq!(identity.key(), "alice");
        assert_eq!(identity.entity_id(), "person.alice");
        assert_eq!(identity.storage_key(), "savedNotifications_alice");
    }

    #[test]
    fn entity_identity_uses_entity_id_verbatim() {
        let identity = Identity::Entity("sensor.door_log".to_string());
        assert_eq!(identity.key(), "sensor.door_log");
        assert_eq!(identity.entity_id(), "sensor.door_log");
        assert_eq!(identity.storage_key(), "savedNotifications_sensor.door_log");
    }

    #[test]
    fn matches_bare_key_or_entity_id() {
        let identity = Identity::Person("bob".to_string());
        assert!(identity.matches_target("bob"));
        assert!(identity.matches_target("person.bob"));
        assert!(!identity.matches_target("person.bobby"));
        assert!(!identity.matches_target("Bob"));
    }
}
