//! Notification event payload decoding.

use crate::model::identity::Identity;
use crate::model::notification::NotificationList;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Targets {
    One(String),
    Many(Vec<String>),
}

impl Targets {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(target) => vec![target],
            Self::Many(targets) => targets,
        }
    }
}

/// Decoded `notifyhelper_update` payload.
///
/// `person`, `targets` and `entities` may appear together; their entries
/// are merged in that order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawNotifyPayload {
    person: Option<Targets>,
    targets: Option<Targets>,
    entities: Option<Targets>,
    notifications: Option<Value>,
}

impl RawNotifyPayload {
    fn merged_targets(&mut self) -> Vec<String> {
        let mut merged: Vec<String> = Vec::new();
        for field in [&mut self.person, &mut self.targets, &mut self.entities] {
            for target in field.take().map(Targets::into_vec).unwrap_or_default() {
                if !merged.contains(&target) {
                    merged.push(target);
                }
            }
        }
        merged
    }
}

/// Notification update addressed to a set of identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyPayload {
    pub targets: Vec<String>,
    pub notifications: NotificationList,
}

impl NotifyPayload {
    /// Decodes an event payload. Returns `None` when it has the wrong shape.
    pub fn from_value(data: &Value) -> Option<Self> {
        let mut raw: RawNotifyPayload = serde_json::from_value(data.clone()).ok()?;
        let targets = raw.merged_targets();
        let notifications = match raw.notifications {
            None | Some(Value::Null) => NotificationList::default(),
            Some(value) => notifications_from_value(&value)?,
        };
        Some(Self {
            targets,
            notifications,
        })
    }

    pub fn is_for(&self, identity: &Identity) -> bool {
        self.targets
            .iter()
            .any(|target| identity.matches_target(target))
    }
}

/// Reads a JSON array as a notification list.
///
/// Non-string entries are kept as their JSON text. Anything but an array
/// yields `None`.
pub fn notifications_from_value(value: &Value) -> Option<NotificationList> {
    let items = value.as_array()?;
    Some(NotificationList::new(
        items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::{notifications_from_value, NotifyPayload};
    use crate::model::identity::Identity;
    use serde_json::json;

    #[test]
    fn decodes_person_targets_and_notifications() {
        let payload = NotifyPayload::from_value(&json!({
            "person": ["alice", "bob"],
            "notifications": ["hi", "<b>there</b>"]
        }))
        .expect("payload");
        assert_eq!(payload.targets, ["alice", "bob"]);
        assert_eq!(payload.notifications.as_slice(), ["hi", "<b>there</b>"]);
        assert!(payload.is_for(&Identity::Person("bob".to_string())));
        assert!(!payload.is_for(&Identity::Person("carol".to_string())));
    }

    #[test]
    fn accepts_single_target_and_missing_notifications() {
        let payload = NotifyPayload::from_value(&json!({ "targets": "person.alice" }))
            .expect("payload");
        assert!(payload.is_for(&Identity::Person("alice".to_string())));
        assert!(payload.notifications.is_empty());
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(NotifyPayload::from_value(&json!("nope")).is_none());
        assert!(NotifyPayload::from_value(&json!({ "person": 5 })).is_none());
        assert!(
            NotifyPayload::from_value(&json!({ "person": ["a"], "notifications": "x" })).is_none()
        );
    }

    #[test]
    fn person_and_targets_keys_are_merged() {
        let payload = NotifyPayload::from_value(&json!({
            "person": "alice",
            "targets": ["person.bob", "alice"],
            "entities": ["sensor.door"],
            "notifications": ["hi"]
        }))
        .expect("combined keys decode");
        assert_eq!(payload.targets, ["alice", "person.bob", "sensor.door"]);
        assert!(payload.is_for(&Identity::Person("bob".to_string())));
        assert!(payload.is_for(&Identity::Entity("sensor.door".to_string())));
        assert_eq!(payload.notifications.as_slice(), ["hi"]);
    }

    #[test]
    fn non_string_entries_keep_json_text() {
        let list = notifications_from_value(&json!(["a", 1, true])).expect("array");
        assert_eq!(list.as_slice(), ["a", "1", "true"]);
    }
}
