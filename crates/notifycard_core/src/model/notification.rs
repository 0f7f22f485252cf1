//! Raw notification list model.
//!
//! # Responsibility
//! - Carry the ordered notification strings delivered by the host.
//! - Apply the empty-list placeholder at the input boundary.
//!
//! # Invariants
//! - Insertion order is significant and part of equality.
//! - A list is never mutated after it has been received; callers replace it.

use serde::{Deserialize, Serialize};

/// Text shown when the host delivers no notifications.
pub const EMPTY_PLACEHOLDER: &str = "No notifications available.";

/// Ordered list of raw (unsanitized) notification strings.
///
/// Serialized transparently as a JSON array of strings, which is also the
/// persisted blob format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationList(Vec<String>);

impl NotificationList {
    pub fn new(items: Vec<String>) -> Self {
        Self(items)
    }

    /// Returns the single-entry placeholder list.
    pub fn placeholder() -> Self {
        Self(vec![EMPTY_PLACEHOLDER.to_string()])
    }

    /// Replaces an empty list by the placeholder list.
    pub fn or_placeholder(self) -> Self {
        if self.0.is_empty() {
            Self::placeholder()
        } else {
            self
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for NotificationList {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl<'a> From<&[&'a str]> for NotificationList {
    fn from(value: &[&'a str]) -> Self {
        Self(value.iter().map(|item| (*item).to_string()).collect())
    }
}

impl<'a> IntoIterator for &'a NotificationList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
