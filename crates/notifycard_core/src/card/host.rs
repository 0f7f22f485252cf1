//! Host context snapshot handed to the card.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One host state object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StateObject {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub attributes: Value,
}

impl StateObject {
    pub fn new(state: impl Into<String>, attributes: Value) -> Self {
        Self {
            state: state.into(),
            attributes,
        }
    }
}

/// Host state visible to the card on one update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HostSnapshot {
    #[serde(default)]
    pub states: BTreeMap<String, StateObject>,
    #[serde(default)]
    pub dark_mode: bool,
}

impl HostSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, entity_id: impl Into<String>, state: StateObject) -> Self {
        self.states.insert(entity_id.into(), state);
        self
    }

    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        self.dark_mode = dark_mode;
        self
    }

    pub fn state(&self, entity_id: &str) -> Option<&StateObject> {
        self.states.get(entity_id)
    }
}
