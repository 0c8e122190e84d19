//! Conversation snapshot handed to actions by the host runtime.
//!
//! The host runtime owns dialogue and session state. For each action call it
//! serializes the current conversation into a [`Tracker`]; actions only read
//! from it and request state changes by returning [`Event`](crate::Event)s.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The domain definition of the host runtime. Passed through untouched.
pub type Domain = Value;

/// Read-only snapshot of a conversation at the time an action is invoked.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Tracker {
    /// The conversation (user) id
    pub sender_id: String,

    /// Slot values keyed by slot name. Unset slots are usually sent as `null`.
    #[serde(default)]
    pub slots: BTreeMap<String, Value>,

    /// The latest parsed user message, e.g. `{"text": "...", "intent": {...}}`
    #[serde(default)]
    pub latest_message: Value,

    /// The raw conversation events
    #[serde(default)]
    pub events: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_action_name: Option<String>,
}

impl Tracker {
    pub fn new(sender_id: String) -> Self {
        Self {
            sender_id,
            ..Default::default()
        }
    }

    /// Sets a slot value, mostly useful for constructing snapshots in tests.
    pub fn with_slot(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.slots.insert(name.to_string(), value.into());
        self
    }

    /// Gets a slot value. A slot explicitly set to `null` is treated as absent.
    pub fn get_slot(&self, name: &str) -> Option<&Value> {
        match self.slots.get(name) {
            Some(Value::Null) | None => None,
            Some(v) => Some(v),
        }
    }

    /// Gets a non-empty string slot value.
    pub fn get_str_slot(&self, name: &str) -> Option<&str> {
        self.get_slot(name)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// The text of the latest user message, if any.
    pub fn latest_text(&self) -> Option<&str> {
        self.latest_message.get("text").and_then(|v| v.as_str())
    }
}
