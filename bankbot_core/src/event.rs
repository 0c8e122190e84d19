use serde::{Deserialize, Serialize};
use serde_json::Value;

/// State-mutation instructions returned by an action and applied by the host runtime.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "event")]
pub enum Event {
    /// Sets the slot `name` to `value` for later turns.
    #[serde(rename = "slot")]
    SlotSet {
        name: String,
        value: Value,
        #[serde(default)]
        timestamp: Option<f64>,
    },
}

impl Event {
    pub fn slot_set(name: &str, value: impl Into<Value>) -> Self {
        Event::SlotSet {
            name: name.to_string(),
            value: value.into(),
            timestamp: None,
        }
    }
}
