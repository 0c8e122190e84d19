use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message sent back to the user through the host runtime.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BotMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Value>,

    /// Channel specific payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Value>,

    /// Name of a response template defined in the domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl From<&str> for BotMessage {
    fn from(text: &str) -> Self {
        BotMessage {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }
}

impl From<String> for BotMessage {
    fn from(text: String) -> Self {
        BotMessage {
            text: Some(text),
            ..Default::default()
        }
    }
}

/// Collects the messages an action wants to send, in order.
#[derive(Debug, Clone, Default)]
pub struct CollectingDispatcher {
    messages: Vec<BotMessage>,
}

impl CollectingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends a plain text message to the user.
    pub fn utter_message(&mut self, text: impl Into<String>) {
        self.messages.push(BotMessage::from(text.into()));
    }

    pub fn utter(&mut self, message: BotMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[BotMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<BotMessage> {
        self.messages
    }
}
