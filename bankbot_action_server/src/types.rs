use bankbot_core::{Domain, Tracker};
use serde::{Deserialize, Serialize};

/// Body of `POST /webhook` sent by the conversational runtime.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ActionCall {
    pub next_action: String,
    #[serde(default)]
    pub sender_id: Option<String>,
    pub tracker: Tracker,
    #[serde(default)]
    pub domain: Domain,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ActionErrorResponse {
    pub error: String,
    pub action_name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ActionInfo {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub app: String,
    pub version: String,
    pub start_time_ms: u64,
}
