use bankbot_core::BoxError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc, time::Duration};

use crate::{PlaidApi, raw, sdk};

/// Plaid API environments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Development,
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://sandbox.plaid.com",
            Environment::Development => "https://development.plaid.com",
            Environment::Production => "https://production.plaid.com",
        }
    }
}

/// How requests reach Plaid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Typed client with header authentication and Plaid error decoding
    Sdk,
    /// Plain JSON POSTs with credentials in the body; any non-200 is a failure
    #[default]
    Http,
}

impl FromStr for Transport {
    type Err = BoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sdk" => Ok(Transport::Sdk),
            "http" => Ok(Transport::Http),
            other => Err(format!("unknown plaid transport {other:?}, expected sdk or http").into()),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Sdk => f.write_str("sdk"),
            Transport::Http => f.write_str("http"),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Plaid configuration, loaded once at startup and injected into the clients.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaidConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub transport: Transport,
    /// Overrides the environment base URL, e.g. to reach a local mock.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Client side request timeout. No timeout when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Stores the exchanged access token into the `access_token` slot.
    #[serde(default = "default_true")]
    pub persist_access_token: bool,
}

impl Default for PlaidConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            secret: String::new(),
            environment: Environment::default(),
            transport: Transport::default(),
            endpoint: None,
            timeout_secs: None,
            persist_access_token: true,
        }
    }
}

// Credentials are never written to logs.
impl fmt::Debug for PlaidConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaidConfig")
            .field("client_id", &self.client_id)
            .field("secret", &"***")
            .field("environment", &self.environment)
            .field("transport", &self.transport)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("persist_access_token", &self.persist_access_token)
            .finish()
    }
}

impl PlaidConfig {
    pub fn new(client_id: String, secret: String) -> Self {
        Self {
            client_id,
            secret,
            ..Default::default()
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, BoxError> {
        let cfg: Self = toml::from_str(content)?;
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String, BoxError> {
        let content = toml::to_string(&self)?;
        Ok(content)
    }

    pub fn validate(&self) -> Result<(), BoxError> {
        if self.client_id.is_empty() {
            return Err("plaid client_id is required".into());
        }
        if self.secret.is_empty() {
            return Err("plaid secret is required".into());
        }
        if let Some(endpoint) = &self.endpoint {
            url::Url::parse(endpoint)?;
        }
        Ok(())
    }

    /// The base URL requests are sent to.
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) if !endpoint.is_empty() => endpoint.trim_end_matches('/').to_string(),
            _ => self.environment.base_url().to_string(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Builds the reqwest client shared by all requests of a transport.
    pub fn http_client(&self) -> Result<reqwest::Client, BoxError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(crate::APP_USER_AGENT);
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }

    /// Builds the configured transport once, to be shared by all action runs.
    pub fn build_api(&self) -> Result<Arc<dyn PlaidApi>, BoxError> {
        self.validate()?;
        let http = self.http_client()?;
        let api: Arc<dyn PlaidApi> = match self.transport {
            Transport::Sdk => Arc::new(sdk::Client::new(self).with_client(http)),
            Transport::Http => Arc::new(raw::Client::new(self).with_client(http)),
        };
        Ok(api)
    }
}
