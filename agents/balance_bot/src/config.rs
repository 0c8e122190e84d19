use bankbot_core::BoxError;
use bankbot_plaid::{PlaidConfig, Transport};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Server {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5055
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Conf {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub plaid: PlaidConfig,
}

/// Values given on the command line or in the environment, they win over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub plaid_client_id: Option<String>,
    pub plaid_secret: Option<String>,
    pub plaid_transport: Option<Transport>,
}

impl Conf {
    pub fn from_file(file_name: &str) -> Result<Self, BoxError> {
        let builder = Config::builder().add_source(File::new(file_name, FileFormat::Toml));
        let cfg = builder.build()?.try_deserialize::<Conf>()?;
        Ok(cfg)
    }

    pub fn from_toml(content: &str) -> Result<Self, BoxError> {
        let cfg: Self = toml::from_str(content)?;
        Ok(cfg)
    }

    pub fn apply(mut self, overrides: Overrides) -> Result<Self, BoxError> {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(client_id) = overrides.plaid_client_id.filter(|v| !v.is_empty()) {
            self.plaid.client_id = client_id;
        }
        if let Some(secret) = overrides.plaid_secret.filter(|v| !v.is_empty()) {
            self.plaid.secret = secret;
        }
        if let Some(transport) = overrides.plaid_transport {
            self.plaid.transport = transport;
        }
        self.plaid.validate()?;
        Ok(self)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
