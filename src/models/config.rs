//! Configuration model loaded from external sources.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

fn default_timeout_secs() -> u64 {
    15
}

fn default_poll_interval_secs() -> u64 {
    10
}

#[derive(Clone, Debug, Deserialize)]
/// Connection settings for the external workflow engine.
pub struct WorkflowConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Interval used by the execution sync worker and the hub page poller.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    pub secret: String,
    pub auth_service_url: String,
    /// Emails that receive the admin role when their profile is first created.
    #[serde(default)]
    pub admin_emails: Vec<String>,
    pub workflow: WorkflowConfig,
}

impl ServerConfig {
    /// Loads `config/default.yaml`, the optional `config/{APP_ENV}.yaml`
    /// profile and `APP_`-prefixed environment variables, in that order.
    ///
    /// Nested keys use a double underscore, e.g. `APP_WORKFLOW__API_KEY`.
    pub fn load() -> Result<Self, ConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());

        Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("admin_emails")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
