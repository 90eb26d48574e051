use aps_auth::ProviderClient;
use aps_types::ApsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment variable overrides, e.g. `APS_PROVIDER__CLIENT_SECRET`.
pub const ENV_PREFIX: &str = "APS_";

fn default_base_url() -> String {
    aps_auth::provider::DEFAULT_BASE_URL.to_string()
}
fn default_callback_url() -> String {
    "http://localhost:9094/callback".to_string()
}
fn default_callback_port() -> u16 {
    9094
}
fn default_level() -> String {
    "info".to_string()
}

/// Credentials and endpoint settings for the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL serving `/authorize`, `/token` and `/userinfo`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub client_key: String,
    #[serde(default)]
    pub client_secret: String,
    /// Redirect URL registered with the provider.
    #[serde(default = "default_callback_url")]
    pub callback_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Extra `prompt` hint sent on the authorization URL (e.g. `consent`).
    #[serde(default)]
    pub prompt: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_key: String::new(),
            client_secret: String::new(),
            callback_url: default_callback_url(),
            scopes: Vec::new(),
            prompt: None,
        }
    }
}

impl ProviderConfig {
    /// Check the settings a login cannot proceed without.
    ///
    /// # Errors
    ///
    /// Returns [`ApsError::Config`] naming the first missing setting.
    pub fn validate(&self) -> aps_types::Result<()> {
        for (name, value) in [
            ("provider.base_url", &self.base_url),
            ("provider.client_key", &self.client_key),
            ("provider.callback_url", &self.callback_url),
        ] {
            if value.trim().is_empty() {
                return Err(ApsError::Config(format!("{name} is not configured")));
            }
        }
        Ok(())
    }

    /// Construct a [`ProviderClient`] from these settings.
    #[must_use]
    pub fn build_client(&self) -> ProviderClient {
        let mut client = ProviderClient::new(
            &self.client_key,
            &self.client_secret,
            &self.callback_url,
            &self.scopes,
        )
        .with_base_url(&self.base_url);
        if let Some(prompt) = &self.prompt {
            client.set_prompt(prompt);
        }
        client
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Local port the redirect listener binds (defaults to 9094).
    #[serde(default = "default_callback_port")]
    pub callback_port: u16,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Loads configuration from defaults, an optional YAML file and the
    /// environment, in increasing order of precedence.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be parsed or a value
    /// has the wrong type.
    #[allow(clippy::result_large_err)]
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            callback_port: default_callback_port(),
            log: LogConfig::default(),
        }
    }
}
