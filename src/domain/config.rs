use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

/// Configuration for the external services.
///
/// Loaded from `config.toml` inside the data directory. Every field has a
/// default, so a file holding only `_version = "1"` is a valid configuration.
/// A file without the version tag is rejected by [`Config::load`]; callers that
/// can do without one fall back to [`Config::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The language model used to parse ingredient lists and describe
    /// ingredients.
    model: String,

    /// The environment variable holding the language model API key.
    api_key_env: String,

    /// Base URL of the product database used for barcode lookups.
    product_database_url: String,

    /// Timeout applied to each request to an external service, in seconds.
    request_timeout_secs: u64,

    /// Never call the language model.
    ///
    /// Ingredient lists are split on commas instead, and descriptions are
    /// reported as unavailable.
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            product_database_url: default_product_database_url(),
            request_timeout_secs: default_request_timeout_secs(),
            offline: false,
        }
    }
}

/// Errors that can occur when reading or writing the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML, or does not match the expected shape.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The language model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The environment variable holding the API key.
    #[must_use]
    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    /// Reads the API key from the configured environment variable.
    ///
    /// Returns `None` if the variable is unset or blank.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Base URL of the product database, without a trailing slash.
    #[must_use]
    pub fn product_database_url(&self) -> &str {
        self.product_database_url.trim_end_matches('/')
    }

    /// Timeout for a single request to an external service.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_product_database_url() -> String {
    "https://world.openfoodfacts.org".to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_model")]
        model: String,

        #[serde(default = "default_api_key_env")]
        api_key_env: String,

        #[serde(default = "default_product_database_url")]
        product_database_url: String,

        #[serde(default = "default_request_timeout_secs")]
        request_timeout_secs: u64,

        #[serde(default)]
        offline: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                model,
                api_key_env,
                product_database_url,
                request_timeout_secs,
                offline,
            } => Self {
                model,
                api_key_env,
                product_database_url,
                request_timeout_secs,
                offline,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            model: config.model,
            api_key_env: config.api_key_env,
            product_database_url: config.product_database_url,
            request_timeout_secs: config.request_timeout_secs,
            offline: config.offline,
        }
    }
}
