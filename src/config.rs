//! Configuration for the data-access layer.
//!
//! [`DbalConfig::load`] reads the `[dbal]` section of `config/config.toml`
//! (optional) and environment variables such as `DBAL__DBAL__PAGE_SIZE`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

const CONFIG_FILE: &str = "config/config.toml";
const SECTION: &str = "dbal";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DbalConfig {
    /// Prefix of the metadata cache keys
    pub cache_prefix: String,
    /// Timezone merged into every query context that has none
    pub timezone: String,
    /// Default paginator page size
    pub page_size: usize,
}

impl Default for DbalConfig {
    fn default() -> Self {
        Self {
            cache_prefix: "dbal".to_string(),
            timezone: "UTC".to_string(),
            page_size: 100,
        }
    }
}

impl DbalConfig {
    /// Load the configuration from `config/config.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(env_source());

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if Path::new(CONFIG_FILE).exists() {
                    log::warn!("Failed to load {}, falling back to env: {}", CONFIG_FILE, err);
                }
                Config::builder().add_source(env_source()).build().map_err(|env_err| {
                    ConfigError::Message(format!(
                        "Failed to load configuration from file and env: {}, then env-only error: {}",
                        err, env_err
                    ))
                })?
            }
        };
        Self::from_settings(&settings)
    }

    /// Load the configuration from an explicit file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()).required(true))
            .build()?;
        Self::from_settings(&settings)
    }

    fn from_settings(settings: &Config) -> Result<Self, ConfigError> {
        match settings.get::<DbalConfig>(SECTION) {
            Ok(config) => config.validated(),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(ConfigError::Message(format!("Invalid [{}] configuration: {}", SECTION, e))),
        }
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Message("dbal.page_size must be greater than zero".to_string()));
        }
        if crate::context::parse_timezone(&self.timezone).is_none() {
            return Err(ConfigError::Message(format!("dbal.timezone '{}' is not supported", self.timezone)));
        }
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("DBAL").separator("__")
}
