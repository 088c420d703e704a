//! Runtime configuration at ~/.config/calgrid/config.toml
//!
//! The only setting read by the core is `environment`, which selects the API
//! host. `CALGRID_ENVIRONMENT` overrides the file.

use std::fmt;
use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::Deserialize;
use tracing::debug;

use crate::constants::{DEVELOPMENT_API_HOST, ENV_PREFIX, PRODUCTION_API_HOST};
use crate::error::{CalgridError, CalgridResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        if value.trim() == "development" {
            Environment::Development
        } else {
            Environment::Production
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,
}

impl AppConfig {
    pub fn config_path() -> CalgridResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalgridError::Config("Could not determine config directory".into()))?
            .join("calgrid");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> CalgridResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from a specific file, layered under the environment override.
    pub fn load_from(path: &Path) -> CalgridResult<Self> {
        let config: AppConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| CalgridError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalgridError::Config(e.to_string()))?;

        debug!(path = %path.display(), environment = %config.environment, "loaded config");
        Ok(config)
    }

    pub fn api_host(&self) -> &'static str {
        match self.environment {
            Environment::Development => DEVELOPMENT_API_HOST,
            Environment::Production => PRODUCTION_API_HOST,
        }
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalgridResult<()> {
        let contents = "\
# calgrid configuration

# \"development\" talks to a local API server, anything else to production:
# environment = \"development\"
";

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalgridError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalgridError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
