//! Configuration file and environment overrides
//!
//! ```json
//! {
//!   "data_dir": "./rosterdb-data",
//!   "http": { "host": "0.0.0.0", "port": 5000, "cors_origins": [] },
//!   "log_level": "info",
//!   "log_format": "text"
//! }
//! ```
//!
//! Every field is optional. A missing file yields the defaults. `PORT`,
//! `ROSTERDB_DATA_DIR` and `ROSTERDB_LOG_FORMAT` are applied after the file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::http_server::HttpServerConfig;
use crate::observability::{LogFormat, LOG_LEVELS};

pub const ENV_PORT: &str = "PORT";
pub const ENV_DATA_DIR: &str = "ROSTERDB_DATA_DIR";
pub const ENV_LOG_FORMAT: &str = "ROSTERDB_LOG_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_data_dir() -> String {
    "./rosterdb-data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            http: HttpServerConfig::default(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Loads `path` (or defaults when it does not exist), applies the
    /// process environment and validates the result.
    pub fn load(path: &Path) -> CliResult<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn load_file(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    /// Applies environment overrides read through `lookup`.
    pub(crate) fn apply_overrides<F>(&mut self, lookup: F) -> CliResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_PORT) {
            self.http.port = port.trim().parse().map_err(|_| {
                CliError::config_error(format!("Invalid {} value: '{}'", ENV_PORT, port))
            })?;
        }

        if let Some(data_dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = data_dir;
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log_format = format.parse().map_err(CliError::config_error)?;
        }

        Ok(())
    }

    pub(crate) fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.http.host.trim().is_empty() {
            return Err(CliError::config_error("http.host must not be empty"));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of {}.",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// Writes the config as pretty JSON.
    pub fn save(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json + "\n")?;
        Ok(())
    }
}
