//! Configuration
//!
//! Settings come from, in increasing precedence: built-in defaults, the YAML
//! config file, the environment, and finally command-line flags (applied by
//! the caller).

use crate::check::CheckConfig;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

/// Config file looked up in the working directory when none is given
pub const CONFIG_FILE: &str = "slipgraph.yaml";

/// Environment variable overriding the database path
pub const DB_ENV: &str = "SLIPGRAPH_DB";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Unknown log level: '{0}'")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SQLite database the build is committed to
    pub database: Option<PathBuf>,
    /// One of trace, debug, info, warn, error
    pub log_level: String,
    pub checks: CheckConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            log_level: "warn".to_string(),
            checks: CheckConfig::default(),
        }
    }
}

impl Config {
    /// Parse a YAML document; missing keys take their defaults
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read `path`, or `slipgraph.yaml` if present, then apply the
    /// environment.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file is not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE).is_file() => Self::from_file(Path::new(CONFIG_FILE))?,
            None => Self::default(),
        };
        config.apply_env(std::env::var_os(DB_ENV));
        config.log_level()?;
        Ok(config)
    }

    /// Override the database with the value of [`DB_ENV`], if set
    pub fn apply_env(&mut self, database: Option<OsString>) {
        if let Some(database) = database.filter(|value| !value.is_empty()) {
            self.database = Some(PathBuf::from(database));
        }
    }

    /// Database path: `cli` if given, else the configured one, else the
    /// per-user default
    pub fn database_path(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.database.clone())
            .unwrap_or_else(default_db_path)
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}

/// `<data dir>/slipgraph/slipgraph.db`
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("slipgraph").join("slipgraph.db")
}
