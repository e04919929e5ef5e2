//! Store configuration.
//!
//! Precedence, lowest first: built-in defaults, an optional TOML file with a
//! `[store]` table, the `ORGREG_DATA_DIR` environment variable.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "ORGREG_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Root holding one directory per entity kind.
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    store: StoreConfig,
}

impl StoreConfig {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Parse the `[store]` table of a TOML document.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: origin.display().to_string(),
            source,
        })?;
        Ok(file.store)
    }

    /// Resolve configuration from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_toml_str(&text, path)?
            }
            None => Self::default(),
        };
        config.apply_env(std::env::var_os(DATA_DIR_ENV));
        Ok(config)
    }

    fn apply_env(&mut self, data_dir: Option<std::ffi::OsString>) {
        if let Some(dir) = data_dir.filter(|dir| !dir.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
    }
}
