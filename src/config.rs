use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Deserialize;
use tracing::debug;

/// Connection settings for the backing database.
#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

/// One named configuration document, parsed from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db: DbConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    /// The file does not exist.
    Missing(PathBuf),
    /// The file exists but could not be read.
    Io(io::Error),
    /// The file is not valid configuration JSON.
    Invalid(serde_json::Error),
    /// The cache lock was poisoned by a panicking loader.
    LockPoisoned,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(path) => {
                write!(f, "config file not found: {}", path.display())
            }
            ConfigError::Io(err) => write!(f, "failed to read config: {}", err),
            ConfigError::Invalid(err) => write!(f, "invalid config: {}", err),
            ConfigError::LockPoisoned => write!(f, "config cache lock poisoned"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedConfig {
    source: PathBuf,
    config: Config,
}

/// Loads named configuration files, caching each parse.
///
/// A cached entry is reused only when the same name is requested from the
/// same path; asking for a name from a new path, or passing `force_reload`,
/// goes back to the file.
#[derive(Debug, Default)]
pub struct ConfigCache {
    entries: Mutex<HashMap<String, CachedConfig>>,
}

impl ConfigCache {
    pub fn new() -> Self {
        ConfigCache::default()
    }

    /// Load the configuration called `name` from `path`.
    pub fn load(
        &self,
        name: &str,
        path: &Path,
        force_reload: bool,
    ) -> Result<Config, ConfigError> {
        let mut entries = self.entries.lock().map_err(|_| ConfigError::LockPoisoned)?;

        if !force_reload {
            if let Some(cached) = entries.get(name) {
                if cached.source == path {
                    debug!(name, "config cache hit");
                    return Ok(cached.config.clone());
                }
            }
        }

        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Config = serde_json::from_str(&raw).map_err(ConfigError::Invalid)?;

        debug!(name, path = %path.display(), "config loaded");
        entries.insert(
            name.to_string(),
            CachedConfig {
                source: path.to_path_buf(),
                config: config.clone(),
            },
        );
        Ok(config)
    }
}
