//! Tracker configuration schema and loading.
//!
//! ```toml
//! data_file = "uvv-data.json"
//! lookback_hours = 24
//!
//! [[users]]
//! name = "Felix"
//! password = "..."
//! ```
//!
//! `data_file` is resolved against the directory of the config file when it
//! is relative and the config was loaded with `from_file`.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use uvv_contracts::error::{UvvError, UvvResult};

pub const DEFAULT_DATA_FILE: &str = "uvv-data.json";
pub const DEFAULT_LOOKBACK_HOURS: i64 = 24;

/// One entry in the fixed credential table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub name: String,
    pub password: String,
}

/// Everything the tracker needs before a session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// The fixed set of users allowed to sign in.
    #[serde(default)]
    pub users: Vec<UserEntry>,

    /// JSON file backing the document store.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Window of the "recent changes" notice, in hours.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: i64,
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_lookback_hours() -> i64 {
    DEFAULT_LOOKBACK_HOURS
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            data_file: default_data_file(),
            lookback_hours: DEFAULT_LOOKBACK_HOURS,
        }
    }
}

impl TrackerConfig {
    /// Parse `s` as TOML and validate it.
    ///
    /// Returns `UvvError::ConfigError` if the TOML is malformed, does not
    /// match the schema, or fails validation.
    pub fn from_toml_str(s: &str) -> UvvResult<Self> {
        let config: TrackerConfig = toml::from_str(s).map_err(|e| UvvError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse the config file at `path`.
    pub fn from_file(path: &Path) -> UvvResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| UvvError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        let mut config = Self::from_toml_str(&contents)?;

        if config.data_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.data_file = dir.join(&config.data_file);
            }
        }

        debug!(
            path = %path.display(),
            users = config.users.len(),
            data_file = %config.data_file.display(),
            "config loaded"
        );
        Ok(config)
    }

    /// The recent-changes window as a `Duration`.
    ///
    /// `from_toml_str` rejects values that do not fit, so a loaded config
    /// always yields `Ok`.
    pub fn lookback(&self) -> UvvResult<Duration> {
        Duration::try_hours(self.lookback_hours).ok_or_else(|| UvvError::ConfigError {
            reason: format!("lookback_hours {} is out of range", self.lookback_hours),
        })
    }

    /// Check `user` and `password` against the credential table.
    ///
    /// User names match exactly. Unknown users and wrong passwords produce
    /// the same `UvvError::InvalidCredentials`.
    pub fn authenticate(&self, user: &str, password: &str) -> UvvResult<()> {
        let known = self
            .users
            .iter()
            .any(|entry| entry.name == user && entry.password == password);
        if known {
            Ok(())
        } else {
            warn!(user = %user, "sign-in rejected");
            Err(UvvError::InvalidCredentials {
                user: user.to_string(),
            })
        }
    }

    fn validate(&self) -> UvvResult<()> {
        if self.lookback_hours <= 0 {
            return Err(UvvError::ConfigError {
                reason: format!("lookback_hours must be positive, got {}", self.lookback_hours),
            });
        }
        self.lookback()?;

        for (i, entry) in self.users.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(UvvError::ConfigError {
                    reason: format!("user #{} has an empty name", i + 1),
                });
            }
            if self.users[..i].iter().any(|prior| prior.name == entry.name) {
                return Err(UvvError::ConfigError {
                    reason: format!("user '{}' is listed more than once", entry.name),
                });
            }
        }
        Ok(())
    }
}
