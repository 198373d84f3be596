//! Store configuration with defaults and environment overrides.
//!
//! # Responsibility
//! - Describe where the database lives and how long calls may take.
//! - Describe optional file logging.
//!
//! # Invariants
//! - `StoreConfig::default()` is always usable without any environment.
//! - Unparsable overrides are rejected, never silently ignored.

use crate::context::ExecContext;
use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "TXSTORE_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "TXSTORE_BUSY_TIMEOUT_MS";
pub const ENV_OP_TIMEOUT_MS: &str = "TXSTORE_OP_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "TXSTORE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TXSTORE_LOG_DIR";

const DEFAULT_DB_PATH: &str = "sqlite.db";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_OP_TIMEOUT_MS: u64 = 10_000;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub message: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid `{}` value `{}`: {}", self.key, self.value, self.message)
    }
}

impl Error for ConfigError {}

/// Runtime settings for opening and using the store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    /// How long SQLite waits on a locked database before failing.
    pub busy_timeout_ms: u64,
    /// Deadline applied to contexts built by `exec_context`.
    pub op_timeout_ms: u64,
    pub log_level: String,
    /// File logging stays disabled while this is `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            op_timeout_ms: DEFAULT_OP_TIMEOUT_MS,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Builds a config from defaults plus `TXSTORE_*` process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from defaults plus values returned by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = non_empty(lookup(ENV_DB_PATH)) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(value) = non_empty(lookup(ENV_BUSY_TIMEOUT_MS)) {
            config.busy_timeout_ms = parse_millis(ENV_BUSY_TIMEOUT_MS, value)?;
        }
        if let Some(value) = non_empty(lookup(ENV_OP_TIMEOUT_MS)) {
            config.op_timeout_ms = parse_millis(ENV_OP_TIMEOUT_MS, value)?;
        }
        if let Some(level) = non_empty(lookup(ENV_LOG_LEVEL)) {
            config.log_level = level;
        }
        if let Some(dir) = non_empty(lookup(ENV_LOG_DIR)) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Context whose deadline is `op_timeout_ms` from now.
    pub fn exec_context(&self) -> ExecContext {
        ExecContext::with_timeout(Duration::from_millis(self.op_timeout_ms))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn parse_millis(key: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|err| ConfigError {
        key,
        value,
        message: err.to_string(),
    })
}
