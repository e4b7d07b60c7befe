//! Process configuration read from the environment.
//!
//! # Responsibility
//! - Resolve log level, log directory and RNG seed once at startup.
//!
//! # Invariants
//! - Unset variables fall back to defaults; malformed ones are errors.
//! - A configured log directory is always absolute.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_LOG_LEVEL: &str = "PROFESSOR_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PROFESSOR_LOG_DIR";
pub const ENV_SEED: &str = "PROFESSOR_SEED";

/// Configuration parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    InvalidLogDir(String),
    InvalidSeed(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidLogDir(value) => {
                write!(f, "log dir must be a non-empty absolute path, got `{value}`")
            }
            Self::InvalidSeed(value) => write!(f, "seed must be an unsigned integer, got `{value}`"),
        }
    }
}

impl Error for ConfigError {}

/// Core runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub log_level: &'static str,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// Fixed seed for build and shuffle randomness.
    pub seed: Option<u64>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: None,
            seed: None,
        }
    }
}

impl CoreConfig {
    /// Reads `PROFESSOR_LOG_LEVEL`, `PROFESSOR_LOG_DIR` and `PROFESSOR_SEED`.
    ///
    /// # Errors
    /// - Returns an error when a set variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`CoreConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = non_blank(lookup(ENV_LOG_LEVEL)) {
            config.log_level = normalize_level(&level)?;
        }
        if let Some(dir) = non_blank(lookup(ENV_LOG_DIR)) {
            config.log_dir = Some(normalize_log_dir(&dir)?);
        }
        if let Some(seed) = non_blank(lookup(ENV_SEED)) {
            config.seed = Some(
                seed.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidSeed(seed.clone()))?,
            );
        }

        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Returns the default log level for current build mode.
///
/// - `debug` builds -> `debug`
/// - `release` builds -> `info`
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

pub(crate) fn normalize_level(level: &str) -> Result<&'static str, ConfigError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(ConfigError::InvalidLogLevel(other.to_string())),
    }
}

pub(crate) fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, ConfigError> {
    let trimmed = log_dir.trim();
    let path = Path::new(trimmed);
    if trimmed.is_empty() || !path.is_absolute() {
        return Err(ConfigError::InvalidLogDir(trimmed.to_string()));
    }
    Ok(path.to_path_buf())
}
