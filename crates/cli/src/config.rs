//! Gate configuration
//!
//! Settings are resolved once at startup from three layers, highest first:
//! command-line flags, the TOML config file, built-in defaults.

use anyhow::{Context, Result};
use chrono::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default throttle key
pub const DEFAULT_KEY: &str = "default";

/// Default window between passes
pub const DEFAULT_WINDOW_SECS: i64 = 60;

/// Default log level when neither `RUST_LOG` nor `-v` is given
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "THROTTLEPIPE_CONFIG";

/// Contents of the config file; every field is optional
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub key: Option<String>,
    pub storage_dir: Option<PathBuf>,
    pub window_secs: Option<i64>,
    pub exclusive: Option<bool>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Values given on the command line
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub key: Option<String>,
    pub storage_dir: Option<PathBuf>,
    pub window_minutes: Option<i64>,
    pub window_secs: Option<i64>,
    pub reset: bool,
    pub exclusive: bool,
    pub verbose: u8,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub key: String,
    pub storage_dir: PathBuf,
    pub window: Duration,
    pub reset: bool,
    pub exclusive: bool,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Log to this file instead of stderr
    pub file: Option<PathBuf>,
}

/// Default location of the config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("throttlepipe").join("config.toml"))
}

/// Default storage directory (platform temp dir)
pub fn default_storage_dir() -> PathBuf {
    std::env::temp_dir()
}

/// Load the config file
///
/// An explicitly named file must exist; the default one is optional.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(FileConfig::default()),
        },
    };

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: FileConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    Ok(config)
}

impl Settings {
    /// Merge command-line overrides over the config file and defaults
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self> {
        let key = overrides
            .key
            .or(file.key)
            .unwrap_or_else(|| DEFAULT_KEY.to_string());
        if key.is_empty() {
            anyhow::bail!("Throttle key must not be empty");
        }

        let storage_dir = overrides
            .storage_dir
            .or(file.storage_dir)
            .unwrap_or_else(default_storage_dir);

        let window_secs = match (overrides.window_secs, overrides.window_minutes) {
            (Some(secs), _) => secs,
            (None, Some(minutes)) => minutes
                .checked_mul(60)
                .with_context(|| format!("Window of {} minutes is out of range", minutes))?,
            (None, None) => file.window_secs.unwrap_or(DEFAULT_WINDOW_SECS),
        };
        let window = Duration::try_seconds(window_secs)
            .with_context(|| format!("Window of {} seconds is out of range", window_secs))?;

        let level = match overrides.verbose {
            0 => file
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        };

        Ok(Self {
            key,
            storage_dir,
            window,
            reset: overrides.reset,
            exclusive: overrides.exclusive || file.exclusive.unwrap_or(false),
            log: LogSettings {
                level,
                file: overrides.log_file.or(file.log_file),
            },
        })
    }
}
