//! Configuration module for altimon
//!
//! Application configuration lives in a single TOML file in the
//! platform-appropriate data directory:
//!
//! - **Linux**: `~/.local/share/altimon/config.toml`
//! - **macOS**: `~/Library/Application Support/altimon/config.toml`
//! - **Windows**: `%APPDATA%\altimon\config.toml`
//!
//! Missing file or unreadable contents fall back to defaults; every field
//! has a serde default so partial files stay loadable across versions.

use crate::error::{AltimonError, Result};
use crate::types::{DEFAULT_BAUD_RATE, DEFAULT_LOG_FILE, DEFAULT_REFRESH_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "altimon";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default bounded read timeout for the serial source in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 250;

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        AltimonError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            AltimonError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the config file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// Serial channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Explicit port name; when set and present it skips operator selection
    #[serde(default)]
    pub port: Option<String>,

    /// Baud rate for the altitude feed
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Bounded read timeout in milliseconds (cancellation poll interval)
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

/// Refresh cycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Refresh tick period in milliseconds
    #[serde(default = "default_refresh_interval_ms")]
    pub interval_ms: u64,
}

fn default_refresh_interval_ms() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

/// Persistent log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// CSV log file path (relative paths resolve against the working dir)
    #[serde(default = "default_log_path")]
    pub path: PathBuf,
}

fn default_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
        }
    }
}

/// UI preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Dark mode visuals
    #[serde(default = "default_dark_mode")]
    pub dark_mode: bool,
}

fn default_dark_mode() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { dark_mode: true }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Serial channel settings
    #[serde(default)]
    pub serial: SerialConfig,

    /// Refresh cycle settings
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Persistent log settings
    #[serde(default)]
    pub log: LogConfig,

    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let path = config_path()
            .ok_or_else(|| AltimonError::Config("Could not determine config path".to_string()))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| AltimonError::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| AltimonError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load config, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(&dir.join(CONFIG_FILE))
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AltimonError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| AltimonError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Refresh tick period as a duration
    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.refresh.interval_ms)
    }

    /// Serial read timeout as a duration
    pub fn read_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.serial.read_timeout_ms)
    }
}
