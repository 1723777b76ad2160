//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/classpulse/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/classpulse/` (~/.config/classpulse/)
//! - State/Logs: `$XDG_STATE_HOME/classpulse/` (~/.local/state/classpulse/), one
//!   `classpulse.YYYY-MM-DD.log` file per day

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix and suffix of the daily log files.
pub const LOG_FILE_PREFIX: &str = "classpulse";
pub const LOG_FILE_SUFFIX: &str = "log";

/// `classpulse.YYYY-MM-DD.log`, the name the daily appender gives a day's file.
pub fn log_file_name(date: NaiveDate) -> String {
    format!(
        "{}.{}.{}",
        LOG_FILE_PREFIX,
        date.format("%Y-%m-%d"),
        LOG_FILE_SUFFIX
    )
}

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Metrics cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Month-over-month comparison configuration
    #[serde(default)]
    pub comparison: ComparisonConfig,

    /// Leaderboard configuration
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metrics cache configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Seconds a computed bundle stays fresh
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn default_cache_ttl() -> u64 {
    3600
}

/// Month-over-month comparison configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ComparisonConfig {
    /// Minimum sessions each month needs for a meaningful comparison
    #[serde(default = "default_min_sessions")]
    pub min_sessions: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            min_sessions: default_min_sessions(),
        }
    }
}

fn default_min_sessions() -> usize {
    crate::analytics::comparison::DEFAULT_MIN_SESSIONS
}

/// Leaderboard configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    /// Trailing window (days) considered for rankings and cohort averages
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Default number of entries returned
    #[serde(default = "default_ranking_limit")]
    pub limit: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            limit: default_ranking_limit(),
        }
    }
}

fn default_window_days() -> u32 {
    90
}

/// Longest trailing window accepted (about a century).
pub const MAX_WINDOW_DAYS: u32 = 36_500;

fn default_ranking_limit() -> usize {
    crate::analytics::ranking::DEFAULT_LIMIT
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl_secs == 0 {
            return Err(Error::Config(
                "cache.ttl_secs must be greater than 0".to_string(),
            ));
        }
        if self.comparison.min_sessions == 0 {
            return Err(Error::Config(
                "comparison.min_sessions must be at least 1".to_string(),
            ));
        }
        if self.ranking.window_days == 0 {
            return Err(Error::Config(
                "ranking.window_days must be greater than 0".to_string(),
            ));
        }
        if self.ranking.window_days > MAX_WINDOW_DAYS {
            return Err(Error::Config(format!(
                "ranking.window_days must be at most {}",
                MAX_WINDOW_DAYS
            )));
        }
        if self.ranking.limit == 0 {
            return Err(Error::Config(
                "ranking.limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/classpulse/config.toml` (~/.config/classpulse/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("classpulse").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/classpulse/` (~/.local/state/classpulse/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("classpulse")
    }

    /// Returns the log file written on `date` (UTC)
    ///
    /// Logs rotate daily: `$XDG_STATE_HOME/classpulse/classpulse.YYYY-MM-DD.log`
    pub fn log_path(date: NaiveDate) -> PathBuf {
        Self::state_dir().join(log_file_name(date))
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
