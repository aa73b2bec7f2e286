//! Configuration management for tsv-export
//!
//! This module handles loading, parsing, and managing configuration from:
//! - Configuration files (TOML format)
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::export::{
    DEFAULT_COLUMN_SEPARATOR, DEFAULT_NULL_REPRESENTATION, DEFAULT_ROW_SEPARATOR,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Export formatting configuration
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Delimited output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Character between fields
    #[serde(default = "default_column_separator")]
    pub column_separator: char,

    /// Terminator after every line, header included
    #[serde(default = "default_row_separator")]
    pub row_separator: String,

    /// Text written for null fields
    #[serde(default = "default_null_representation")]
    pub null_representation: String,

    /// Write a header line with the field names
    #[serde(default = "default_include_headers")]
    pub include_headers: bool,

    /// Notify progress every N rows (0 disables)
    #[serde(default)]
    pub progress_interval: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_column_separator() -> char {
    DEFAULT_COLUMN_SEPARATOR
}

fn default_row_separator() -> String {
    DEFAULT_ROW_SEPARATOR.to_string()
}

fn default_null_representation() -> String {
    DEFAULT_NULL_REPRESENTATION.to_string()
}

fn default_include_headers() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            column_separator: default_column_separator(),
            row_separator: default_row_separator(),
            null_representation: default_null_representation(),
            include_headers: default_include_headers(),
            progress_interval: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    ///
    /// With no explicit path the default location is tried, and a missing
    /// default file yields the defaults. An explicit path that does not
    /// exist is an error.
    ///
    /// # Arguments
    /// * `path` - Optional path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - `~/.tsv-export/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tsv-export")
            .join("config.toml")
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Save configuration to a file, creating parent directories
    ///
    /// # Arguments
    /// * `path` - Path where to save the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        self.export.validate()
    }
}

impl ExportConfig {
    /// Validate separator settings
    ///
    /// The row separator must be non-empty, and the column separator can be
    /// neither a double quote (it would collide with text quoting) nor part
    /// of the row separator.
    pub fn validate(&self) -> Result<()> {
        if self.row_separator.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "export.row_separator".to_string(),
                value: String::new(),
            }
            .into());
        }

        if self.column_separator == '"' || self.row_separator.contains(self.column_separator) {
            return Err(ConfigError::InvalidValue {
                field: "export.column_separator".to_string(),
                value: self.column_separator.escape_default().to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
