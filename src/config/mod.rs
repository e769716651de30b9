//! Configuration management.
//!
//! Configuration is read from `config.toml` in the platform config directory
//! and then overridden by environment variables:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `PROMPTDOCK_CONFIG_PATH` | Location of the config file |
//! | `PROMPTDOCK_DATA_DIR` | `data_dir` |
//! | `PROMPTDOCK_LOG` | `logging.level` |
//! | `PROMPTDOCK_LOG_FORMAT` | `logging.format` |

use crate::observability::LogFormat;
use crate::storage::FilesystemGateway;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "PROMPTDOCK_CONFIG_PATH";
/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PROMPTDOCK_DATA_DIR";
/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "PROMPTDOCK_LOG";
/// Environment variable overriding the log format.
pub const LOG_FORMAT_ENV: &str = "PROMPTDOCK_LOG_FORMAT";

/// Main configuration for promptdock.
#[derive(Debug, Clone)]
pub struct PromptdockConfig {
    /// Directory holding the collection files.
    pub data_dir: PathBuf,
    /// Quick picker timing and empty-query behavior.
    pub quick_picker: QuickPickerConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// What the quick picker shows before anything is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyQueryMode {
    /// An empty list.
    #[default]
    None,
    /// The most used prompts.
    MostUsed,
}

impl EmptyQueryMode {
    /// Parses a mode string; unknown values fall back to [`Self::None`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "most-used" | "most_used" | "mostused" => Self::MostUsed,
            _ => Self::None,
        }
    }
}

/// Quick picker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickPickerConfig {
    /// Delay between the last keystroke and re-ranking, in milliseconds.
    pub debounce_ms: u64,
    /// Delay between a successful copy and closing, in milliseconds.
    pub close_delay_ms: u64,
    /// Behavior for an empty query.
    pub empty_query: EmptyQueryMode,
    /// Number of prompts listed in [`EmptyQueryMode::MostUsed`].
    pub most_used_limit: usize,
}

impl Default for QuickPickerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            close_delay_ms: 300,
            empty_query: EmptyQueryMode::None,
            most_used_limit: 10,
        }
    }
}

impl QuickPickerConfig {
    /// Debounce delay.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Close delay after a copy.
    #[must_use]
    pub const fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }
}

/// Logging settings from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `promptdock=debug`.
    pub level: Option<String>,
    /// Output format.
    pub format: LogFormat,
    /// Optional log file; stderr when absent.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Quick picker section.
    pub quick_picker: Option<ConfigFileQuickPicker>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Quick picker section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileQuickPicker {
    /// Debounce delay.
    pub debounce_ms: Option<u64>,
    /// Close delay.
    pub close_delay_ms: Option<u64>,
    /// Empty query mode.
    pub empty_query: Option<String>,
    /// Most used limit.
    pub most_used_limit: Option<usize>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// Filter directive.
    pub level: Option<String>,
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

impl Default for PromptdockConfig {
    fn default() -> Self {
        Self {
            data_dir: FilesystemGateway::default_path()
                .unwrap_or_else(|| PathBuf::from(".promptdock")),
            quick_picker: QuickPickerConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl PromptdockConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::operation("read_config_file", e))?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for [`ConfigFile`].
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| crate::Error::operation("parse_config_file", e))?;
        Ok(Self::from_config_file(file))
    }

    /// Returns the default config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "promptdock")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads configuration from the default location.
    ///
    /// Returns default configuration if no config file is found or it cannot
    /// be parsed.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from_file(&path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
            Self::default()
        })
    }

    /// Applies overrides from a variable lookup.
    ///
    /// The binary passes `std::env::var`; tests pass a map.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup(LOG_ENV).filter(|v| !v.is_empty()) {
            self.logging.level = Some(level);
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            self.logging.format = LogFormat::parse(&format);
        }
        self
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Converts a `ConfigFile` to `PromptdockConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Some(picker) = file.quick_picker {
            if let Some(debounce_ms) = picker.debounce_ms {
                config.quick_picker.debounce_ms = debounce_ms;
            }
            if let Some(close_delay_ms) = picker.close_delay_ms {
                config.quick_picker.close_delay_ms = close_delay_ms;
            }
            if let Some(mode) = picker.empty_query {
                config.quick_picker.empty_query = EmptyQueryMode::parse(&mode);
            }
            if let Some(limit) = picker.most_used_limit {
                config.quick_picker.most_used_limit = limit;
            }
        }

        if let Some(logging) = file.logging {
            config.logging.level = logging.level;
            if let Some(format) = logging.format {
                config.logging.format = LogFormat::parse(&format);
            }
            config.logging.file = logging.file.map(PathBuf::from);
        }

        config
    }
}
