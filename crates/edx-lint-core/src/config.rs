//! Configuration types for edx-lint.

use crate::types::Severity;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for edx-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use ("recommended", "all" or "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing exit status (default: error).
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Message filtering.
    #[serde(default)]
    pub messages: MessagesConfig,

    /// Per-checker configurations, keyed by checker name.
    #[serde(default)]
    pub checkers: HashMap<String, CheckerConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a checker is enabled.
    #[must_use]
    pub fn is_checker_enabled(&self, checker: &str) -> bool {
        self.checkers
            .get(checker)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a checker.
    #[must_use]
    pub fn checker_severity(&self, checker: &str) -> Option<Severity> {
        self.checkers.get(checker).and_then(|c| c.severity)
    }

    /// Gets the options of a checker.
    #[must_use]
    pub fn checker(&self, checker: &str) -> Option<&CheckerConfig> {
        self.checkers.get(checker)
    }

    /// Checks if a message is enabled. Accepts a symbol or a code.
    #[must_use]
    pub fn is_message_enabled(&self, symbol: &str, code: &str) -> bool {
        !self
            .messages
            .disable
            .iter()
            .any(|d| d == symbol || d == code || d == "all")
    }

    /// Severity at or above which a run fails.
    #[must_use]
    pub fn fail_threshold(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Glob patterns to include (if empty, all *.py files).
    #[serde(default)]
    pub include: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: vec![
                "**/.tox/**".to_string(),
                "**/node_modules/**".to_string(),
                "**/.venv/**".to_string(),
            ],
            include: Vec::new(),
            respect_gitignore: true,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

/// Message filtering configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Symbols or codes to suppress everywhere. `all` disables everything.
    #[serde(default)]
    pub disable: Vec<String>,
}

/// Per-checker configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Whether this checker is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for all messages of this checker.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Checker-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl CheckerConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a string array option. A single string is split on commas.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        match self.options.get(key) {
            Some(toml::Value::Array(arr)) => arr
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            Some(toml::Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
