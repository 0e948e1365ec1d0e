//! Configuration system for pathquill.
//!
//! This module provides the configuration structure for the pathquill command
//! line tool with sensible defaults and support for serialization via serde.
//! Configuration is loaded from a TOML file and merged with command-line
//! arguments; command-line flags always win. The query library itself never
//! reads configuration.
//!
//! # Example
//!
//! ```
//! use pathquill::config::Config;
//!
//! // Use default configuration
//! let config = Config::default();
//! assert!(!config.pretty);
//! assert_eq!(config.indent_size, 2);
//!
//! // Create custom configuration
//! let custom = Config {
//!     pretty: true,
//!     indent_size: 4,
//!     ..Config::default()
//! };
//! assert!(custom.trailing_newline);
//! ```

use anyhow::Context;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the pathquill command line tool.
///
/// # Fields
///
/// * `pretty` - Indent output instead of printing compact JSON (default: false)
/// * `indent_size` - Number of spaces per indentation level (default: 2)
/// * `trailing_newline` - Print a newline after the result (default: true)
/// * `show_paths` - Print normalized paths of matches instead of values (default: false)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Indent output instead of printing compact JSON
    #[serde(default)]
    pub pretty: bool,

    /// Number of spaces per indentation level
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    /// Print a newline after the result
    #[serde(default = "default_trailing_newline")]
    pub trailing_newline: bool,

    /// Print normalized paths instead of values
    #[serde(default)]
    pub show_paths: bool,
}

/// Returns the default indentation size.
fn default_indent_size() -> usize {
    2
}

fn default_trailing_newline() -> bool {
    true
}

impl Default for Config {
    /// Creates a new configuration with default values.
    ///
    /// # Default Values
    ///
    /// * `pretty`: false
    /// * `indent_size`: 2
    /// * `trailing_newline`: true
    /// * `show_paths`: false
    fn default() -> Self {
        Self {
            pretty: false,
            indent_size: default_indent_size(),
            trailing_newline: default_trailing_newline(),
            show_paths: false,
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/pathquill/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("pathquill");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist, can't be
    /// read, or is not valid TOML. Problems other than a missing file are
    /// logged.
    pub fn load() -> Self {
        let config_path = match Self::config_path() {
            Some(path) => path,
            None => return Self::default(),
        };

        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(err) => {
                warn!("{:#}; using default configuration", err);
                Self::default()
            }
        }
    }

    /// Loads configuration from `path`, failing if it can't be read or parsed.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Saves configuration to the default config file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&config_path)
    }

    /// Saves configuration to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
