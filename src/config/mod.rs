//! Configuration module for msgroute
//!
//! This module handles:
//! - Compiler configuration (directive style, resolver limits, diagnostics)
//! - Graph documents describing the graph to compile (see [`document`])
//!
//! # Config Location
//!
//! When no path is given the configuration is read from the
//! platform-appropriate config directory:
//! - **Linux**: `~/.config/msgroute/config.toml`
//! - **macOS**: `~/Library/Application Support/msgroute/config.toml`
//! - **Windows**: `%APPDATA%\msgroute\config.toml`
//!
//! A missing file means defaults. Every field is optional.
//!
//! # Example
//!
//! ```toml
//! [style]
//! plain_symbol = "->"
//! channel_symbol = "=>"
//!
//! [resolver]
//! max_path_len = 64
//! report_zero_receivers = false
//! ```

pub mod document;

pub use document::*;

use crate::error::{MsgRouteError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for the config directory
pub const APP_ID: &str = "msgroute";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default bound on the number of routes a single walk may traverse
pub const DEFAULT_MAX_PATH_LEN: usize = 256;

// ==================== Config Directory ====================

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the default config file
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Directive Style ====================

/// Symbols used when rendering routing directives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectiveStyle {
    /// Separates a plain output from its targets
    pub plain_symbol: String,

    /// Separates a duplex (channel) output from its targets
    pub channel_symbol: String,

    /// Written in place of the target list when there is no receiver
    pub empty_marker: String,

    /// Separates a filtered-bus input from the filter name
    pub filter_symbol: String,

    /// Indentation of directive lines under their block header
    pub indent: usize,
}

impl Default for DirectiveStyle {
    fn default() -> Self {
        Self {
            plain_symbol: "->".to_string(),
            channel_symbol: "=>".to_string(),
            empty_marker: "-".to_string(),
            filter_symbol: ">>".to_string(),
            indent: 2,
        }
    }
}

// ==================== Resolver Settings ====================

/// Limits and diagnostic switches for the topology resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Maximum number of routes on one walk path
    pub max_path_len: usize,

    /// Report outputs that reach no receiver while writing directives
    pub report_zero_receivers: bool,

    /// Report wired multi routes that match none of the variants
    pub report_unmatched_variants: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_path_len: DEFAULT_MAX_PATH_LEN,
            report_zero_receivers: true,
            report_unmatched_variants: true,
        }
    }
}

// ==================== Compiler Config ====================

/// Complete compiler configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Directive rendering
    pub style: DirectiveStyle,

    /// Resolver limits
    pub resolver: ResolverSettings,
}

impl CompilerConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MsgRouteError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MsgRouteError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the configuration as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| MsgRouteError::Config(format!("Failed to serialize config: {}", e)))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MsgRouteError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }
        std::fs::write(path, content)
            .map_err(|e| MsgRouteError::Config(format!("Failed to write config: {}", e)))
    }
}
