//! Configuration file loading and management
//!
//! This module handles loading and parsing the front-end configuration from
//! `$XDG_CONFIG_HOME/sockguard/config.toml`. If the configuration file doesn't
//! exist, a default configuration is created with documented comments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::view::Layout;

/// Environment variable that overrides `server.base_url`.
pub const API_URL_ENV: &str = "SOCKGUARD_API_URL";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// Backend connection
    #[serde(default)]
    pub server: ServerConfig,
    /// Presentation settings
    #[serde(default)]
    pub ui: UiConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the sockguard backend
    /// Default: "http://localhost:5000"
    pub base_url: String,
    /// Request timeout in seconds
    /// Default: 30
    pub timeout_secs: u64,
}

/// Presentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Socks fetched per page
    /// Default: 10
    pub page_size: usize,
    /// List layout: auto, wide or narrow
    /// Default: auto
    pub layout: Layout,
    /// Terminal width used by the auto layout
    /// Default: 100
    pub width: u16,
    /// Seconds a notification stays visible
    /// Default: 3
    pub notification_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Default: "info"
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            layout: Layout::Auto,
            width: 100,
            notification_secs: 3,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the specified path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default XDG config location
    ///
    /// If the configuration file doesn't exist, creates a default configuration
    /// file with documented comments.
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_file(&config_path)?;
        }

        Self::load(&config_path)
    }

    /// Get the default configuration file path
    ///
    /// Returns `$XDG_CONFIG_HOME/sockguard/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "sockguard")
            .context("Failed to determine project directories")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Create a default configuration file with documented comments
    fn create_default_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

        tracing::info!("Created default configuration file at: {}", path.display());
        Ok(())
    }

    /// Generate the default configuration file content with comments
    fn default_config_content() -> &'static str {
        r#"# sockguard configuration

[server]
# Base URL of the sockguard backend.
# The SOCKGUARD_API_URL environment variable takes precedence.
# Default: "http://localhost:5000"
base_url = "http://localhost:5000"

# Request timeout in seconds
# Default: 30
timeout_secs = 30

[ui]
# Socks fetched per page
# Default: 10
page_size = 10

# List layout: "auto", "wide" or "narrow".
# "auto" uses the wide table when width is at least 100 columns.
# Default: "auto"
layout = "auto"

# Terminal width assumed by the auto layout
# Default: 100
width = 100

# Seconds a notification stays visible
# Default: 3
notification_secs = 3

[logging]
# Log level: trace, debug, info, warn, error
# RUST_LOG overrides this when set.
# Default: "info"
level = "info"
"#
    }

    /// Override the backend URL with `url` when it is set and non-empty.
    pub fn apply_api_url(&mut self, url: Option<&str>) {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            self.server.base_url = url.to_string();
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.server.base_url)
            .with_context(|| format!("Invalid server.base_url: {}", self.server.base_url))?;

        if self.server.timeout_secs == 0 {
            anyhow::bail!("server.timeout_secs must be greater than 0");
        }

        if self.ui.page_size == 0 {
            anyhow::bail!("ui.page_size must be greater than 0");
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid logging.level: {}. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            );
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_secs(self.ui.notification_secs)
    }
}
