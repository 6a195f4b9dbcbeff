//! Harness settings and configuration management.
//!
//! This module provides the configuration surface for the test harness,
//! supporting multiple configuration sources with proper precedence.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Failed to serialize TOML configuration.
    #[error("Failed to serialize TOML configuration: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// Failed to parse JSON configuration.
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Unsupported file format.
    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

/// Main harness settings.
///
/// This struct contains all configurable options for a test run. Settings can
/// be loaded from files, environment variables, or per-run overrides.
///
/// # Configuration Precedence
///
/// Settings are applied in the following order (later sources override earlier):
/// 1. Default values
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables (`HARNESS_*`)
/// 4. Per-run overrides ([`RunOverrides`])
///
/// # Example
///
/// ```rust
/// use webdriver_harness::config::HarnessSettings;
///
/// let settings = HarnessSettings::default()
///     .with_browser("firefox")
///     .with_wait_timeout_secs(20);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessSettings {
    /// Browser variant to run tests against (chrome, firefox, edge, safari).
    #[serde(default = "default_browser")]
    pub browser: String,

    /// Base URL of the application under test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Base URL for API requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Explicit wait timeout applied to every blocking interaction, in seconds.
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Polling interval for bounded waits, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Run the browser in headless mode (no visible window).
    #[serde(default)]
    pub headless: bool,

    /// Wrap new sessions in the self-healing lookup decorator.
    #[serde(default = "default_healing_enabled")]
    pub healing_enabled: bool,

    /// Explicit path to the driver binary for the selected browser.
    /// Overrides all resolution strategies when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_path: Option<PathBuf>,

    /// Directory scanned for managed driver binaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_cache_dir: Option<PathBuf>,

    /// Location of the persisted locator history consumed by the healing
    /// decorator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healing_history_path: Option<PathBuf>,
}

// Default value functions for serde
fn default_browser() -> String {
    "chrome".to_string()
}

fn default_wait_timeout_secs() -> u64 {
    15
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_healing_enabled() -> bool {
    true
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            browser: default_browser(),
            base_url: None,
            api_base_url: None,
            wait_timeout_secs: default_wait_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            headless: false,
            healing_enabled: default_healing_enabled(),
            driver_path: None,
            driver_cache_dir: None,
            healing_history_path: None,
        }
    }
}

impl HarnessSettings {
    /// Creates a new HarnessSettings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a configuration file.
    ///
    /// Supports both TOML and JSON formats, detected by file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use webdriver_harness::config::HarnessSettings;
    ///
    /// let settings = HarnessSettings::from_file("harness.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(toml::from_str(&content)?),
            "json" => Ok(serde_json::from_str(&content)?),
            ext => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Saves settings to a configuration file.
    ///
    /// The format is determined by the file extension.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let content = match extension.as_str() {
            "toml" => toml::to_string_pretty(self)?,
            "json" => serde_json::to_string_pretty(self)?,
            ext => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Loads settings from environment variables.
    ///
    /// Environment variables are prefixed with `HARNESS_` and use uppercase
    /// names with underscores. For example:
    /// - `HARNESS_BROWSER`
    /// - `HARNESS_WAIT_TIMEOUT_SECS`
    /// - `HARNESS_HEALING_ENABLED`
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env_overrides();
        settings
    }

    /// Applies environment variable overrides to current settings.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("HARNESS_BROWSER") {
            if !val.trim().is_empty() {
                self.browser = val;
            }
        }

        if let Ok(val) = env::var("HARNESS_BASE_URL") {
            self.base_url = Some(val);
        }

        if let Ok(val) = env::var("HARNESS_API_BASE_URL") {
            self.api_base_url = Some(val);
        }

        if let Ok(val) = env::var("HARNESS_WAIT_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.wait_timeout_secs = secs;
            }
        }

        if let Ok(val) = env::var("HARNESS_POLL_INTERVAL_MS") {
            if let Ok(ms) = val.parse() {
                self.poll_interval_ms = ms;
            }
        }

        if let Ok(val) = env::var("HARNESS_HEADLESS") {
            self.headless = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = env::var("HARNESS_HEALING_ENABLED") {
            self.healing_enabled = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = env::var("HARNESS_DRIVER_PATH") {
            self.driver_path = Some(PathBuf::from(val));
        }

        if let Ok(val) = env::var("HARNESS_DRIVER_CACHE_DIR") {
            self.driver_cache_dir = Some(PathBuf::from(val));
        }

        if let Ok(val) = env::var("HARNESS_HEALING_HISTORY") {
            self.healing_history_path = Some(PathBuf::from(val));
        }
    }

    /// Merges current settings with environment variable overrides.
    ///
    /// Returns a new settings instance with environment overrides applied.
    pub fn merge_with_env(mut self) -> Self {
        self.apply_env_overrides();
        self
    }

    /// Merges settings with per-run overrides.
    pub fn merge_with_overrides(mut self, overrides: &RunOverrides) -> Self {
        if let Some(ref browser) = overrides.browser {
            self.browser = browser.clone();
        }
        if let Some(ref base_url) = overrides.base_url {
            self.base_url = Some(base_url.clone());
        }
        if let Some(ref api_base_url) = overrides.api_base_url {
            self.api_base_url = Some(api_base_url.clone());
        }
        if let Some(secs) = overrides.wait_timeout_secs {
            self.wait_timeout_secs = secs;
        }
        if let Some(headless) = overrides.headless {
            self.headless = headless;
        }
        if let Some(healing) = overrides.healing_enabled {
            self.healing_enabled = healing;
        }
        if let Some(ref path) = overrides.driver_path {
            self.driver_path = Some(path.clone());
        }

        self
    }

    /// Validates all settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any setting is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.browser.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Browser name cannot be empty".to_string(),
            ));
        }

        if self.wait_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Wait timeout must be at least 1 second".to_string(),
            ));
        }
        if self.wait_timeout_secs > 300 {
            return Err(ConfigError::ValidationError(
                "Wait timeout cannot exceed 300 seconds (5 minutes)".to_string(),
            ));
        }

        if self.poll_interval_ms < 50 {
            return Err(ConfigError::ValidationError(
                "Poll interval must be at least 50ms".to_string(),
            ));
        }
        if self.poll_interval_ms > self.wait_timeout_secs * 1000 {
            return Err(ConfigError::ValidationError(
                "Poll interval cannot exceed the wait timeout".to_string(),
            ));
        }

        if let Some(ref url) = self.base_url {
            if url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "Base URL cannot be empty when set".to_string(),
                ));
            }
        }

        if let Some(ref url) = self.api_base_url {
            if url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "API base URL cannot be empty when set".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Returns the wait timeout as a [`Duration`].
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    /// Returns the polling interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    // Builder-style methods for convenient configuration

    /// Sets the browser variant name.
    pub fn with_browser(mut self, browser: impl Into<String>) -> Self {
        self.browser = browser.into();
        self
    }

    /// Sets the application base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the explicit wait timeout in seconds.
    pub fn with_wait_timeout_secs(mut self, secs: u64) -> Self {
        self.wait_timeout_secs = secs;
        self
    }

    /// Sets the polling interval in milliseconds.
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Sets headless mode.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Enables or disables the self-healing lookup decorator.
    pub fn with_healing(mut self, enabled: bool) -> Self {
        self.healing_enabled = enabled;
        self
    }

    /// Sets an explicit driver binary path.
    pub fn with_driver_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.driver_path = Some(path.into());
        self
    }

    /// Sets the managed driver cache directory.
    pub fn with_driver_cache_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.driver_cache_dir = Some(path.into());
        self
    }

    /// Sets the persisted locator history location.
    pub fn with_healing_history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.healing_history_path = Some(path.into());
        self
    }
}

/// Per-run override structure.
///
/// The analog of passing `-Dbrowser=safari` to the original framework: a set
/// of optional values applied on top of file and environment configuration.
/// All fields are optional to allow partial overrides.
#[derive(Debug, Default, Clone)]
pub struct RunOverrides {
    /// Browser variant name.
    pub browser: Option<String>,
    /// Application base URL.
    pub base_url: Option<String>,
    /// API base URL.
    pub api_base_url: Option<String>,
    /// Explicit wait timeout in seconds.
    pub wait_timeout_secs: Option<u64>,
    /// Enable headless mode.
    pub headless: Option<bool>,
    /// Enable the self-healing decorator.
    pub healing_enabled: Option<bool>,
    /// Explicit driver binary path.
    pub driver_path: Option<PathBuf>,
    /// Configuration file path.
    pub config_file: Option<PathBuf>,
}

impl RunOverrides {
    /// Creates an empty RunOverrides instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the final settings by applying the full configuration chain.
    ///
    /// This method handles the complete configuration precedence:
    /// 1. Default values
    /// 2. Configuration file (if specified)
    /// 3. Environment variables
    /// 4. Per-run overrides (self)
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use webdriver_harness::config::RunOverrides;
    ///
    /// let overrides = RunOverrides {
    ///     config_file: Some("harness.toml".into()),
    ///     browser: Some("safari".to_string()),
    ///     ..Default::default()
    /// };
    ///
    /// let settings = overrides.load_settings().unwrap();
    /// ```
    pub fn load_settings(&self) -> Result<HarnessSettings, ConfigError> {
        // Start with defaults or file
        let mut settings = if let Some(ref config_file) = self.config_file {
            HarnessSettings::from_file(config_file)?
        } else {
            HarnessSettings::default()
        };

        // Apply environment overrides
        settings = settings.merge_with_env();

        // Apply per-run overrides
        settings = settings.merge_with_overrides(self);

        // Validate final settings
        settings.validate()?;

        Ok(settings)
    }
}
