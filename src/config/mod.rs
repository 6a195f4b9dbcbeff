//! Configuration module for the test harness.
//!
//! This module provides configuration management for a test run, including:
//! - Loading settings from files (TOML/JSON)
//! - Environment variable overrides (`HARNESS_*`)
//! - Per-run overrides (the `-Dbrowser=` analog)
//! - Validation and defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use webdriver_harness::config::HarnessSettings;
//!
//! // Load from default locations or create with defaults
//! let settings = HarnessSettings::default();
//!
//! // Load from a specific file
//! let settings = HarnessSettings::from_file("harness.toml").unwrap();
//!
//! // Override with environment variables
//! let settings = settings.merge_with_env();
//! ```

mod settings;

pub use settings::{ConfigError, HarnessSettings, RunOverrides};
