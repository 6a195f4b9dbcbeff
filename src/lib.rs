//! # Webdriver Harness
//!
//! A browser test-automation harness written in Rust.
//!
//! The harness drives browsers through page-object abstractions and issues
//! HTTP calls through a fluent request builder. Its core is the per-worker
//! session lifecycle (creation, isolated reuse, teardown across browser
//! variants, with an optional self-healing element-lookup decoration) and a
//! resilient interaction layer that turns flaky raw element operations into
//! bounded-wait, retried primitives.
//!
//! ## Features
//!
//! - **Per-worker Session Registry**: one isolated session per test worker,
//!   idempotent acquisition, guaranteed teardown
//! - **Variant Initializer**: chrome/firefox/edge/safari startup with
//!   anti-detection options and driver-binary fallback resolution
//! - **Self-healing Decoration Point**: failed lookups retried against a
//!   persisted history of successful locators
//! - **Bounded-wait Interactions**: click, type, read, visibility, dropdown
//!   selection, and script execution under one process-wide wait policy
//! - **Fluent API Client**: header/query/body/auth accumulation over a
//!   shared HTTP client
//! - **Flexible Configuration**: TOML/JSON files, environment variables,
//!   per-run overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use webdriver_harness::config::HarnessSettings;
//! use webdriver_harness::harness::TestHarness;
//! use webdriver_harness::pages::LoginPage;
//! use webdriver_harness::session::WorkerId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     webdriver_harness::logging::init();
//!
//!     let settings = HarnessSettings::default().with_base_url("https://app.example.com");
//!     # #[cfg(feature = "webdriver")]
//!     let harness = TestHarness::with_webdriver(settings.clone());
//!     # #[cfg(not(feature = "webdriver"))]
//!     # let harness = TestHarness::new(settings.clone(), Arc::new(webdriver_harness::session::MockSessionFactory::new()));
//!
//!     let worker = WorkerId::current_thread();
//!     let ui = harness.interactor(&worker).await?;
//!     ui.navigate_to("https://app.example.com/login").await?;
//!
//!     let login = LoginPage::new(Arc::clone(ui.session()), harness.wait_policy());
//!     login.login("user@example.com", "secret").await?;
//!
//!     harness.teardown(&worker).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`session`]: session lifecycle, variant startup, driver resolution,
//!   healing decoration
//! - [`interact`]: locators, wait policy, bounded-wait interaction
//!   primitives
//! - [`pages`]: page objects over the interaction layer
//! - [`api`]: fluent HTTP client
//! - [`config`]: configuration loading and management
//! - [`harness`]: facade wiring configuration, registry, and decoration
//! - [`logging`]: tracing bootstrap
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Webdriver Harness                         │
//! ├────────────────────────────────────────────────────────────────┤
//! │  ┌─────────┐  ┌──────────┐  ┌─────────┐  ┌─────────┐          │
//! │  │  Pages  │  │ Interact │  │ Session │  │   API   │          │
//! │  │         │  │  Layer   │  │ Registry│  │ Client  │          │
//! │  └────┬────┘  └────┬─────┘  └────┬────┘  └────┬────┘          │
//! │       │            │             │            │                │
//! │       └────────────┴─────────────┴────────────┘                │
//! │                          │                                     │
//! │                    ┌─────┴─────┐                               │
//! │                    │  Config   │                               │
//! │                    └───────────┘                               │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//!
//! Configuration follows a precedence chain:
//! 1. Default values
//! 2. Configuration file (TOML/JSON)
//! 3. Environment variables (`HARNESS_*`)
//! 4. Per-run overrides
//!
//! See [`config::HarnessSettings`] for all available options.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Full version string with name
pub const FULL_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Module Exports
// ============================================================================

/// Session lifecycle: registry, variant startup, driver resolution, healing.
pub mod session;

/// Bounded-wait interaction primitives, locators, and the wait policy.
pub mod interact;

/// Page objects over the interaction layer.
pub mod pages;

/// Fluent HTTP API client.
pub mod api;

/// Configuration management for loading settings from files and env.
pub mod config;

/// Harness facade wiring configuration, registry, and decoration.
pub mod harness;

/// Tracing bootstrap for test runs.
pub mod logging;

// ============================================================================
// Re-exports for Convenience
// ============================================================================

// Session types
pub use session::{
    decorate, BrowserVariant, DriverResolutionError, DriverResolver, ElementState,
    HealingFactory, HealingSession, InMemoryLocatorMemory, JsonFileMemory, LaunchError,
    LaunchPlan, LocatorMemory, MockElement, MockSession, MockSessionFactory, SelectBy,
    SessionBackend, SessionError, SessionFactory, SessionRegistry, UnsupportedVariantError,
    VariantDescriptor, WorkerId,
};

// WebDriver-backed types (when feature enabled)
#[cfg(feature = "webdriver")]
pub use session::{WebDriverFactory, WebDriverSession};

// Interaction types
pub use interact::{InteractError, Interactor, Locator, LocatorStrategy, WaitPolicy};

// Page object types
pub use pages::{DashboardPage, LoginPage};

// API client types
pub use api::{ApiClient, ApiError, ApiResponse};

// Config types
pub use config::{ConfigError, HarnessSettings, RunOverrides};

// Harness facade
pub use harness::TestHarness;

// ============================================================================
// Prelude Module
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use webdriver_harness::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::ApiClient;
    pub use crate::config::HarnessSettings;
    pub use crate::harness::TestHarness;
    pub use crate::interact::{Interactor, Locator, WaitPolicy};
    pub use crate::pages::{DashboardPage, LoginPage};
    pub use crate::session::{BrowserVariant, SessionBackend, SessionRegistry, WorkerId};
    pub use crate::{FULL_VERSION, NAME, VERSION};
}
