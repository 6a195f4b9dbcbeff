//! Session module providing the browser session lifecycle.
//!
//! This module contains the per-worker session registry, the variant
//! initializer (descriptor table, driver resolution, launch planning), the
//! self-healing decoration point, and the session capability abstraction.
//!
//! # Submodules
//!
//! - [`variant`] - Supported browser variants and name parsing
//! - [`descriptor`] - Immutable per-variant startup descriptors
//! - [`backend`] - Session capability trait and error taxonomy
//! - [`mock`] - Scripted session implementation for tests
//! - [`resolver`] - Driver binary resolution with fallback strategies
//! - [`launch`] - Session factory seam and launch planning
//! - [`registry`] - Per-worker session registry
//! - [`healing`] - Self-healing lookup decoration
//! - [`webdriver`] - WebDriver-protocol session (requires `webdriver` feature)

pub mod backend;
pub mod descriptor;
pub mod healing;
pub mod launch;
pub mod mock;
pub mod registry;
pub mod resolver;
pub mod variant;

/// WebDriver-protocol session implementation (requires `webdriver` feature).
#[cfg(feature = "webdriver")]
pub mod webdriver;

// Re-export commonly used types for convenience
pub use backend::{ElementState, SelectBy, SessionBackend, SessionError};
pub use descriptor::{descriptor, ResolutionStrategy, VariantDescriptor};
pub use healing::{
    decorate, HealingFactory, HealingSession, HistoryError, InMemoryLocatorMemory,
    JsonFileMemory, LocatorMemory,
};
pub use launch::{LaunchError, LaunchPlan, SessionFactory};
pub use mock::{MockElement, MockOption, MockSession, MockSessionFactory};
pub use registry::{SessionRegistry, WorkerId};
pub use resolver::{DriverResolutionError, DriverResolver, ResolutionOrigin, ResolvedDriver};
pub use variant::{BrowserVariant, UnsupportedVariantError};

#[cfg(feature = "webdriver")]
pub use webdriver::{WebDriverFactory, WebDriverSession};
