//! Interaction module providing bounded-wait element operations.
//!
//! # Submodules
//!
//! - [`locator`] - Element locators (strategy + selector)
//! - [`wait`] - Process-wide wait policy and polling loop
//! - [`actions`] - Resilient interaction primitives over a session

pub mod actions;
pub mod locator;
pub mod wait;

// Re-export commonly used types for convenience
pub use actions::Interactor;
pub use locator::{Locator, LocatorStrategy};
pub use wait::{InteractError, WaitPolicy};
