//! Session capability abstraction.
//!
//! This module defines the trait every browser session implements, allowing
//! different backends (a real WebDriver connection, a mock for testing, the
//! self-healing decorator) to be used interchangeably. Trait operations are
//! single-attempt primitives: the bounded-wait retry behavior lives in the
//! interaction layer, not here.
//!
//! # Example
//!
//! ```rust,ignore
//! use webdriver_harness::session::{MockSession, SessionBackend};
//! use webdriver_harness::interact::Locator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = MockSession::new(Default::default());
//!     let state = session.lookup(&Locator::id("email")).await?;
//!     println!("visible: {}", state.is_visible);
//!     Ok(())
//! }
//! ```

use crate::interact::Locator;
use crate::session::variant::BrowserVariant;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by raw session operations.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// No element matched the locator. Transient: wait loops retry it.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The element exists but is not in an interactable state (hidden or
    /// disabled). Transient: wait loops retry it.
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// In-session script execution failed. Terminal for the operation.
    #[error("Script execution failed: {0}")]
    Script(String),

    /// The underlying session terminated unexpectedly. Terminal: propagated
    /// immediately, never retried; the registry clears the slot on next
    /// access.
    #[error("Session terminated: {0}")]
    Fatal(String),
}

impl SessionError {
    /// Returns true if a bounded wait may retry after this error.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SessionError::ElementNotFound(_) | SessionError::NotInteractable(_)
        )
    }
}

/// Observable state of a located element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElementState {
    /// Whether the element is rendered visibly on the page.
    pub is_visible: bool,
    /// Whether the element is enabled (for form elements).
    pub is_enabled: bool,
}

impl ElementState {
    /// Whether the element can receive a click.
    pub fn is_clickable(&self) -> bool {
        self.is_visible && self.is_enabled
    }
}

/// Discriminator for dropdown selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectBy {
    /// Select the option whose rendered text matches exactly.
    VisibleText(String),
    /// Select the option whose value attribute matches exactly.
    Value(String),
}

impl std::fmt::Display for SelectBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectBy::VisibleText(text) => write!(f, "text '{}'", text),
            SelectBy::Value(value) => write!(f, "value '{}'", value),
        }
    }
}

/// Trait defining the session capability interface.
///
/// A session is an opaque handle to one running browser automation context,
/// owned exclusively by the worker that acquired it. Callers depend only on
/// this capability, never on which implementation they hold (plain or
/// healing-wrapped).
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Unique identity of this session handle.
    fn id(&self) -> Uuid;

    /// The browser variant this session drives.
    fn variant(&self) -> BrowserVariant;

    /// Whether this session has the self-healing lookup decoration applied.
    fn healing_enabled(&self) -> bool {
        false
    }

    /// Whether the underlying browser context is still usable.
    async fn is_alive(&self) -> bool;

    /// Navigates the session to the given URL.
    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    /// Looks up an element and reports its state. Single attempt.
    async fn lookup(&self, locator: &Locator) -> Result<ElementState, SessionError>;

    /// Dispatches a click to the element. Single attempt.
    async fn click(&self, locator: &Locator) -> Result<(), SessionError>;

    /// Clears any existing value from the element.
    async fn clear(&self, locator: &Locator) -> Result<(), SessionError>;

    /// Types text into the element without clearing it first.
    async fn type_text(&self, locator: &Locator, text: &str) -> Result<(), SessionError>;

    /// Returns the element's rendered text.
    async fn read_text(&self, locator: &Locator) -> Result<String, SessionError>;

    /// Returns the element's current value attribute, if any.
    async fn read_value(&self, locator: &Locator) -> Result<Option<String>, SessionError>;

    /// Performs a dropdown selection by the given discriminator.
    async fn select_option(&self, locator: &Locator, by: &SelectBy) -> Result<(), SessionError>;

    /// Executes a script synchronously in the session and returns its result.
    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, SessionError>;

    /// Whether the current page reports a complete readiness signal.
    async fn ready_state(&self) -> Result<bool, SessionError>;

    /// Returns the current page title.
    async fn title(&self) -> Result<String, SessionError>;

    /// Returns the current page URL.
    async fn current_url(&self) -> Result<String, SessionError>;

    /// Terminates the underlying browser context and releases its resources.
    async fn close(&self) -> Result<(), SessionError>;
}
