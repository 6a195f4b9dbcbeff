//! Resilient interaction primitives.
//!
//! [`Interactor`] turns the raw single-attempt session operations into
//! bounded-wait, retried interactions: each primitive polls its precondition
//! (presence, visibility, enablement) at the wait policy's interval until it
//! holds or the deadline elapses. Page objects are built entirely on these
//! primitives and hold no session-lifecycle responsibility.

use crate::interact::locator::Locator;
use crate::interact::wait::{InteractError, WaitPolicy};
use crate::session::backend::{SelectBy, SessionBackend, SessionError};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Bounded-wait interaction layer over one session.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use webdriver_harness::interact::{Interactor, Locator, WaitPolicy};
/// use webdriver_harness::session::{MockElement, MockSession};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let session = Arc::new(MockSession::chrome());
/// session.install(&Locator::id("login"), MockElement::visible());
///
/// let ui = Interactor::new(session, WaitPolicy::default());
/// ui.click(&Locator::id("login")).await.unwrap();
/// # }
/// ```
pub struct Interactor {
    session: Arc<dyn SessionBackend>,
    policy: WaitPolicy,
}

impl Interactor {
    /// Creates an interaction layer over the session with the given policy.
    pub fn new(session: Arc<dyn SessionBackend>, policy: WaitPolicy) -> Self {
        Self { session, policy }
    }

    /// The session this layer drives.
    pub fn session(&self) -> &Arc<dyn SessionBackend> {
        &self.session
    }

    /// The effective wait policy.
    pub fn policy(&self) -> WaitPolicy {
        self.policy
    }

    /// Navigates the session to the given URL.
    pub async fn navigate_to(&self, url: &str) -> Result<(), InteractError> {
        match self.session.navigate(url).await {
            Ok(()) => {
                info!(url, "Navigated to URL");
                Ok(())
            }
            Err(err) => {
                error!(url, error = %err, "Failed to navigate to URL");
                Err(err.into())
            }
        }
    }

    /// Waits until the element is present, visible, and enabled, then
    /// dispatches a click.
    pub async fn click(&self, locator: &Locator) -> Result<(), InteractError> {
        let result = self
            .policy
            .wait_until(&locator.key(), || async move {
                let state = self.session.lookup(locator).await?;
                if !state.is_clickable() {
                    return Err(SessionError::NotInteractable(locator.key()));
                }
                self.session.click(locator).await
            })
            .await;

        match result {
            Ok(()) => {
                info!(%locator, "Clicked on element");
                Ok(())
            }
            Err(err) => {
                error!(%locator, error = %err, "Failed to click on element");
                Err(err)
            }
        }
    }

    /// Waits for visibility, clears any existing value, then types `text`.
    pub async fn send_text(&self, locator: &Locator, text: &str) -> Result<(), InteractError> {
        let result = self
            .policy
            .wait_until(&locator.key(), || async move {
                let state = self.session.lookup(locator).await?;
                if !state.is_visible {
                    return Err(SessionError::NotInteractable(locator.key()));
                }
                self.session.clear(locator).await?;
                self.session.type_text(locator, text).await
            })
            .await;

        match result {
            Ok(()) => {
                info!(%locator, text, "Sent text to element");
                Ok(())
            }
            Err(err) => {
                error!(%locator, error = %err, "Failed to send text to element");
                Err(err)
            }
        }
    }

    /// Waits for visibility and returns the element's rendered text.
    pub async fn read_text(&self, locator: &Locator) -> Result<String, InteractError> {
        let result = self
            .policy
            .wait_until(&locator.key(), || async move {
                let state = self.session.lookup(locator).await?;
                if !state.is_visible {
                    return Err(SessionError::NotInteractable(locator.key()));
                }
                self.session.read_text(locator).await
            })
            .await;

        match result {
            Ok(text) => {
                info!(%locator, text, "Retrieved text from element");
                Ok(text)
            }
            Err(err) => {
                error!(%locator, error = %err, "Failed to get text from element");
                Err(err)
            }
        }
    }

    /// Waits for visibility; timeout is a valid `false` result, not an
    /// error. A terminal session failure still propagates.
    pub async fn is_visible(&self, locator: &Locator) -> Result<bool, InteractError> {
        let result = self
            .policy
            .wait_until(&locator.key(), || async move {
                let state = self.session.lookup(locator).await?;
                if !state.is_visible {
                    return Err(SessionError::NotInteractable(locator.key()));
                }
                Ok(())
            })
            .await;

        match result {
            Ok(()) => {
                info!(%locator, "Element is visible");
                Ok(true)
            }
            Err(err) if err.is_timeout() => {
                warn!(%locator, "Element not visible within timeout");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Waits for visibility, then selects the dropdown option with the given
    /// visible text.
    pub async fn select_by_visible_text(
        &self,
        locator: &Locator,
        text: &str,
    ) -> Result<(), InteractError> {
        self.select(locator, SelectBy::VisibleText(text.to_string()))
            .await
    }

    /// Waits for visibility, then selects the dropdown option with the given
    /// value.
    pub async fn select_by_value(
        &self,
        locator: &Locator,
        value: &str,
    ) -> Result<(), InteractError> {
        self.select(locator, SelectBy::Value(value.to_string())).await
    }

    async fn select(&self, locator: &Locator, by: SelectBy) -> Result<(), InteractError> {
        let result = self
            .policy
            .wait_until(&locator.key(), || {
                let by = by.clone();
                async move {
                    let state = self.session.lookup(locator).await?;
                    if !state.is_visible {
                        return Err(SessionError::NotInteractable(locator.key()));
                    }
                    self.session.select_option(locator, &by).await
                }
            })
            .await;

        match result {
            Ok(()) => {
                info!(%locator, %by, "Selected dropdown option");
                Ok(())
            }
            Err(err) => {
                error!(%locator, %by, error = %err, "Failed to select dropdown option");
                Err(err)
            }
        }
    }

    /// Executes a script in the session and returns its result.
    ///
    /// Fails immediately on execution error; script execution has no
    /// visibility precondition, so there is no wait.
    pub async fn run_script(&self, script: &str, args: Vec<Value>) -> Result<Value, InteractError> {
        match self.session.execute_script(script, args).await {
            Ok(value) => Ok(value),
            Err(err) => {
                error!(error = %err, "Failed to execute script");
                Err(err.into())
            }
        }
    }

    /// Polls the page readiness signal until it reports complete or the
    /// timeout elapses.
    ///
    /// Readiness is best-effort: a timeout here is logged and swallowed, not
    /// escalated. A terminal session failure still propagates.
    pub async fn wait_for_page_ready(&self) -> Result<(), InteractError> {
        let deadline = Instant::now() + self.policy.timeout;

        loop {
            match self.session.ready_state().await {
                Ok(true) => {
                    info!("Page loaded successfully");
                    return Ok(());
                }
                Ok(false) => debug!("Page not ready yet"),
                Err(err) if !err.is_transient() => {
                    error!(error = %err, "Readiness poll failed");
                    return Err(err.into());
                }
                Err(err) => debug!(error = %err, "Readiness poll missed"),
            }

            if Instant::now() >= deadline {
                warn!(timeout = ?self.policy.timeout, "Page load wait timed out");
                return Ok(());
            }

            tokio::time::sleep(self.policy.poll_interval).await;
        }
    }

    /// Returns the current page title.
    pub async fn page_title(&self) -> Result<String, InteractError> {
        Ok(self.session.title().await?)
    }

    /// Returns the current page URL.
    pub async fn current_url(&self) -> Result<String, InteractError> {
        Ok(self.session.current_url().await?)
    }
}
