//! Test harness facade.
//!
//! [`TestHarness`] is what step and test glue talk to: it wires the
//! configuration, the session registry, the factory composition (including
//! healing decoration when enabled), and the process-wide wait policy. A
//! test acquires its worker's session at setup and releases it at teardown;
//! an acquisition failure is a fatal setup error for that test.

use crate::config::HarnessSettings;
use crate::interact::{Interactor, WaitPolicy};
use crate::session::{
    HealingFactory, InMemoryLocatorMemory, JsonFileMemory, LaunchError, LocatorMemory,
    SessionBackend, SessionFactory, SessionRegistry, WorkerId,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Harness facade owning the session lifecycle for a test run.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use webdriver_harness::config::HarnessSettings;
/// use webdriver_harness::harness::TestHarness;
/// use webdriver_harness::session::{MockSessionFactory, WorkerId};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = HarnessSettings::default();
///     let harness = TestHarness::new(settings, Arc::new(MockSessionFactory::new()));
///
///     let worker = WorkerId::current_thread();
///     let ui = harness.interactor(&worker).await?;
///     ui.navigate_to("https://app.example.com/login").await?;
///
///     harness.teardown(&worker).await;
///     Ok(())
/// }
/// ```
pub struct TestHarness {
    settings: HarnessSettings,
    policy: WaitPolicy,
    registry: SessionRegistry,
}

impl TestHarness {
    /// Creates a harness over an explicit base session factory.
    ///
    /// The factory is wrapped so every created session passes through the
    /// healing decoration point; with healing disabled the raw session is
    /// used unchanged. The locator history comes from the configured file
    /// when set, otherwise an in-memory store.
    pub fn new(settings: HarnessSettings, base_factory: Arc<dyn SessionFactory>) -> Self {
        let memory = Self::open_memory(&settings);
        let factory = Arc::new(HealingFactory::new(
            base_factory,
            memory,
            settings.healing_enabled,
        ));

        info!(
            browser = %settings.browser,
            healing = settings.healing_enabled,
            timeout_secs = settings.wait_timeout_secs,
            "Harness initialized"
        );

        Self {
            policy: WaitPolicy::from_settings(&settings),
            registry: SessionRegistry::new(factory),
            settings,
        }
    }

    /// Creates a harness that starts real WebDriver sessions.
    #[cfg(feature = "webdriver")]
    pub fn with_webdriver(settings: HarnessSettings) -> Self {
        let factory = Arc::new(crate::session::WebDriverFactory::new(settings.clone()));
        Self::new(settings, factory)
    }

    fn open_memory(settings: &HarnessSettings) -> Arc<dyn LocatorMemory> {
        match &settings.healing_history_path {
            Some(path) => match JsonFileMemory::open(path) {
                Ok(memory) => Arc::new(memory),
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "Falling back to in-memory locator history"
                    );
                    Arc::new(InMemoryLocatorMemory::new())
                }
            },
            None => Arc::new(InMemoryLocatorMemory::new()),
        }
    }

    /// The effective settings for this run.
    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    /// The session registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// The process-wide wait policy.
    pub fn wait_policy(&self) -> WaitPolicy {
        self.policy
    }

    /// Acquires the worker's session for the configured browser.
    pub async fn session(&self, worker: &WorkerId) -> Result<Arc<dyn SessionBackend>, LaunchError> {
        self.registry.acquire(worker, &self.settings.browser).await
    }

    /// Acquires the worker's session and wraps it in the interaction layer.
    pub async fn interactor(&self, worker: &WorkerId) -> Result<Interactor, LaunchError> {
        let session = self.session(worker).await?;
        Ok(Interactor::new(session, self.policy))
    }

    /// Releases the worker's session. Idempotent.
    pub async fn teardown(&self, worker: &WorkerId) {
        self.registry.release(worker).await;
    }

    /// Releases every session. Intended for suite-level teardown.
    pub async fn teardown_all(&self) {
        self.registry.release_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MockSessionFactory;

    #[tokio::test]
    async fn test_sessions_are_decorated_per_settings() {
        let healing = TestHarness::new(
            HarnessSettings::default(),
            Arc::new(MockSessionFactory::new()),
        );
        let session = healing.session(&WorkerId::new("w1")).await.unwrap();
        assert!(session.healing_enabled());

        let plain = TestHarness::new(
            HarnessSettings::default().with_healing(false),
            Arc::new(MockSessionFactory::new()),
        );
        let session = plain.session(&WorkerId::new("w1")).await.unwrap();
        assert!(!session.healing_enabled());
    }

    #[tokio::test]
    async fn test_unsupported_browser_is_fatal_at_setup() {
        let harness = TestHarness::new(
            HarnessSettings::default().with_browser("netscape"),
            Arc::new(MockSessionFactory::new()),
        );

        let result = harness.session(&WorkerId::new("w1")).await;
        assert!(matches!(result, Err(LaunchError::UnsupportedVariant(_))));
    }

    #[tokio::test]
    async fn test_teardown_clears_worker_slot() {
        let harness = TestHarness::new(
            HarnessSettings::default(),
            Arc::new(MockSessionFactory::new()),
        );
        let worker = WorkerId::new("w1");

        harness.session(&worker).await.unwrap();
        harness.teardown(&worker).await;
        assert!(harness.registry().current(&worker).await.is_none());

        // Teardown twice is a no-op.
        harness.teardown(&worker).await;
    }

    #[tokio::test]
    async fn test_wait_policy_follows_settings() {
        let harness = TestHarness::new(
            HarnessSettings::default().with_wait_timeout_secs(30),
            Arc::new(MockSessionFactory::new()),
        );
        assert_eq!(
            harness.wait_policy().timeout,
            std::time::Duration::from_secs(30)
        );
    }
}
