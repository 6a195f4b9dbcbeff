//! Mock session implementation for testing purposes.
//!
//! This implementation simulates a browser session without launching one,
//! making it suitable for unit tests of the registry, the interaction layer,
//! and the healing decorator. Pages are scripted: elements are installed
//! under their locator keys, can appear only after a number of lookups (to
//! exercise bounded waits), and record the interactions performed on them.

use crate::interact::Locator;
use crate::session::backend::{ElementState, SelectBy, SessionBackend, SessionError};
use crate::session::launch::{LaunchError, SessionFactory};
use crate::session::variant::BrowserVariant;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// A single option of a scripted dropdown element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockOption {
    /// Option value attribute.
    pub value: String,
    /// Option visible text.
    pub text: String,
}

impl MockOption {
    /// Creates an option with the given value and visible text.
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// A scripted element served by [`MockSession`].
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Whether the element is rendered visibly.
    pub visible: bool,
    /// Whether the element is enabled.
    pub enabled: bool,
    /// Rendered text content.
    pub text: String,
    /// Current value attribute (for form elements).
    pub value: Option<String>,
    /// Dropdown options, if this element is a select.
    pub options: Vec<MockOption>,
    /// Number of lookups that must fail before the element materializes.
    pub lookups_until_present: u32,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            visible: true,
            enabled: true,
            text: String::new(),
            value: None,
            options: Vec::new(),
            lookups_until_present: 0,
        }
    }
}

impl MockElement {
    /// A visible, enabled element.
    pub fn visible() -> Self {
        Self::default()
    }

    /// A present but invisible element.
    pub fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::default()
        }
    }

    /// A visible but disabled element.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Sets the rendered text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets dropdown options.
    pub fn with_options(mut self, options: Vec<MockOption>) -> Self {
        self.options = options;
        self
    }

    /// Makes the element materialize only after `lookups` failed lookups.
    pub fn appearing_after(mut self, lookups: u32) -> Self {
        self.lookups_until_present = lookups;
        self
    }

    fn state(&self) -> ElementState {
        ElementState {
            is_visible: self.visible,
            is_enabled: self.enabled,
        }
    }
}

/// Scripted outcome for a mock script execution.
#[derive(Debug, Clone)]
enum ScriptOutcome {
    Value(Value),
    Error(String),
}

#[derive(Default)]
struct MockPage {
    elements: HashMap<String, MockElement>,
    script_results: HashMap<String, ScriptOutcome>,
    title: String,
    url: String,
    ready_after_polls: u32,
    clicks: HashMap<String, usize>,
}

/// Mock session implementation.
///
/// # Example
///
/// ```rust
/// use webdriver_harness::session::{MockSession, MockElement, SessionBackend};
/// use webdriver_harness::interact::Locator;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let session = MockSession::chrome();
/// session.install(&Locator::id("email"), MockElement::visible());
///
/// let state = session.lookup(&Locator::id("email")).await.unwrap();
/// assert!(state.is_clickable());
/// # }
/// ```
pub struct MockSession {
    id: Uuid,
    variant: BrowserVariant,
    created_at: DateTime<Utc>,
    page: RwLock<MockPage>,
    alive: RwLock<bool>,
    fatal_reason: RwLock<Option<String>>,
}

impl MockSession {
    /// Creates a mock session for the given variant.
    pub fn new(variant: BrowserVariant) -> Self {
        Self {
            id: Uuid::new_v4(),
            variant,
            created_at: Utc::now(),
            page: RwLock::new(MockPage::default()),
            alive: RwLock::new(true),
            fatal_reason: RwLock::new(None),
        }
    }

    /// Creates a mock Chrome session.
    pub fn chrome() -> Self {
        Self::new(BrowserVariant::Chrome)
    }

    /// Timestamp when this session was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Installs a scripted element under the locator.
    pub fn install(&self, locator: &Locator, element: MockElement) {
        self.page.write().elements.insert(locator.key(), element);
    }

    /// Removes a scripted element.
    pub fn remove(&self, locator: &Locator) {
        self.page.write().elements.remove(&locator.key());
    }

    /// Sets the scripted page title.
    pub fn set_title(&self, title: impl Into<String>) {
        self.page.write().title = title.into();
    }

    /// Makes the page readiness signal report complete only after `polls`
    /// queries.
    pub fn set_ready_after(&self, polls: u32) {
        self.page.write().ready_after_polls = polls;
    }

    /// Scripts a result for a script source string.
    pub fn set_script_result(&self, script: &str, result: Value) {
        self.page
            .write()
            .script_results
            .insert(script.to_string(), ScriptOutcome::Value(result));
    }

    /// Scripts a failure for a script source string.
    pub fn set_script_error(&self, script: &str, message: impl Into<String>) {
        self.page
            .write()
            .script_results
            .insert(script.to_string(), ScriptOutcome::Error(message.into()));
    }

    /// Simulates an unexpected session termination.
    ///
    /// Every subsequent operation fails with [`SessionError::Fatal`].
    pub fn kill(&self, reason: impl Into<String>) {
        *self.alive.write() = false;
        *self.fatal_reason.write() = Some(reason.into());
    }

    /// Number of clicks dispatched to the locator so far.
    pub fn click_count(&self, locator: &Locator) -> usize {
        self.page
            .read()
            .clicks
            .get(&locator.key())
            .copied()
            .unwrap_or(0)
    }

    /// Current value of a scripted element, as typed by the session user.
    pub fn element_value(&self, locator: &Locator) -> Option<String> {
        self.page
            .read()
            .elements
            .get(&locator.key())
            .and_then(|e| e.value.clone())
    }

    fn check_alive(&self) -> Result<(), SessionError> {
        if *self.alive.read() {
            Ok(())
        } else {
            let reason = self
                .fatal_reason
                .read()
                .clone()
                .unwrap_or_else(|| "session is closed".to_string());
            Err(SessionError::Fatal(reason))
        }
    }

    /// Looks up an element, honoring its scripted appearance delay.
    fn resolve(&self, locator: &Locator) -> Result<MockElement, SessionError> {
        let mut page = self.page.write();
        let key = locator.key();
        match page.elements.get_mut(&key) {
            None => Err(SessionError::ElementNotFound(key)),
            Some(element) if element.lookups_until_present > 0 => {
                element.lookups_until_present -= 1;
                Err(SessionError::ElementNotFound(key))
            }
            Some(element) => Ok(element.clone()),
        }
    }

    fn require_interactable(&self, locator: &Locator) -> Result<MockElement, SessionError> {
        let element = self.resolve(locator)?;
        if !element.visible || !element.enabled {
            return Err(SessionError::NotInteractable(locator.key()));
        }
        Ok(element)
    }
}

#[async_trait]
impl SessionBackend for MockSession {
    fn id(&self) -> Uuid {
        self.id
    }

    fn variant(&self) -> BrowserVariant {
        self.variant
    }

    async fn is_alive(&self) -> bool {
        *self.alive.read()
    }

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        self.check_alive()?;
        self.page.write().url = url.to_string();
        Ok(())
    }

    async fn lookup(&self, locator: &Locator) -> Result<ElementState, SessionError> {
        self.check_alive()?;
        Ok(self.resolve(locator)?.state())
    }

    async fn click(&self, locator: &Locator) -> Result<(), SessionError> {
        self.check_alive()?;
        self.require_interactable(locator)?;
        let mut page = self.page.write();
        *page.clicks.entry(locator.key()).or_insert(0) += 1;
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> Result<(), SessionError> {
        self.check_alive()?;
        self.require_interactable(locator)?;
        let mut page = self.page.write();
        if let Some(element) = page.elements.get_mut(&locator.key()) {
            element.value = None;
            element.text.clear();
        }
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> Result<(), SessionError> {
        self.check_alive()?;
        self.require_interactable(locator)?;
        let mut page = self.page.write();
        if let Some(element) = page.elements.get_mut(&locator.key()) {
            let mut value = element.value.take().unwrap_or_default();
            value.push_str(text);
            element.text = value.clone();
            element.value = Some(value);
        }
        Ok(())
    }

    async fn read_text(&self, locator: &Locator) -> Result<String, SessionError> {
        self.check_alive()?;
        Ok(self.resolve(locator)?.text)
    }

    async fn read_value(&self, locator: &Locator) -> Result<Option<String>, SessionError> {
        self.check_alive()?;
        Ok(self.resolve(locator)?.value)
    }

    async fn select_option(&self, locator: &Locator, by: &SelectBy) -> Result<(), SessionError> {
        self.check_alive()?;
        let element = self.require_interactable(locator)?;

        let selected = element
            .options
            .iter()
            .find(|option| match by {
                SelectBy::VisibleText(text) => option.text == *text,
                SelectBy::Value(value) => option.value == *value,
            })
            .cloned()
            .ok_or_else(|| {
                SessionError::ElementNotFound(format!("{} option {}", locator.key(), by))
            })?;

        let mut page = self.page.write();
        if let Some(element) = page.elements.get_mut(&locator.key()) {
            element.value = Some(selected.value.clone());
            element.text = selected.text;
        }
        Ok(())
    }

    async fn execute_script(&self, script: &str, _args: Vec<Value>) -> Result<Value, SessionError> {
        self.check_alive()?;
        match self.page.read().script_results.get(script) {
            Some(ScriptOutcome::Value(value)) => Ok(value.clone()),
            Some(ScriptOutcome::Error(message)) => Err(SessionError::Script(message.clone())),
            None => Ok(Value::Null),
        }
    }

    async fn ready_state(&self) -> Result<bool, SessionError> {
        self.check_alive()?;
        let mut page = self.page.write();
        if page.ready_after_polls > 0 {
            page.ready_after_polls -= 1;
            Ok(false)
        } else {
            Ok(true)
        }
    }

    async fn title(&self) -> Result<String, SessionError> {
        self.check_alive()?;
        Ok(self.page.read().title.clone())
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        self.check_alive()?;
        Ok(self.page.read().url.clone())
    }

    async fn close(&self) -> Result<(), SessionError> {
        *self.alive.write() = false;
        Ok(())
    }
}

/// Session factory that produces [`MockSession`]s.
///
/// Each created session runs an optional setup closure (to script its page)
/// and is recorded for assertions. Construction can be scripted to fail,
/// which exercises the registry's error paths.
#[derive(Default)]
pub struct MockSessionFactory {
    setup: Option<Arc<dyn Fn(&MockSession) + Send + Sync>>,
    created: RwLock<Vec<Uuid>>,
    failure: RwLock<Option<String>>,
}

impl MockSessionFactory {
    /// Creates a factory whose sessions start with empty pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory that runs `setup` on every new session.
    pub fn with_setup(setup: impl Fn(&MockSession) + Send + Sync + 'static) -> Self {
        Self {
            setup: Some(Arc::new(setup)),
            ..Self::default()
        }
    }

    /// Makes every subsequent creation fail with a connect error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write() = Some(message.into());
    }

    /// Number of sessions created so far.
    pub fn created_count(&self) -> usize {
        self.created.read().len()
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    async fn create(
        &self,
        variant: BrowserVariant,
    ) -> Result<Arc<dyn SessionBackend>, LaunchError> {
        if let Some(message) = self.failure.read().clone() {
            return Err(LaunchError::Connect {
                url: "mock://driver".to_string(),
                message,
            });
        }

        let session = MockSession::new(variant);
        if let Some(setup) = &self.setup {
            setup(&session);
        }
        self.created.write().push(session.id());
        Ok(Arc::new(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_and_state() {
        let session = MockSession::chrome();
        session.install(&Locator::id("email"), MockElement::visible());
        session.install(&Locator::id("submit"), MockElement::disabled());

        let email = session.lookup(&Locator::id("email")).await.unwrap();
        assert!(email.is_clickable());

        let submit = session.lookup(&Locator::id("submit")).await.unwrap();
        assert!(submit.is_visible);
        assert!(!submit.is_clickable());

        let missing = session.lookup(&Locator::id("nope")).await;
        assert!(matches!(missing, Err(SessionError::ElementNotFound(_))));
    }

    #[tokio::test]
    async fn test_appearance_delay_counts_lookups() {
        let session = MockSession::chrome();
        session.install(&Locator::id("late"), MockElement::visible().appearing_after(2));

        assert!(session.lookup(&Locator::id("late")).await.is_err());
        assert!(session.lookup(&Locator::id("late")).await.is_err());
        assert!(session.lookup(&Locator::id("late")).await.is_ok());
    }

    #[tokio::test]
    async fn test_type_clear_and_read() {
        let session = MockSession::chrome();
        session.install(&Locator::id("q"), MockElement::visible());

        session.type_text(&Locator::id("q"), "abc").await.unwrap();
        session.type_text(&Locator::id("q"), "123").await.unwrap();
        assert_eq!(
            session.read_value(&Locator::id("q")).await.unwrap(),
            Some("abc123".to_string())
        );
        assert_eq!(session.read_text(&Locator::id("q")).await.unwrap(), "abc123");

        session.clear(&Locator::id("q")).await.unwrap();
        assert_eq!(session.read_value(&Locator::id("q")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_click_requires_interactable() {
        let session = MockSession::chrome();
        session.install(&Locator::id("hidden"), MockElement::hidden());

        let result = session.click(&Locator::id("hidden")).await;
        assert!(matches!(result, Err(SessionError::NotInteractable(_))));

        session.install(&Locator::id("ok"), MockElement::visible());
        session.click(&Locator::id("ok")).await.unwrap();
        session.click(&Locator::id("ok")).await.unwrap();
        assert_eq!(session.click_count(&Locator::id("ok")), 2);
    }

    #[tokio::test]
    async fn test_select_option() {
        let session = MockSession::chrome();
        session.install(
            &Locator::id("country"),
            MockElement::visible().with_options(vec![
                MockOption::new("ca", "Canada"),
                MockOption::new("de", "Germany"),
            ]),
        );

        session
            .select_option(&Locator::id("country"), &SelectBy::VisibleText("Germany".into()))
            .await
            .unwrap();
        assert_eq!(
            session.element_value(&Locator::id("country")),
            Some("de".to_string())
        );

        let missing = session
            .select_option(&Locator::id("country"), &SelectBy::Value("fr".into()))
            .await;
        assert!(matches!(missing, Err(SessionError::ElementNotFound(_))));
    }

    #[tokio::test]
    async fn test_scripts() {
        let session = MockSession::chrome();
        session.set_script_result("return 1 + 1", Value::from(2));
        session.set_script_error("return broken", "ReferenceError: broken");

        let value = session.execute_script("return 1 + 1", vec![]).await.unwrap();
        assert_eq!(value, Value::from(2));

        let err = session.execute_script("return broken", vec![]).await;
        assert!(matches!(err, Err(SessionError::Script(_))));

        let unknown = session.execute_script("return unknown", vec![]).await.unwrap();
        assert!(unknown.is_null());
    }

    #[tokio::test]
    async fn test_ready_state_countdown() {
        let session = MockSession::chrome();
        session.set_ready_after(2);

        assert!(!session.ready_state().await.unwrap());
        assert!(!session.ready_state().await.unwrap());
        assert!(session.ready_state().await.unwrap());
    }

    #[tokio::test]
    async fn test_kill_makes_operations_fatal() {
        let session = MockSession::chrome();
        session.install(&Locator::id("email"), MockElement::visible());

        assert!(session.is_alive().await);
        session.kill("browser crashed");
        assert!(!session.is_alive().await);

        let result = session.lookup(&Locator::id("email")).await;
        assert!(matches!(result, Err(SessionError::Fatal(_))));
    }

    #[tokio::test]
    async fn test_close_is_terminal() {
        let session = MockSession::chrome();
        session.close().await.unwrap();
        assert!(!session.is_alive().await);
    }

    #[tokio::test]
    async fn test_factory_counts_and_scripted_failure() {
        let factory = MockSessionFactory::with_setup(|session| {
            session.install(&Locator::id("seeded"), MockElement::visible());
        });

        let session = factory.create(BrowserVariant::Firefox).await.unwrap();
        assert_eq!(factory.created_count(), 1);
        assert_eq!(session.variant(), BrowserVariant::Firefox);
        assert!(session.lookup(&Locator::id("seeded")).await.is_ok());

        factory.fail_with("driver refused connection");
        let result = factory.create(BrowserVariant::Firefox).await;
        assert!(matches!(result, Err(LaunchError::Connect { .. })));
        assert_eq!(factory.created_count(), 1);
    }
}
