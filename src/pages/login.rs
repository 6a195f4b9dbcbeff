//! Login page object.

use crate::interact::{InteractError, Interactor, Locator, WaitPolicy};
use crate::session::SessionBackend;
use std::sync::Arc;

/// Page object for the application login page.
///
/// Holds no session-lifecycle responsibility: it receives a session at
/// construction and drives it only through interaction primitives.
pub struct LoginPage {
    ui: Interactor,
    email_input: Locator,
    password_input: Locator,
    login_button: Locator,
    error_message: Locator,
    page_header: Locator,
}

impl LoginPage {
    /// Creates the page object over a session.
    pub fn new(session: Arc<dyn SessionBackend>, policy: WaitPolicy) -> Self {
        Self {
            ui: Interactor::new(session, policy),
            email_input: Locator::id("email"),
            password_input: Locator::id("password"),
            login_button: Locator::xpath("//button[contains(text(), 'Login')]"),
            error_message: Locator::class_name("error-message"),
            page_header: Locator::tag_name("h1"),
        }
    }

    /// Enters the email address.
    pub async fn enter_email(&self, email: &str) -> Result<(), InteractError> {
        self.ui.send_text(&self.email_input, email).await
    }

    /// Enters the password.
    pub async fn enter_password(&self, password: &str) -> Result<(), InteractError> {
        self.ui.send_text(&self.password_input, password).await
    }

    /// Clicks the login button.
    pub async fn click_login_button(&self) -> Result<(), InteractError> {
        self.ui.click(&self.login_button).await
    }

    /// Performs a full login.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), InteractError> {
        self.enter_email(email).await?;
        self.enter_password(password).await?;
        self.click_login_button().await
    }

    /// Returns the error message text.
    pub async fn error_message(&self) -> Result<String, InteractError> {
        self.ui.read_text(&self.error_message).await
    }

    /// Returns the page header text.
    pub async fn page_header(&self) -> Result<String, InteractError> {
        self.ui.read_text(&self.page_header).await
    }

    /// Whether the login button is displayed.
    pub async fn is_login_button_displayed(&self) -> Result<bool, InteractError> {
        self.ui.is_visible(&self.login_button).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MockElement, MockSession};
    use std::time::Duration;

    fn page(session: Arc<MockSession>) -> LoginPage {
        LoginPage::new(
            session,
            WaitPolicy::new(Duration::from_millis(200), Duration::from_millis(20)),
        )
    }

    #[tokio::test]
    async fn test_login_flow_drives_all_fields() {
        let session = Arc::new(MockSession::chrome());
        session.install(&Locator::id("email"), MockElement::visible());
        session.install(&Locator::id("password"), MockElement::visible());
        session.install(
            &Locator::xpath("//button[contains(text(), 'Login')]"),
            MockElement::visible(),
        );

        let page = page(Arc::clone(&session));
        page.login("user@example.com", "secret").await.unwrap();

        assert_eq!(
            session.element_value(&Locator::id("email")),
            Some("user@example.com".to_string())
        );
        assert_eq!(
            session.element_value(&Locator::id("password")),
            Some("secret".to_string())
        );
        assert_eq!(
            session.click_count(&Locator::xpath("//button[contains(text(), 'Login')]")),
            1
        );
    }

    #[tokio::test]
    async fn test_error_message_and_header() {
        let session = Arc::new(MockSession::chrome());
        session.install(
            &Locator::class_name("error-message"),
            MockElement::visible().with_text("Invalid credentials"),
        );
        session.install(
            &Locator::tag_name("h1"),
            MockElement::visible().with_text("Sign in"),
        );

        let page = page(session);
        assert_eq!(page.error_message().await.unwrap(), "Invalid credentials");
        assert_eq!(page.page_header().await.unwrap(), "Sign in");
    }

    #[tokio::test]
    async fn test_login_button_visibility() {
        let session = Arc::new(MockSession::chrome());
        let page = page(session);
        assert!(!page.is_login_button_displayed().await.unwrap());
    }
}
