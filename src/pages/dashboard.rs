//! Dashboard page object.

use crate::interact::{InteractError, Interactor, Locator, WaitPolicy};
use crate::session::SessionBackend;
use std::sync::Arc;

/// Page object for the post-login dashboard.
pub struct DashboardPage {
    ui: Interactor,
    page_title: Locator,
    logout_button: Locator,
    product_list: Locator,
    user_menu: Locator,
}

impl DashboardPage {
    /// Creates the page object over a session.
    pub fn new(session: Arc<dyn SessionBackend>, policy: WaitPolicy) -> Self {
        Self {
            ui: Interactor::new(session, policy),
            page_title: Locator::class_name("title"),
            logout_button: Locator::id("logout_sidebar_link"),
            product_list: Locator::class_name("inventory_list"),
            user_menu: Locator::id("user_menu"),
        }
    }

    /// Returns the dashboard title text.
    pub async fn page_title(&self) -> Result<String, InteractError> {
        self.ui.read_text(&self.page_title).await
    }

    /// Whether the product list is visible.
    pub async fn is_product_list_visible(&self) -> Result<bool, InteractError> {
        self.ui.is_visible(&self.product_list).await
    }

    /// Clicks the logout button.
    pub async fn click_logout(&self) -> Result<(), InteractError> {
        self.ui.click(&self.logout_button).await
    }

    /// Whether a user is logged in, judged by the user menu being present.
    pub async fn is_user_logged_in(&self) -> Result<bool, InteractError> {
        self.ui.is_visible(&self.user_menu).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MockElement, MockSession};
    use std::time::Duration;

    #[tokio::test]
    async fn test_dashboard_queries() {
        let session = Arc::new(MockSession::chrome());
        session.install(
            &Locator::class_name("title"),
            MockElement::visible().with_text("Products"),
        );
        session.install(&Locator::class_name("inventory_list"), MockElement::visible());
        session.install(&Locator::id("logout_sidebar_link"), MockElement::visible());

        let page = DashboardPage::new(
            Arc::clone(&session) as Arc<dyn SessionBackend>,
            WaitPolicy::new(Duration::from_millis(200), Duration::from_millis(20)),
        );

        assert_eq!(page.page_title().await.unwrap(), "Products");
        assert!(page.is_product_list_visible().await.unwrap());
        assert!(!page.is_user_logged_in().await.unwrap());

        page.click_logout().await.unwrap();
        assert_eq!(session.click_count(&Locator::id("logout_sidebar_link")), 1);
    }
}
