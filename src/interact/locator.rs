//! Element locators.
//!
//! A [`Locator`] pairs a lookup strategy with a selector string. Locators are
//! immutable values: every interaction primitive takes one by reference and
//! never mutates it, and the healing history persists them verbatim.

use serde::{Deserialize, Serialize};

/// Strategy used to find a UI element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStrategy {
    /// Lookup by element id attribute.
    Id,
    /// Lookup by CSS selector.
    Css,
    /// Lookup by XPath expression.
    XPath,
    /// Lookup by name attribute.
    Name,
    /// Lookup by a single class name.
    ClassName,
    /// Lookup by tag name.
    TagName,
    /// Lookup by exact link text.
    LinkText,
}

impl LocatorStrategy {
    /// Short lowercase label used in log output and history keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            LocatorStrategy::Id => "id",
            LocatorStrategy::Css => "css",
            LocatorStrategy::XPath => "xpath",
            LocatorStrategy::Name => "name",
            LocatorStrategy::ClassName => "class",
            LocatorStrategy::TagName => "tag",
            LocatorStrategy::LinkText => "link_text",
        }
    }
}

/// A strategy + selector pair identifying a UI element.
///
/// # Example
///
/// ```rust
/// use webdriver_harness::interact::Locator;
///
/// let email = Locator::id("email");
/// let login = Locator::xpath("//button[contains(text(), 'Login')]");
/// assert_eq!(email.to_string(), "id=email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// Lookup strategy.
    pub strategy: LocatorStrategy,
    /// Selector string interpreted under the strategy.
    pub selector: String,
}

impl Locator {
    /// Creates a locator with an explicit strategy.
    pub fn new(strategy: LocatorStrategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: selector.into(),
        }
    }

    /// Locator by element id.
    pub fn id(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Id, selector)
    }

    /// Locator by CSS selector.
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Css, selector)
    }

    /// Locator by XPath expression.
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::XPath, selector)
    }

    /// Locator by name attribute.
    pub fn name(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Name, selector)
    }

    /// Locator by class name.
    pub fn class_name(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::ClassName, selector)
    }

    /// Locator by tag name.
    pub fn tag_name(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::TagName, selector)
    }

    /// Locator by exact link text.
    pub fn link_text(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::LinkText, selector)
    }

    /// Stable string key for this locator, used by mock backends and the
    /// healing history.
    pub fn key(&self) -> String {
        format!("{}={}", self.strategy.as_str(), self.selector)
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.strategy.as_str(), self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Locator::id("email").strategy, LocatorStrategy::Id);
        assert_eq!(Locator::css(".error-message").strategy, LocatorStrategy::Css);
        assert_eq!(Locator::xpath("//h1").strategy, LocatorStrategy::XPath);
        assert_eq!(Locator::name("q").strategy, LocatorStrategy::Name);
        assert_eq!(Locator::class_name("title").strategy, LocatorStrategy::ClassName);
        assert_eq!(Locator::tag_name("h1").strategy, LocatorStrategy::TagName);
        assert_eq!(Locator::link_text("Sign out").strategy, LocatorStrategy::LinkText);
    }

    #[test]
    fn test_display_and_key_agree() {
        let locator = Locator::xpath("//button[contains(text(), 'Login')]");
        assert_eq!(locator.to_string(), locator.key());
        assert_eq!(locator.to_string(), "xpath=//button[contains(text(), 'Login')]");
    }

    #[test]
    fn test_serde_round_trip() {
        let locator = Locator::class_name("inventory_list");
        let json = serde_json::to_string(&locator).unwrap();
        let parsed: Locator = serde_json::from_str(&json).unwrap();
        assert_eq!(locator, parsed);
    }

    #[test]
    fn test_equality_covers_strategy() {
        // Same selector under different strategies is a different locator.
        assert_ne!(Locator::id("title"), Locator::class_name("title"));
    }
}
