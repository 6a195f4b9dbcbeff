//! Browser variant identification.
//!
//! The harness drives a closed set of browser families. Variant names arrive
//! as configuration strings (often with stray whitespace or mixed case) and
//! are normalized before dispatch; anything outside the known set fails
//! session acquisition with [`UnsupportedVariantError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when a requested browser name is not in the supported set.
///
/// Fatal to session acquisition; never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Browser not supported: {name}. Valid variants are: chrome, firefox, edge, safari")]
pub struct UnsupportedVariantError {
    /// The browser name as requested, before normalization.
    pub name: String,
}

impl UnsupportedVariantError {
    /// Creates an error for the given requested name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A specific browser engine family.
///
/// Dispatch over this set is closed: adding a variant means adding one enum
/// case and one descriptor entry, not a new implementation hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserVariant {
    /// Google Chrome / Chromium.
    Chrome,
    /// Mozilla Firefox.
    Firefox,
    /// Microsoft Edge.
    Edge,
    /// Apple Safari.
    Safari,
}

impl BrowserVariant {
    /// All supported variants, in dispatch order.
    pub const ALL: [BrowserVariant; 4] = [
        BrowserVariant::Chrome,
        BrowserVariant::Firefox,
        BrowserVariant::Edge,
        BrowserVariant::Safari,
    ];

    /// Canonical lowercase name of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserVariant::Chrome => "chrome",
            BrowserVariant::Firefox => "firefox",
            BrowserVariant::Edge => "edge",
            BrowserVariant::Safari => "safari",
        }
    }

    /// Name of the native driver binary for this variant.
    #[cfg(not(windows))]
    pub fn driver_binary(&self) -> &'static str {
        match self {
            BrowserVariant::Chrome => "chromedriver",
            BrowserVariant::Firefox => "geckodriver",
            BrowserVariant::Edge => "msedgedriver",
            BrowserVariant::Safari => "safaridriver",
        }
    }

    /// Name of the native driver binary for this variant.
    #[cfg(windows)]
    pub fn driver_binary(&self) -> &'static str {
        match self {
            BrowserVariant::Chrome => "chromedriver.exe",
            BrowserVariant::Firefox => "geckodriver.exe",
            BrowserVariant::Edge => "msedgedriver.exe",
            BrowserVariant::Safari => "safaridriver.exe",
        }
    }

    /// The `browserName` value used in W3C capabilities.
    pub fn capability_name(&self) -> &'static str {
        match self {
            BrowserVariant::Chrome => "chrome",
            BrowserVariant::Firefox => "firefox",
            BrowserVariant::Edge => "MicrosoftEdge",
            BrowserVariant::Safari => "safari",
        }
    }
}

impl std::fmt::Display for BrowserVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BrowserVariant {
    type Err = UnsupportedVariantError;

    /// Parses a variant name, ignoring surrounding whitespace and case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chrome" => Ok(BrowserVariant::Chrome),
            "firefox" => Ok(BrowserVariant::Firefox),
            "edge" => Ok(BrowserVariant::Edge),
            "safari" => Ok(BrowserVariant::Safari),
            _ => Err(UnsupportedVariantError::new(s)),
        }
    }
}
