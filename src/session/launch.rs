//! Session construction seam.
//!
//! A [`SessionFactory`] turns a browser variant into a live session. The real
//! factory (behind the `webdriver` feature) spawns a driver process and
//! connects over the WebDriver protocol; tests substitute a mock factory.
//! [`LaunchPlan`] is the pure front half of construction: driver resolution
//! plus capability assembly, with no process or network side effects.

use crate::config::HarnessSettings;
use crate::session::backend::SessionBackend;
use crate::session::descriptor::descriptor;
use crate::session::resolver::{DriverResolver, ResolvedDriver};
use crate::session::variant::{BrowserVariant, UnsupportedVariantError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while constructing a session.
#[derive(Debug, Clone, Error)]
pub enum LaunchError {
    /// The requested browser name is not in the supported set.
    #[error(transparent)]
    UnsupportedVariant(#[from] UnsupportedVariantError),

    /// The driver process could not be spawned.
    #[error("Failed to spawn driver process '{program}': {message}")]
    Spawn {
        /// Program that was spawned.
        program: String,
        /// Underlying error text.
        message: String,
    },

    /// The driver process started but no WebDriver connection could be
    /// established.
    #[error("Failed to connect to driver at {url}: {message}")]
    Connect {
        /// Driver endpoint URL.
        url: String,
        /// Underlying error text.
        message: String,
    },

    /// The assembled capability object was rejected by the protocol client.
    #[error("Invalid session capabilities: {0}")]
    InvalidCapabilities(String),
}

/// Constructs sessions for browser variants.
///
/// The factory is the injection point for both the real WebDriver-backed
/// construction and test doubles; the registry depends only on this trait.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Starts a new raw session for the variant.
    async fn create(
        &self,
        variant: BrowserVariant,
    ) -> Result<Arc<dyn SessionBackend>, LaunchError>;
}

/// Everything needed to start a variant, computed before any side effect.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    /// Variant being started.
    pub variant: BrowserVariant,
    /// Resolved driver program (always runnable, possibly a bare command
    /// name when resolution failed).
    pub driver: ResolvedDriver,
    /// W3C capability object for the new session.
    pub capabilities: Value,
}

impl LaunchPlan {
    /// Prepares a launch plan: resolves the driver binary through the
    /// variant's strategy chain and assembles startup capabilities.
    ///
    /// Resolution failure does not fail the plan; the bare command name is
    /// carried forward so construction surfaces the downstream error.
    pub fn prepare(
        variant: BrowserVariant,
        settings: &HarnessSettings,
        resolver: &DriverResolver,
    ) -> Self {
        let driver = resolver.resolve(variant);
        let capabilities = descriptor(variant).capabilities(settings.headless);

        Self {
            variant,
            driver,
            capabilities,
        }
    }
}
