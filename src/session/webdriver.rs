//! WebDriver-protocol session implementation.
//!
//! This module provides a real session implementation using thirtyfour,
//! which drives browsers over the W3C WebDriver protocol. The factory spawns
//! the variant's native driver binary on an ephemeral port and connects to
//! it; wire semantics are delegated entirely to the wrapped library.

use crate::config::HarnessSettings;
use crate::interact::{Locator, LocatorStrategy};
use crate::session::backend::{ElementState, SelectBy, SessionBackend, SessionError};
use crate::session::launch::{LaunchError, LaunchPlan, SessionFactory};
use crate::session::resolver::DriverResolver;
use crate::session::variant::BrowserVariant;
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Attempts made to connect to a freshly spawned driver process.
const CONNECT_ATTEMPTS: u32 = 20;

/// Delay between connection attempts.
const CONNECT_BACKOFF: Duration = Duration::from_millis(250);

/// Converts a harness locator into a thirtyfour `By`.
fn to_by(locator: &Locator) -> By {
    let selector = locator.selector.as_str();
    match locator.strategy {
        LocatorStrategy::Id => By::Id(selector),
        LocatorStrategy::Css => By::Css(selector),
        LocatorStrategy::XPath => By::XPath(selector),
        LocatorStrategy::Name => By::Name(selector),
        LocatorStrategy::ClassName => By::ClassName(selector),
        LocatorStrategy::TagName => By::Tag(selector),
        LocatorStrategy::LinkText => By::LinkText(selector),
    }
}

/// Classifies a wire-level error into the session error taxonomy.
///
/// The W3C error names are stable across drivers even where client enum
/// shapes are not, so classification keys off the standard message text.
fn classify(err: WebDriverError) -> SessionError {
    classify_message(err.to_string())
}

fn classify_message(text: String) -> SessionError {
    let lower = text.to_lowercase();

    if lower.contains("no such element") {
        SessionError::ElementNotFound(text)
    } else if lower.contains("not interactable")
        || lower.contains("click intercepted")
        || lower.contains("stale element")
    {
        SessionError::NotInteractable(text)
    } else if lower.contains("javascript error") || lower.contains("script timeout") {
        SessionError::Script(text)
    } else {
        SessionError::Fatal(text)
    }
}

/// Binds an ephemeral port and releases it for the driver process to take.
fn pick_free_port() -> std::io::Result<u16> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}

/// Port argument in the form the variant's driver binary expects.
fn port_arg(variant: BrowserVariant, port: u16) -> Vec<String> {
    match variant {
        // safaridriver only understands `-p <port>`.
        BrowserVariant::Safari => vec!["-p".to_string(), port.to_string()],
        _ => vec![format!("--port={port}")],
    }
}

/// A session driving a real browser over the WebDriver protocol.
pub struct WebDriverSession {
    id: Uuid,
    variant: BrowserVariant,
    driver: RwLock<Option<WebDriver>>,
    child: Mutex<Option<Child>>,
    alive: parking_lot::RwLock<bool>,
}

impl WebDriverSession {
    fn new(variant: BrowserVariant, driver: WebDriver, child: Option<Child>) -> Self {
        Self {
            id: Uuid::new_v4(),
            variant,
            driver: RwLock::new(Some(driver)),
            child: Mutex::new(child),
            alive: parking_lot::RwLock::new(true),
        }
    }

    /// Maps a wire error, marking the session dead on fatal failures so the
    /// registry clears the slot on its next access.
    fn note(&self, err: WebDriverError) -> SessionError {
        let mapped = classify(err);
        if matches!(mapped, SessionError::Fatal(_)) {
            *self.alive.write() = false;
        }
        mapped
    }

    fn closed(&self) -> SessionError {
        SessionError::Fatal("session is closed".to_string())
    }
}

#[async_trait]
impl SessionBackend for WebDriverSession {
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
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or_else(|| self.closed())?;
        driver.goto(url).await.map_err(|err| self.note(err))
    }

    async fn lookup(&self, locator: &Locator) -> Result<ElementState, SessionError> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or_else(|| self.closed())?;

        let element = driver
            .find(to_by(locator))
            .await
            .map_err(|err| self.note(err))?;
        let is_visible = element.is_displayed().await.map_err(|err| self.note(err))?;
        let is_enabled = element.is_enabled().await.map_err(|err| self.note(err))?;
        Ok(ElementState {
            is_visible,
            is_enabled,
        })
    }

    async fn click(&self, locator: &Locator) -> Result<(), SessionError> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or_else(|| self.closed())?;

        let element = driver
            .find(to_by(locator))
            .await
            .map_err(|err| self.note(err))?;
        element.click().await.map_err(|err| self.note(err))
    }

    async fn clear(&self, locator: &Locator) -> Result<(), SessionError> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or_else(|| self.closed())?;

        let element = driver
            .find(to_by(locator))
            .await
            .map_err(|err| self.note(err))?;
        element.clear().await.map_err(|err| self.note(err))
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> Result<(), SessionError> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or_else(|| self.closed())?;

        let element = driver
            .find(to_by(locator))
            .await
            .map_err(|err| self.note(err))?;
        element.send_keys(text).await.map_err(|err| self.note(err))
    }

    async fn read_text(&self, locator: &Locator) -> Result<String, SessionError> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or_else(|| self.closed())?;

        let element = driver
            .find(to_by(locator))
            .await
            .map_err(|err| self.note(err))?;
        element.text().await.map_err(|err| self.note(err))
    }

    async fn read_value(&self, locator: &Locator) -> Result<Option<String>, SessionError> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or_else(|| self.closed())?;

        let element = driver
            .find(to_by(locator))
            .await
            .map_err(|err| self.note(err))?;
        element.attr("value").await.map_err(|err| self.note(err))
    }

    async fn select_option(&self, locator: &Locator, by: &SelectBy) -> Result<(), SessionError> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or_else(|| self.closed())?;

        let select = driver
            .find(to_by(locator))
            .await
            .map_err(|err| self.note(err))?;

        let option_by = match by {
            SelectBy::VisibleText(text) => {
                By::XPath(format!(".//option[normalize-space(.)='{}']", text))
            }
            SelectBy::Value(value) => By::Css(format!("option[value='{}']", value)),
        };

        let option = select.find(option_by).await.map_err(|err| self.note(err))?;
        option.click().await.map_err(|err| self.note(err))
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, SessionError> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or_else(|| self.closed())?;

        let ret = driver
            .execute(script, args)
            .await
            .map_err(|err| self.note(err))?;
        Ok(ret.json().clone())
    }

    async fn ready_state(&self) -> Result<bool, SessionError> {
        let state = self
            .execute_script("return document.readyState", Vec::new())
            .await?;
        Ok(state.as_str() == Some("complete"))
    }

    async fn title(&self) -> Result<String, SessionError> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or_else(|| self.closed())?;
        driver.title().await.map_err(|err| self.note(err))
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        let guard = self.driver.read().await;
        let driver = guard.as_ref().ok_or_else(|| self.closed())?;
        driver
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(|err| self.note(err))
    }

    async fn close(&self) -> Result<(), SessionError> {
        *self.alive.write() = false;

        if let Some(driver) = self.driver.write().await.take() {
            if let Err(err) = driver.quit().await {
                warn!(session = %self.id, error = %err, "WebDriver quit reported an error");
            }
        }

        if let Some(mut child) = self.child.lock().await.take() {
            if let Err(err) = child.kill().await {
                warn!(session = %self.id, error = %err, "Failed to kill driver process");
            }
        }

        Ok(())
    }
}

/// Factory that starts driver processes and connects WebDriver sessions.
pub struct WebDriverFactory {
    settings: HarnessSettings,
    resolver: DriverResolver,
}

impl WebDriverFactory {
    /// Creates a factory over the given settings.
    pub fn new(settings: HarnessSettings) -> Self {
        let resolver = DriverResolver::from_settings(&settings);
        Self { settings, resolver }
    }

    async fn connect(&self, url: &str, capabilities: Capabilities) -> Result<WebDriver, LaunchError> {
        let mut last_error = String::new();

        for attempt in 1..=CONNECT_ATTEMPTS {
            match WebDriver::new(url, capabilities.clone()).await {
                Ok(driver) => return Ok(driver),
                Err(err) => {
                    debug!(url, attempt, error = %err, "Driver not ready yet");
                    last_error = err.to_string();
                }
            }
            tokio::time::sleep(CONNECT_BACKOFF).await;
        }

        Err(LaunchError::Connect {
            url: url.to_string(),
            message: last_error,
        })
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    async fn create(
        &self,
        variant: BrowserVariant,
    ) -> Result<Arc<dyn SessionBackend>, LaunchError> {
        let plan = LaunchPlan::prepare(variant, &self.settings, &self.resolver);

        let port = pick_free_port().map_err(|err| LaunchError::Spawn {
            program: plan.driver.program.display().to_string(),
            message: err.to_string(),
        })?;

        let mut command = Command::new(&plan.driver.program);
        command
            .args(port_arg(variant, port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|err| LaunchError::Spawn {
            program: plan.driver.program.display().to_string(),
            message: err.to_string(),
        })?;

        info!(
            %variant,
            driver = %plan.driver.program.display(),
            origin = ?plan.driver.origin,
            port,
            "Driver process started"
        );

        let capabilities: Capabilities = serde_json::from_value(plan.capabilities.clone())
            .map_err(|err| LaunchError::InvalidCapabilities(err.to_string()))?;

        let url = format!("http://127.0.0.1:{port}");
        let driver = self.connect(&url, capabilities).await?;

        // Browsers without a maximize startup argument get the command
        // equivalent instead.
        if !self.settings.headless && variant == BrowserVariant::Safari {
            if let Err(err) = driver.maximize_window().await {
                warn!(%variant, error = %err, "Window maximize failed");
            }
        }

        info!(%variant, url, "WebDriver session established");
        Ok(Arc::new(WebDriverSession::new(variant, driver, Some(child))))
    }
}
