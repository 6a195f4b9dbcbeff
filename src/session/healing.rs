//! Self-healing session decoration.
//!
//! A healing-wrapped session intercepts failed element lookups and retries
//! them with a substitute locator recalled from a history of previously
//! successful lookups. The matching algorithm itself is external: this
//! module only defines the interception boundary ([`HealingSession`]), the
//! history seam ([`LocatorMemory`]), and the configuration-driven toggle
//! ([`decorate`], default enabled).
//!
//! When no substitute is known, or the substitute also fails, the *original*
//! failure propagates unmodified.

use crate::interact::Locator;
use crate::session::backend::{ElementState, SelectBy, SessionBackend, SessionError};
use crate::session::launch::{LaunchError, SessionFactory};
use crate::session::variant::BrowserVariant;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// History of element lookups consulted during recovery.
///
/// This is the capability boundary to the external matching algorithm:
/// `recall` answers "what locator found a functionally equivalent element
/// before?", and `record` feeds successful lookups back into the history.
pub trait LocatorMemory: Send + Sync {
    /// Returns a historically successful substitute for a failed locator.
    fn recall(&self, failed: &Locator) -> Option<Locator>;

    /// Records a successful lookup.
    fn record(&self, locator: &Locator);
}

/// In-memory locator history, primarily for tests.
#[derive(Default)]
pub struct InMemoryLocatorMemory {
    substitutes: RwLock<HashMap<String, Locator>>,
    successes: RwLock<BTreeSet<String>>,
}

impl InMemoryLocatorMemory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a substitute for a locator, as the external matcher would.
    pub fn teach(&self, failed: &Locator, substitute: Locator) {
        self.substitutes.write().insert(failed.key(), substitute);
    }

    /// Whether a successful lookup has been recorded for the locator.
    pub fn recorded(&self, locator: &Locator) -> bool {
        self.successes.read().contains(&locator.key())
    }
}

impl LocatorMemory for InMemoryLocatorMemory {
    fn recall(&self, failed: &Locator) -> Option<Locator> {
        self.substitutes.read().get(&failed.key()).cloned()
    }

    fn record(&self, locator: &Locator) {
        self.successes.write().insert(locator.key());
    }
}

/// Errors from the persisted locator history.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The history file could not be read or written.
    #[error("Failed to access locator history: {0}")]
    Io(#[from] std::io::Error),

    /// The history file is not valid JSON.
    #[error("Failed to parse locator history: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    substitutes: HashMap<String, Locator>,
    #[serde(default)]
    successes: BTreeSet<String>,
}

/// Locator history persisted as a JSON file.
///
/// The file is loaded once at open and written through on every change.
/// Persistence failures are logged and swallowed: history is an aid, not a
/// correctness precondition.
pub struct JsonFileMemory {
    path: PathBuf,
    state: Mutex<HistoryFile>,
}

impl JsonFileMemory {
    /// Opens the history at `path`, creating an empty one if absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        let state = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            HistoryFile::default()
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Registers a substitute for a locator and persists the change.
    pub fn teach(&self, failed: &Locator, substitute: Locator) {
        let mut state = self.state.lock();
        state.substitutes.insert(failed.key(), substitute);
        self.persist(&state);
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, state: &HistoryFile) {
        let write = serde_json::to_string_pretty(state)
            .map_err(HistoryError::from)
            .and_then(|json| std::fs::write(&self.path, json).map_err(HistoryError::from));
        if let Err(err) = write {
            warn!(path = %self.path.display(), error = %err, "Failed to persist locator history");
        }
    }
}

impl LocatorMemory for JsonFileMemory {
    fn recall(&self, failed: &Locator) -> Option<Locator> {
        self.state.lock().substitutes.get(&failed.key()).cloned()
    }

    fn record(&self, locator: &Locator) {
        let mut state = self.state.lock();
        if state.successes.insert(locator.key()) {
            self.persist(&state);
        }
    }
}

/// Wraps a session so failed lookups are retried with recalled locators.
pub struct HealingSession {
    inner: Arc<dyn SessionBackend>,
    memory: Arc<dyn LocatorMemory>,
}

impl HealingSession {
    /// Wraps `inner`, consulting `memory` on lookup failures.
    pub fn new(inner: Arc<dyn SessionBackend>, memory: Arc<dyn LocatorMemory>) -> Self {
        Self { inner, memory }
    }

    /// Runs a locator-taking operation with one recovery attempt.
    async fn heal<T, F, Fut>(&self, locator: &Locator, op: F) -> Result<T, SessionError>
    where
        F: Fn(Locator) -> Fut,
        Fut: Future<Output = Result<T, SessionError>>,
    {
        match op(locator.clone()).await {
            Ok(value) => {
                self.memory.record(locator);
                Ok(value)
            }
            Err(original @ SessionError::ElementNotFound(_)) => {
                let Some(substitute) = self.memory.recall(locator) else {
                    debug!(%locator, "No healing substitute recorded");
                    return Err(original);
                };

                warn!(%locator, %substitute, "Lookup failed, retrying with healed locator");
                match op(substitute.clone()).await {
                    Ok(value) => {
                        info!(%locator, %substitute, "Healed lookup succeeded");
                        self.memory.record(&substitute);
                        Ok(value)
                    }
                    // The substitute did not help; surface the original
                    // failure, not the recovery attempt's.
                    Err(_) => Err(original),
                }
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl SessionBackend for HealingSession {
    fn id(&self) -> Uuid {
        self.inner.id()
    }

    fn variant(&self) -> BrowserVariant {
        self.inner.variant()
    }

    fn healing_enabled(&self) -> bool {
        true
    }

    async fn is_alive(&self) -> bool {
        self.inner.is_alive().await
    }

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        self.inner.navigate(url).await
    }

    async fn lookup(&self, locator: &Locator) -> Result<ElementState, SessionError> {
        self.heal(locator, |l| async move { self.inner.lookup(&l).await })
            .await
    }

    async fn click(&self, locator: &Locator) -> Result<(), SessionError> {
        self.heal(locator, |l| async move { self.inner.click(&l).await })
            .await
    }

    async fn clear(&self, locator: &Locator) -> Result<(), SessionError> {
        self.heal(locator, |l| async move { self.inner.clear(&l).await })
            .await
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> Result<(), SessionError> {
        self.heal(locator, |l| async move { self.inner.type_text(&l, text).await })
            .await
    }

    async fn read_text(&self, locator: &Locator) -> Result<String, SessionError> {
        self.heal(locator, |l| async move { self.inner.read_text(&l).await })
            .await
    }

    async fn read_value(&self, locator: &Locator) -> Result<Option<String>, SessionError> {
        self.heal(locator, |l| async move { self.inner.read_value(&l).await })
            .await
    }

    async fn select_option(&self, locator: &Locator, by: &SelectBy) -> Result<(), SessionError> {
        self.heal(locator, |l| async move { self.inner.select_option(&l, by).await })
            .await
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, SessionError> {
        self.inner.execute_script(script, args).await
    }

    async fn ready_state(&self) -> Result<bool, SessionError> {
        self.inner.ready_state().await
    }

    async fn title(&self) -> Result<String, SessionError> {
        self.inner.title().await
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        self.inner.current_url().await
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.inner.close().await
    }
}

/// Applies the healing decoration when enabled.
///
/// With `enabled == false` the raw session is returned unchanged, so failed
/// lookups propagate their original errors with no substitution.
pub fn decorate(
    session: Arc<dyn SessionBackend>,
    enabled: bool,
    memory: Arc<dyn LocatorMemory>,
) -> Arc<dyn SessionBackend> {
    if enabled {
        Arc::new(HealingSession::new(session, memory))
    } else {
        session
    }
}

/// Factory wrapper that decorates every created session.
pub struct HealingFactory {
    inner: Arc<dyn SessionFactory>,
    memory: Arc<dyn LocatorMemory>,
    enabled: bool,
}

impl HealingFactory {
    /// Wraps `inner` so each created session is decorated per `enabled`.
    pub fn new(
        inner: Arc<dyn SessionFactory>,
        memory: Arc<dyn LocatorMemory>,
        enabled: bool,
    ) -> Self {
        Self {
            inner,
            memory,
            enabled,
        }
    }
}

#[async_trait]
impl SessionFactory for HealingFactory {
    async fn create(
        &self,
        variant: BrowserVariant,
    ) -> Result<Arc<dyn SessionBackend>, LaunchError> {
        let raw = self.inner.create(variant).await?;
        Ok(decorate(raw, self.enabled, Arc::clone(&self.memory)))
    }
}
