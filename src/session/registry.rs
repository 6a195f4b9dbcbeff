//! Per-worker session registry.
//!
//! The registry owns at most one live session per worker. Acquisition is
//! idempotent: a second request from a worker that already holds a live
//! session returns that session unchanged. Sessions are exclusively owned by
//! the worker that acquired them; the registry partitions storage by worker
//! identity and provides no cross-worker access.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use webdriver_harness::session::{MockSessionFactory, SessionRegistry, WorkerId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = SessionRegistry::new(Arc::new(MockSessionFactory::new()));
//!     let worker = WorkerId::new("worker-1");
//!
//!     let session = registry.acquire(&worker, "chrome").await?;
//!     assert!(session.is_alive().await);
//!
//!     registry.release(&worker).await;
//!     assert!(registry.current(&worker).await.is_none());
//!     Ok(())
//! }
//! ```

use crate::session::backend::SessionBackend;
use crate::session::launch::{LaunchError, SessionFactory};
use crate::session::variant::BrowserVariant;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Identity of one test worker.
///
/// An explicit value rather than ambient thread state, so test glue can
/// inject fake identities and the registry never reads globals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkerId(String);

impl WorkerId {
    /// Creates a worker identity from an explicit name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derives a worker identity from the current OS thread.
    pub fn current_thread() -> Self {
        Self(format!("{:?}", std::thread::current().id()))
    }

    /// The identity as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Keyed store mapping each worker to its one live session.
///
/// The slot map is guarded by an async mutex held across session creation,
/// so acquisition is serialized and a worker can never end up with two live
/// sessions. A stored session that turns out dead (fatal backend error) is
/// cleared on the next access.
pub struct SessionRegistry {
    factory: Arc<dyn SessionFactory>,
    slots: Mutex<HashMap<WorkerId, Arc<dyn SessionBackend>>>,
}

impl SessionRegistry {
    /// Creates a registry that constructs sessions with the given factory.
    pub fn new(factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            factory,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the worker's session, creating one if none exists.
    ///
    /// The variant name is normalized (trimmed, case-insensitive); an
    /// unknown name fails with [`LaunchError::UnsupportedVariant`] and
    /// leaves the slot absent. If the worker already holds a live session it
    /// is returned unchanged, regardless of the variant requested.
    pub async fn acquire(
        &self,
        worker: &WorkerId,
        variant_name: &str,
    ) -> Result<Arc<dyn SessionBackend>, LaunchError> {
        let variant: BrowserVariant = variant_name.parse()?;

        let mut slots = self.slots.lock().await;

        if let Some(existing) = slots.get(worker) {
            if existing.is_alive().await {
                info!(%worker, session = %existing.id(), "Reusing existing session");
                return Ok(Arc::clone(existing));
            }
            warn!(%worker, "Stored session is no longer alive, clearing slot");
            slots.remove(worker);
        }

        let session = self.factory.create(variant).await?;
        info!(
            %worker,
            %variant,
            session = %session.id(),
            healing = session.healing_enabled(),
            "Session created"
        );
        slots.insert(worker.clone(), Arc::clone(&session));
        Ok(session)
    }

    /// Read-only lookup of the worker's session.
    ///
    /// Never creates. Returns `None` when the slot is empty or the stored
    /// session is dead (the dead slot is cleared).
    pub async fn current(&self, worker: &WorkerId) -> Option<Arc<dyn SessionBackend>> {
        let mut slots = self.slots.lock().await;
        match slots.get(worker) {
            Some(session) if session.is_alive().await => {
                debug!(%worker, session = %session.id(), "Session found");
                Some(Arc::clone(session))
            }
            Some(_) => {
                warn!(%worker, "Stored session is no longer alive, clearing slot");
                slots.remove(worker);
                None
            }
            None => {
                debug!(%worker, "No session for worker");
                None
            }
        }
    }

    /// Terminates the worker's session if present and clears the slot.
    ///
    /// Idempotent: releasing an empty slot is a no-op.
    pub async fn release(&self, worker: &WorkerId) {
        let session = self.slots.lock().await.remove(worker);
        match session {
            Some(session) => {
                if let Err(err) = session.close().await {
                    warn!(%worker, error = %err, "Session close reported an error");
                }
                info!(%worker, "Session released");
            }
            None => debug!(%worker, "Release on empty slot"),
        }
    }

    /// Releases every stored session. Intended for suite-level teardown.
    pub async fn release_all(&self) {
        let workers: Vec<WorkerId> = self.slots.lock().await.keys().cloned().collect();
        for worker in workers {
            self.release(&worker).await;
        }
    }

    /// Number of live slots currently stored.
    pub async fn active_count(&self) -> usize {
        self.slots.lock().await.len()
    }
}
