//! Driver binary resolution.
//!
//! Finding the native driver binary (chromedriver, geckodriver, msedgedriver,
//! safaridriver) is the flakiest step of session startup: caches go stale,
//! downloads get interrupted, and CI images differ. The resolver walks the
//! variant's strategy chain and, when everything fails, still yields the bare
//! command name so construction can proceed and surface the browser's own
//! error instead of a generic resolution failure.

use crate::session::descriptor::{descriptor, ResolutionStrategy};
use crate::session::variant::BrowserVariant;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default deadline for a single cache scan.
const SCAN_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum directory depth walked inside a cache location.
const SCAN_DEPTH: usize = 4;

/// Error raised when every resolution strategy for a variant failed.
///
/// Not fatal to session startup: the initializer logs it and constructs the
/// session against the bare command name anyway.
#[derive(Debug, Clone, Error)]
#[error("All driver resolution strategies failed for {variant}: tried {}", attempted.join(", "))]
pub struct DriverResolutionError {
    /// The variant whose driver could not be resolved.
    pub variant: BrowserVariant,
    /// Human-readable description of each attempted strategy.
    pub attempted: Vec<String>,
}

/// How a driver binary was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOrigin {
    /// Explicit path from configuration.
    Configured,
    /// Found in the managed cache directory.
    ManagedCache,
    /// Found after clearing memoized state and rescanning.
    ClearedCache,
    /// Found in an alternate cache location.
    AlternateCache,
    /// Found on the host's `PATH`.
    HostPath,
    /// Never resolved; the bare command name is used and the operating
    /// system's own lookup decides at spawn time.
    Unresolved,
}

/// Outcome of driver resolution: always a runnable program name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDriver {
    /// Program to spawn (absolute path, or bare command name when
    /// unresolved).
    pub program: PathBuf,
    /// How the program was located.
    pub origin: ResolutionOrigin,
}

impl ResolvedDriver {
    fn unresolved(variant: BrowserVariant) -> Self {
        Self {
            program: PathBuf::from(variant.driver_binary()),
            origin: ResolutionOrigin::Unresolved,
        }
    }
}

/// Resolves driver binaries for browser variants.
///
/// Resolution results are memoized per variant; the memo is dropped by the
/// cleared-cache fallback strategy and whenever a memoized path disappears
/// from disk. The cache directory is a shared filesystem resource that
/// concurrent workers may race on; the chain tolerates that by moving to the
/// next location instead of locking.
pub struct DriverResolver {
    cache_dir: PathBuf,
    configured_path: Option<PathBuf>,
    memo: RwLock<HashMap<BrowserVariant, PathBuf>>,
}

impl DriverResolver {
    /// Creates a resolver over the given managed cache directory.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            configured_path: None,
            memo: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a resolver from harness settings, falling back to the default
    /// cache directory.
    pub fn from_settings(settings: &crate::config::HarnessSettings) -> Self {
        let cache_dir = settings
            .driver_cache_dir
            .clone()
            .unwrap_or_else(default_cache_dir);
        Self {
            cache_dir,
            configured_path: settings.driver_path.clone(),
            memo: RwLock::new(HashMap::new()),
        }
    }

    /// Sets the explicit driver path override.
    pub fn with_configured_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.configured_path = Some(path.into());
        self
    }

    /// Drops the memoized resolution for a variant.
    pub fn clear_cached(&self, variant: BrowserVariant) {
        self.memo.write().remove(&variant);
    }

    /// Resolves the driver binary for a variant.
    ///
    /// Walks the variant's strategy chain; on total failure logs the
    /// accumulated [`DriverResolutionError`] and returns the bare command
    /// name so the caller can still attempt construction.
    pub fn resolve(&self, variant: BrowserVariant) -> ResolvedDriver {
        match self.resolve_strict(variant) {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(%variant, error = %err, "Driver resolution failed, deferring to host lookup at spawn");
                ResolvedDriver::unresolved(variant)
            }
        }
    }

    /// Resolves the driver binary, failing when every strategy misses.
    pub fn resolve_strict(
        &self,
        variant: BrowserVariant,
    ) -> Result<ResolvedDriver, DriverResolutionError> {
        let binary = variant.driver_binary();
        let mut attempted = Vec::new();

        for strategy in descriptor(variant).resolution_chain() {
            attempted.push(strategy.to_string());

            let found = match strategy {
                ResolutionStrategy::ConfiguredPath => self
                    .configured_path
                    .as_ref()
                    .filter(|path| path.is_file())
                    .map(|path| (path.clone(), ResolutionOrigin::Configured)),

                ResolutionStrategy::ManagedCache => self
                    .memoized(variant)
                    .or_else(|| scan_dir(&self.cache_dir, binary, SCAN_TIMEOUT))
                    .map(|path| (path, ResolutionOrigin::ManagedCache)),

                ResolutionStrategy::ClearCacheAndRescan { timeout } => {
                    self.clear_cached(variant);
                    scan_dir(&self.cache_dir, binary, *timeout)
                        .map(|path| (path, ResolutionOrigin::ClearedCache))
                }

                ResolutionStrategy::AlternateCache(dir) => scan_dir(dir, binary, SCAN_TIMEOUT)
                    .map(|path| (path, ResolutionOrigin::AlternateCache)),

                ResolutionStrategy::HostPath => {
                    let dirs: Vec<PathBuf> = env::var_os("PATH")
                        .map(|path| env::split_paths(&path).collect())
                        .unwrap_or_default();
                    search_path_dirs(&dirs, binary).map(|path| (path, ResolutionOrigin::HostPath))
                }
            };

            if let Some((path, origin)) = found {
                debug!(%variant, path = %path.display(), strategy = %strategy, "Driver binary resolved");
                self.memo.write().insert(variant, path.clone());
                return Ok(ResolvedDriver {
                    program: path,
                    origin,
                });
            }

            debug!(%variant, strategy = %strategy, "Driver resolution strategy missed");
        }

        Err(DriverResolutionError { variant, attempted })
    }

    /// Returns the memoized path if it still exists on disk.
    fn memoized(&self, variant: BrowserVariant) -> Option<PathBuf> {
        let memoized = self.memo.read().get(&variant).cloned();
        match memoized {
            Some(path) if path.is_file() => {
                info!(%variant, path = %path.display(), "Using memoized driver binary");
                Some(path)
            }
            Some(stale) => {
                debug!(%variant, path = %stale.display(), "Memoized driver binary vanished");
                self.clear_cached(variant);
                None
            }
            None => None,
        }
    }
}

/// Default managed cache directory for driver binaries.
pub fn default_cache_dir() -> PathBuf {
    #[cfg(windows)]
    let home = env::var_os("USERPROFILE").map(PathBuf::from).unwrap_or_default();
    #[cfg(not(windows))]
    let home = env::var_os("HOME").map(PathBuf::from).unwrap_or_default();

    home.join(".cache").join("webdriver-harness").join("drivers")
}

/// Searches an explicit list of directories for an executable binary.
fn search_path_dirs(dirs: &[PathBuf], binary: &str) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

/// Recursively scans a directory tree for an executable with the given name.
fn scan_dir(root: &Path, binary: &str, timeout: Duration) -> Option<PathBuf> {
    let deadline = Instant::now() + timeout;
    scan_dir_inner(root, binary, deadline, SCAN_DEPTH)
}

fn scan_dir_inner(dir: &Path, binary: &str, deadline: Instant, depth: usize) -> Option<PathBuf> {
    if Instant::now() >= deadline {
        return None;
    }

    let entries = fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();

    let target = std::ffi::OsStr::new(binary);
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name() == Some(target) && is_executable(&path) {
            return Some(path);
        }
    }

    if depth == 0 {
        return None;
    }

    subdirs
        .into_iter()
        .find_map(|subdir| scan_dir_inner(&subdir, binary, deadline, depth - 1))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.is_file()
        && fs::metadata(path)
            .map(|meta| meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
