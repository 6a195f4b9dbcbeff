//! Variant startup descriptors.
//!
//! A [`VariantDescriptor`] captures everything needed to start one browser
//! family: startup arguments, automation-detection countermeasures, and the
//! ordered driver-binary resolution strategies. The descriptor table is
//! immutable and built once per process; adding a browser variant means
//! adding one entry here.

use crate::session::variant::BrowserVariant;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// One step of the driver-binary resolution chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// Use the explicit driver path from configuration.
    ConfiguredPath,
    /// Scan the managed driver cache directory.
    ManagedCache,
    /// Drop any memoized resolution state and rescan the managed cache with
    /// an extended deadline.
    ClearCacheAndRescan {
        /// Deadline applied to the rescan.
        timeout: Duration,
    },
    /// Scan an alternate cache directory.
    AlternateCache(PathBuf),
    /// Search the host's `PATH` for the driver binary.
    HostPath,
}

impl std::fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionStrategy::ConfiguredPath => write!(f, "configured path"),
            ResolutionStrategy::ManagedCache => write!(f, "managed cache"),
            ResolutionStrategy::ClearCacheAndRescan { timeout } => {
                write!(f, "cleared-cache rescan ({}s)", timeout.as_secs())
            }
            ResolutionStrategy::AlternateCache(path) => {
                write!(f, "alternate cache {}", path.display())
            }
            ResolutionStrategy::HostPath => write!(f, "host PATH"),
        }
    }
}

/// Static startup description for one browser variant.
#[derive(Debug, Clone)]
pub struct VariantDescriptor {
    /// The variant this descriptor starts.
    pub variant: BrowserVariant,
    /// Arguments passed to the browser at startup.
    pub startup_args: Vec<&'static str>,
    /// Command-line switches stripped to suppress automation banners
    /// (Chromium-family only).
    pub exclude_switches: Vec<&'static str>,
    /// Disable the browser's automation extension (Chromium-family only).
    pub disable_automation_extension: bool,
    /// Suppress the automatic Web Inspector (Safari only).
    pub suppress_automatic_inspection: bool,
    /// Argument appended to run without a visible window.
    pub headless_arg: Option<&'static str>,
    /// Primary resolution strategies, tried in order.
    pub resolution: Vec<ResolutionStrategy>,
    /// Fallback strategies tried when every primary strategy fails.
    pub resolution_fallbacks: Vec<ResolutionStrategy>,
}

impl VariantDescriptor {
    /// Full resolution chain: primary strategies followed by fallbacks.
    pub fn resolution_chain(&self) -> impl Iterator<Item = &ResolutionStrategy> {
        self.resolution.iter().chain(self.resolution_fallbacks.iter())
    }

    /// Builds the W3C capability object for this variant.
    ///
    /// The vendor-specific options blob carries the startup arguments and
    /// the automation-detection countermeasures the way the browsers expect
    /// them.
    pub fn capabilities(&self, headless: bool) -> Value {
        let mut args: Vec<&str> = self.startup_args.clone();
        if headless {
            if let Some(arg) = self.headless_arg {
                args.push(arg);
            }
        }

        match self.variant {
            BrowserVariant::Chrome => json!({
                "browserName": self.variant.capability_name(),
                "goog:chromeOptions": {
                    "args": args,
                    "excludeSwitches": self.exclude_switches,
                    "useAutomationExtension": !self.disable_automation_extension,
                },
            }),
            BrowserVariant::Edge => json!({
                "browserName": self.variant.capability_name(),
                "ms:edgeOptions": {
                    "args": args,
                },
            }),
            BrowserVariant::Firefox => json!({
                "browserName": self.variant.capability_name(),
                "moz:firefoxOptions": {
                    "args": args,
                },
            }),
            BrowserVariant::Safari => json!({
                "browserName": self.variant.capability_name(),
                "safari:automaticInspection": !self.suppress_automatic_inspection,
            }),
        }
    }
}

/// Home directory of the current user, from the environment.
fn home_dir() -> PathBuf {
    #[cfg(windows)]
    let var = "USERPROFILE";
    #[cfg(not(windows))]
    let var = "HOME";

    env::var_os(var).map(PathBuf::from).unwrap_or_default()
}

/// Cache directory shared with other Selenium-based tooling, used as the
/// alternate resolution location.
fn selenium_cache_dir() -> PathBuf {
    home_dir().join(".cache").join("selenium")
}

static DESCRIPTORS: Lazy<HashMap<BrowserVariant, VariantDescriptor>> = Lazy::new(|| {
    let mut table = HashMap::new();

    table.insert(
        BrowserVariant::Chrome,
        VariantDescriptor {
            variant: BrowserVariant::Chrome,
            startup_args: vec![
                "--start-maximized",
                "--disable-blink-features=AutomationControlled",
            ],
            exclude_switches: vec!["enable-automation"],
            disable_automation_extension: true,
            suppress_automatic_inspection: false,
            headless_arg: Some("--headless=new"),
            resolution: vec![
                ResolutionStrategy::ConfiguredPath,
                ResolutionStrategy::ManagedCache,
            ],
            resolution_fallbacks: vec![],
        },
    );

    table.insert(
        BrowserVariant::Firefox,
        VariantDescriptor {
            variant: BrowserVariant::Firefox,
            startup_args: vec!["--start-maximized"],
            exclude_switches: vec![],
            disable_automation_extension: false,
            suppress_automatic_inspection: false,
            headless_arg: Some("-headless"),
            resolution: vec![
                ResolutionStrategy::ConfiguredPath,
                ResolutionStrategy::ManagedCache,
            ],
            resolution_fallbacks: vec![],
        },
    );

    // Edge driver downloads are the flakiest in practice, so it is the one
    // variant with a full fallback chain.
    table.insert(
        BrowserVariant::Edge,
        VariantDescriptor {
            variant: BrowserVariant::Edge,
            startup_args: vec!["--start-maximized"],
            exclude_switches: vec![],
            disable_automation_extension: false,
            suppress_automatic_inspection: false,
            headless_arg: Some("--headless=new"),
            resolution: vec![
                ResolutionStrategy::ConfiguredPath,
                ResolutionStrategy::ManagedCache,
            ],
            resolution_fallbacks: vec![
                ResolutionStrategy::ClearCacheAndRescan {
                    timeout: Duration::from_secs(120),
                },
                ResolutionStrategy::AlternateCache(selenium_cache_dir()),
                ResolutionStrategy::HostPath,
            ],
        },
    );

    table.insert(
        BrowserVariant::Safari,
        VariantDescriptor {
            variant: BrowserVariant::Safari,
            startup_args: vec![],
            exclude_switches: vec![],
            disable_automation_extension: false,
            suppress_automatic_inspection: true,
            headless_arg: None,
            resolution: vec![
                ResolutionStrategy::ConfiguredPath,
                ResolutionStrategy::ManagedCache,
            ],
            resolution_fallbacks: vec![],
        },
    );

    table
});

/// Returns the immutable descriptor for a variant.
pub fn descriptor(variant: BrowserVariant) -> &'static VariantDescriptor {
    DESCRIPTORS
        .get(&variant)
        .expect("descriptor table covers every variant")
}
