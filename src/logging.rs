//! Logging bootstrap for test runs.

use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber for a test run.
///
/// Honors `RUST_LOG` overrides, falling back to `info`. Logs go to stderr in
/// compact form so they interleave cleanly with test runner output. Safe to
/// call more than once; only the first call installs a subscriber.
pub fn init() {
    init_with_default("info");
}

/// Initializes logging with an explicit default filter directive.
pub fn init_with_default(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(stderr)
        .with_target(true)
        .with_level(true)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        init_with_default("debug");
    }
}
