//! Bounded-wait policy.
//!
//! Every blocking interaction polls its precondition at a fixed short
//! interval until a process-wide deadline. The first success within the
//! window wins; transient failures (element missing, not yet interactable)
//! keep polling; a fatal session failure aborts the wait immediately.

use crate::config::HarnessSettings;
use crate::session::backend::SessionError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Errors surfaced by the interaction layer.
#[derive(Debug, Clone, Error)]
pub enum InteractError {
    /// A wait-based primitive never observed its precondition within the
    /// timeout.
    #[error("Timed out after {timeout:?} waiting for {subject}")]
    Timeout {
        /// What was being waited for (locator key or readiness signal).
        subject: String,
        /// The effective wait timeout.
        timeout: Duration,
    },

    /// The underlying session failed terminally mid-interaction.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl InteractError {
    /// Returns true if this is a wait timeout rather than a session failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, InteractError::Timeout { .. })
    }
}

/// Process-wide timeout and polling interval for bounded waits.
///
/// Configured once from the [`HarnessSettings`] and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Maximum time a blocking interaction may wait.
    pub timeout: Duration,
    /// Fixed interval between polls.
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl WaitPolicy {
    /// Creates a policy with an explicit timeout and polling interval.
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Builds the policy from harness settings.
    pub fn from_settings(settings: &HarnessSettings) -> Self {
        Self {
            timeout: settings.wait_timeout(),
            poll_interval: settings.poll_interval(),
        }
    }

    /// Polls `attempt` until it succeeds or the deadline elapses.
    ///
    /// Transient errors keep the loop polling; any non-transient error
    /// propagates immediately. After the deadline a final transient failure
    /// becomes [`InteractError::Timeout`], so the total wall-clock time is
    /// bounded by `timeout + poll_interval`.
    pub async fn wait_until<T, F, Fut>(&self, subject: &str, attempt: F) -> Result<T, InteractError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, SessionError>>,
    {
        let deadline = Instant::now() + self.timeout;

        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => {}
                Err(fatal) => return Err(InteractError::Session(fatal)),
            }

            if Instant::now() >= deadline {
                return Err(InteractError::Timeout {
                    subject: subject.to_string(),
                    timeout: self.timeout,
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> WaitPolicy {
        WaitPolicy::new(Duration::from_millis(200), Duration::from_millis(20))
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let policy = fast_policy();
        let attempts = AtomicU32::new(0);
        let attempts = &attempts;

        let value = policy
            .wait_until("counter", || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok::<_, SessionError>(42)
            })
            .await
            .unwrap();

        assert_eq!(value, 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let policy = fast_policy();
        let attempts = AtomicU32::new(0);
        let attempts = &attempts;

        let value = policy
            .wait_until("counter", || async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 3 {
                    Err(SessionError::ElementNotFound("id=late".to_string()))
                } else {
                    Ok("found")
                }
            })
            .await
            .unwrap();

        assert_eq!(value, "found");
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_timeout_within_one_extra_interval() {
        let policy = fast_policy();
        let started = std::time::Instant::now();

        let result: Result<(), _> = policy
            .wait_until("id=never", || async move {
                Err(SessionError::ElementNotFound("id=never".to_string()))
            })
            .await;

        let elapsed = started.elapsed();
        let err = result.unwrap_err();
        assert!(err.is_timeout());
        assert!(elapsed >= policy.timeout);
        // One polling interval of slack plus scheduling noise.
        assert!(elapsed < policy.timeout + policy.poll_interval + Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_fatal_error_aborts_immediately() {
        let policy = fast_policy();
        let started = std::time::Instant::now();
        let attempts = AtomicU32::new(0);
        let attempts = &attempts;

        let result: Result<(), _> = policy
            .wait_until("id=x", || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(SessionError::Fatal("browser crashed".to_string()))
            })
            .await;

        assert!(matches!(
            result,
            Err(InteractError::Session(SessionError::Fatal(_)))
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < policy.timeout);
    }

    #[test]
    fn test_policy_from_settings() {
        let settings = HarnessSettings::default()
            .with_wait_timeout_secs(20)
            .with_poll_interval_ms(100);

        let policy = WaitPolicy::from_settings(&settings);
        assert_eq!(policy.timeout, Duration::from_secs(20));
        assert_eq!(policy.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_default_policy_matches_config_defaults() {
        let policy = WaitPolicy::default();
        assert_eq!(policy, WaitPolicy::from_settings(&HarnessSettings::default()));
    }
}
