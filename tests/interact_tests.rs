//! Integration tests for the interaction layer
//!
//! Timing-sensitive properties of the bounded-wait primitives: success
//! within the window, timeout bounds, the visibility check's non-error
//! timeout, and immediate propagation of fatal session errors.

use std::sync::Arc;
use std::time::{Duration, Instant};
use webdriver_harness::interact::{InteractError, Interactor, Locator, WaitPolicy};
use webdriver_harness::session::{MockElement, MockSession, SessionError};

const TIMEOUT: Duration = Duration::from_millis(300);
const POLL: Duration = Duration::from_millis(50);

/// Scheduling slack for wall-clock assertions on busy runners.
const SLACK: Duration = Duration::from_millis(200);

fn ui(session: Arc<MockSession>) -> Interactor {
    Interactor::new(session, WaitPolicy::new(TIMEOUT, POLL))
}

#[tokio::test]
async fn click_succeeds_when_element_appears_before_deadline() {
    let session = Arc::new(MockSession::chrome());
    // Appears on the third lookup, well inside the window.
    session.install(&Locator::id("login"), MockElement::visible().appearing_after(2));

    let ui = ui(Arc::clone(&session));
    let started = Instant::now();
    ui.click(&Locator::id("login")).await.unwrap();

    assert!(started.elapsed() < TIMEOUT);
    assert_eq!(session.click_count(&Locator::id("login")), 1);
}

#[tokio::test]
async fn click_timeout_bounds_on_missing_element() {
    let session = Arc::new(MockSession::chrome());
    let ui = ui(session);

    let started = Instant::now();
    let err = ui.click(&Locator::id("never")).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_timeout());
    // No earlier than the timeout, no later than one polling interval past
    // it (plus scheduling slack).
    assert!(elapsed >= TIMEOUT);
    assert!(elapsed < TIMEOUT + POLL + SLACK);
}

#[tokio::test]
async fn send_text_timeout_bounds_on_invisible_element() {
    let session = Arc::new(MockSession::chrome());
    session.install(&Locator::id("email"), MockElement::hidden());

    let ui = ui(session);
    let started = Instant::now();
    let err = ui.send_text(&Locator::id("email"), "abc").await.unwrap_err();

    assert!(err.is_timeout());
    assert!(started.elapsed() >= TIMEOUT);
}

#[tokio::test]
async fn is_visible_returns_false_within_bounded_time() {
    let session = Arc::new(MockSession::chrome());
    let ui = ui(session);

    let started = Instant::now();
    let visible = ui.is_visible(&Locator::id("never")).await.unwrap();
    let elapsed = started.elapsed();

    assert!(!visible);
    assert!(elapsed >= TIMEOUT);
    assert!(elapsed < TIMEOUT + POLL + SLACK);
}

#[tokio::test]
async fn typed_text_reads_back() {
    let session = Arc::new(MockSession::chrome());
    session.install(&Locator::id("search"), MockElement::visible());

    let ui = ui(session);
    ui.send_text(&Locator::id("search"), "abc123").await.unwrap();
    assert_eq!(ui.read_text(&Locator::id("search")).await.unwrap(), "abc123");
}

#[tokio::test]
async fn fatal_session_failure_aborts_wait_immediately() {
    let session = Arc::new(MockSession::chrome());
    session.install(&Locator::id("login"), MockElement::visible());
    session.kill("tab crashed");

    let ui = ui(session);
    let started = Instant::now();
    let err = ui.read_text(&Locator::id("login")).await.unwrap_err();

    assert!(matches!(
        err,
        InteractError::Session(SessionError::Fatal(_))
    ));
    // No polling after a terminal failure.
    assert!(started.elapsed() < POLL);
}

#[tokio::test]
async fn page_ready_timeout_is_swallowed() {
    let session = Arc::new(MockSession::chrome());
    session.set_ready_after(u32::MAX);

    let ui = ui(session);
    let started = Instant::now();
    ui.wait_for_page_ready().await.unwrap();

    assert!(started.elapsed() >= TIMEOUT);
}

#[tokio::test]
async fn page_ready_fatal_failure_escalates() {
    let session = Arc::new(MockSession::chrome());
    session.kill("browser gone");

    let ui = ui(session);
    let result = ui.wait_for_page_ready().await;
    assert!(matches!(
        result,
        Err(InteractError::Session(SessionError::Fatal(_)))
    ));
}

#[tokio::test]
async fn operations_on_one_session_are_strictly_ordered() {
    let session = Arc::new(MockSession::chrome());
    session.install(&Locator::id("email"), MockElement::visible());
    session.install(&Locator::id("password"), MockElement::visible());

    let ui = ui(Arc::clone(&session));
    ui.send_text(&Locator::id("email"), "a@b.c").await.unwrap();
    ui.send_text(&Locator::id("password"), "secret").await.unwrap();

    // Both writes landed, each on its own element.
    assert_eq!(
        session.element_value(&Locator::id("email")),
        Some("a@b.c".to_string())
    );
    assert_eq!(
        session.element_value(&Locator::id("password")),
        Some("secret".to_string())
    );
}
