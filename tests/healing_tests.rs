//! Integration tests for the self-healing decoration point
//!
//! Tests for the decoration toggle, lookup recovery through the locator
//! history, and persistence of the history file.

use std::sync::Arc;
use webdriver_harness::config::HarnessSettings;
use webdriver_harness::harness::TestHarness;
use webdriver_harness::interact::Locator;
use webdriver_harness::session::{
    decorate, InMemoryLocatorMemory, JsonFileMemory, LocatorMemory, MockElement, MockSession,
    MockSessionFactory, SessionBackend, SessionError, WorkerId,
};

#[tokio::test]
async fn disabled_decoration_propagates_original_failure() {
    let memory = Arc::new(InMemoryLocatorMemory::new());
    memory.teach(&Locator::id("old"), Locator::id("new"));

    let raw = Arc::new(MockSession::chrome());
    raw.install(&Locator::id("new"), MockElement::visible());

    let session = decorate(
        Arc::clone(&raw) as Arc<dyn SessionBackend>,
        false,
        memory as Arc<dyn LocatorMemory>,
    );

    // No substitution happens: the original failure comes back unmodified.
    let err = session.lookup(&Locator::id("old")).await.unwrap_err();
    match err {
        SessionError::ElementNotFound(key) => assert_eq!(key, "id=old"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn enabled_decoration_recovers_through_history() {
    let memory = Arc::new(InMemoryLocatorMemory::new());
    memory.teach(&Locator::id("old"), Locator::id("new"));

    let raw = Arc::new(MockSession::chrome());
    raw.install(&Locator::id("new"), MockElement::visible().with_text("recovered"));

    let session = decorate(
        Arc::clone(&raw) as Arc<dyn SessionBackend>,
        true,
        memory as Arc<dyn LocatorMemory>,
    );

    assert_eq!(session.read_text(&Locator::id("old")).await.unwrap(), "recovered");
}

#[tokio::test]
async fn harness_applies_decoration_from_configuration() {
    // Default configuration: healing on.
    let harness = TestHarness::new(
        HarnessSettings::default(),
        Arc::new(MockSessionFactory::new()),
    );
    let session = harness.session(&WorkerId::new("w")).await.unwrap();
    assert!(session.healing_enabled());

    // Explicitly off: raw sessions all the way down.
    let harness = TestHarness::new(
        HarnessSettings::default().with_healing(false),
        Arc::new(MockSessionFactory::new()),
    );
    let session = harness.session(&WorkerId::new("w")).await.unwrap();
    assert!(!session.healing_enabled());
}

#[tokio::test]
async fn persisted_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locators.json");

    {
        let memory = JsonFileMemory::open(&path).unwrap();
        memory.teach(
            &Locator::id("checkout"),
            Locator::css("[data-test='checkout']"),
        );
    }

    let memory = Arc::new(JsonFileMemory::open(&path).unwrap());
    let raw = Arc::new(MockSession::chrome());
    raw.install(
        &Locator::css("[data-test='checkout']"),
        MockElement::visible(),
    );

    let session = decorate(
        raw as Arc<dyn SessionBackend>,
        true,
        memory as Arc<dyn LocatorMemory>,
    );

    session.click(&Locator::id("checkout")).await.unwrap();
}

#[tokio::test]
async fn decorated_and_plain_sessions_share_the_capability_interface() {
    // Callers depend only on the session capability, never on which variant
    // they hold.
    async fn drive(session: Arc<dyn SessionBackend>) -> String {
        session.read_text(&Locator::id("title")).await.unwrap()
    }

    let raw = Arc::new(MockSession::chrome());
    raw.install(&Locator::id("title"), MockElement::visible().with_text("plain"));
    assert_eq!(drive(raw).await, "plain");

    let inner = Arc::new(MockSession::chrome());
    inner.install(&Locator::id("title"), MockElement::visible().with_text("healed"));
    let wrapped = decorate(
        inner as Arc<dyn SessionBackend>,
        true,
        Arc::new(InMemoryLocatorMemory::new()) as Arc<dyn LocatorMemory>,
    );
    assert_eq!(drive(wrapped).await, "healed");
}
