//! Integration tests for the session lifecycle
//!
//! Tests for per-worker session acquisition, idempotent reuse, variant
//! validation, and teardown, exercised through the public crate API.

use std::sync::Arc;
use webdriver_harness::session::{
    BrowserVariant, LaunchError, MockSessionFactory, SessionRegistry, WorkerId,
};

fn registry() -> SessionRegistry {
    SessionRegistry::new(Arc::new(MockSessionFactory::new()))
}

#[tokio::test]
async fn acquire_twice_then_release_scenario() -> anyhow::Result<()> {
    // Scenario: acquire "chrome" twice from the same worker, second call
    // returns the same handle, release, then current reports absent.
    let registry = registry();
    let worker = WorkerId::new("worker-1");

    let first = registry.acquire(&worker, "chrome").await?;
    let second = registry.acquire(&worker, "chrome").await?;
    assert_eq!(first.id(), second.id());

    registry.release(&worker).await;
    assert!(registry.current(&worker).await.is_none());
    Ok(())
}

#[tokio::test]
async fn acquire_bogus_variant_scenario() {
    // Scenario: acquire "bogus" fails with an unsupported-variant error and
    // the registry slot remains absent.
    let registry = registry();
    let worker = WorkerId::new("worker-1");

    let result = registry.acquire(&worker, "bogus").await;
    assert!(matches!(result, Err(LaunchError::UnsupportedVariant(_))));
    assert!(registry.current(&worker).await.is_none());
}

#[tokio::test]
async fn all_supported_variants_acquire_live_sessions() {
    let registry = registry();

    for (index, name) in ["chrome", " FIREFOX ", "Edge", "safari\n"].iter().enumerate() {
        let worker = WorkerId::new(format!("worker-{index}"));
        let session = registry.acquire(&worker, name).await.unwrap();
        assert!(session.is_alive().await);
    }

    assert_eq!(registry.active_count().await, 4);
}

#[tokio::test]
async fn variant_identity_is_preserved_on_the_session() {
    let registry = registry();

    let session = registry
        .acquire(&WorkerId::new("w"), "firefox")
        .await
        .unwrap();
    assert_eq!(session.variant(), BrowserVariant::Firefox);
}

#[tokio::test]
async fn current_does_not_create_sessions() {
    let registry = registry();
    let worker = WorkerId::new("worker-1");

    assert!(registry.current(&worker).await.is_none());
    assert_eq!(registry.active_count().await, 0);
}

#[tokio::test]
async fn workers_never_share_sessions() {
    let registry = registry();

    let a = registry.acquire(&WorkerId::new("a"), "chrome").await.unwrap();
    let b = registry.acquire(&WorkerId::new("b"), "chrome").await.unwrap();
    assert_ne!(a.id(), b.id());

    // Releasing one worker leaves the other untouched.
    registry.release(&WorkerId::new("a")).await;
    assert!(registry.current(&WorkerId::new("a")).await.is_none());
    assert!(registry.current(&WorkerId::new("b")).await.is_some());
}

#[tokio::test]
async fn concurrent_acquisition_from_distinct_workers() {
    let registry = Arc::new(registry());

    let mut handles = Vec::new();
    for index in 0..8 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            let worker = WorkerId::new(format!("worker-{index}"));
            let session = registry.acquire(&worker, "chrome").await.unwrap();
            session.id()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert_eq!(registry.active_count().await, 8);
}

#[tokio::test]
async fn crashed_session_slot_cleared_on_next_access() {
    let registry = registry();
    let worker = WorkerId::new("worker-1");

    let session = registry.acquire(&worker, "chrome").await.unwrap();
    session.close().await.unwrap();

    assert!(registry.current(&worker).await.is_none());

    let replacement = registry.acquire(&worker, "chrome").await.unwrap();
    assert_ne!(replacement.id(), session.id());
}
