//! HTTP API module for the test harness.
//!
//! This module provides the fluent REST client test code uses to exercise
//! API endpoints alongside browser flows. HTTP wire semantics are delegated
//! entirely to the wrapped client library.

pub mod client;

// Re-export commonly used types for convenience
pub use client::{ApiClient, ApiError, ApiResponse};
