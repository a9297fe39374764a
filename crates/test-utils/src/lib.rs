//! Shared test utilities for the ParkPal workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Upstream response bodies and payload builders
//! - A mock upstream HTTP server on an ephemeral port
//! - Scripted ride/weather sources and a failing durable tier
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your integration tests:
//!
//! ```ignore
//! use test_utils::{fixtures, FakeRides, Scripted};
//! ```

pub mod fakes;
pub mod fixtures;
pub mod server;

// Re-export commonly used items at the crate root
pub use fakes::*;
pub use fixtures::*;
pub use server::*;

/// Assert that a payload's `errors` list is exactly the given tokens, in
/// any order.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_error_tokens;
///
/// assert_error_tokens!(payload, ["park_6_HTTP_500", "weather_timeout"]);
/// assert_error_tokens!(payload, []);
/// ```
#[macro_export]
macro_rules! assert_error_tokens {
    ($payload:expr, [$($token:expr),* $(,)?]) => {{
        let mut actual: Vec<String> = $payload.errors.clone();
        let mut expected: Vec<String> = vec![$($token.to_string()),*];
        actual.sort();
        expected.sort();
        if actual != expected {
            panic!(
                "error tokens differ\n  actual: `{:?}`,\n expected: `{:?}`",
                actual, expected
            );
        }
    }};
}
