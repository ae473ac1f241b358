//! Test helpers for generating unique test data
//!
//! This module provides utilities to help generate unique test data using a
//! process-wide counter to ensure test isolation and avoid conflicts between
//! test runs.

use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique string with the given prefix
///
/// # Arguments
/// * `prefix` - The prefix to use for the unique string
///
/// # Returns
/// A unique string in the format `{prefix}-{n}`
///
/// # Examples
/// ```
/// use engine_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("game");
/// let id2 = unique_str("game");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("game-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Generate a unique platform user id for registering test players.
pub fn unique_user_id() -> u64 {
    1_000_000 + COUNTER.fetch_add(1, Ordering::Relaxed)
}
