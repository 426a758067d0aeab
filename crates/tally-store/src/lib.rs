//! # Tally Store
//!
//! Key-value store boundary for the Tally scoring service.
//!
//! The scoring engine talks to its store through the [`Store`] trait, which
//! models two distinct concerns:
//!
//! - **Persistent lookups** ([`Store::get`]): data the business logic cannot
//!   do without, such as precomputed client interests. Failures here surface
//!   to the caller.
//! - **Cache access** ([`Store::cache_get`] / [`Store::cache_set`]):
//!   memoized scores with a TTL. Callers are expected to treat failures as
//!   "value absent" and degrade gracefully.
//!
//! Two implementations are provided:
//!
//! - [`MemoryStore`]: an in-process store with per-entry TTL expiry, used
//!   for local runs and tests.
//! - [`RetryingStore`]: a decorator adding bounded retry on top of any
//!   other store, mirroring connect-on-demand backends that may need a few
//!   attempts before a connection sticks.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod memory;
mod retry;

pub use memory::MemoryStore;
pub use retry::RetryingStore;

use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors produced by a [`Store`] implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The key-value store boundary used by the scoring engine.
///
/// Implementations must be safe to share across concurrent request handlers;
/// the engine holds the store behind an `Arc<dyn Store>` and never retries
/// calls itself.
pub trait Store: Send + Sync {
    /// Looks up a persistent value by key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be reached. Callers treat
    /// this as fatal for the current request.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Looks up a cached numeric value by key.
    ///
    /// Expired or non-numeric entries read as absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be reached. Callers are
    /// expected to treat errors the same as an absent value.
    fn cache_get(&self, key: &str) -> StoreResult<Option<f64>>;

    /// Writes a numeric value to the cache with a time-to-live.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be reached. Cache writes
    /// are best-effort; callers log and continue.
    fn cache_set(&self, key: &str, value: f64, ttl: Duration) -> StoreResult<()>;

    /// Removes a key from the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be reached.
    fn delete(&self, key: &str) -> StoreResult<()>;
}
