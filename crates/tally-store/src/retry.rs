//! Bounded-retry store decorator.

use std::time::Duration;

use crate::{Store, StoreError, StoreResult};

/// Default number of attempts per operation.
pub const DEFAULT_ATTEMPTS: usize = 10;

/// A [`Store`] decorator that retries failed operations a bounded number of
/// times.
///
/// This mirrors connect-on-demand backends where the first few calls after a
/// network blip fail and then recover. Retry lives here, at the store
/// boundary, so the scoring engine itself never retries.
///
/// # Example
///
/// ```
/// use tally_store::{MemoryStore, RetryingStore, Store};
///
/// let store = RetryingStore::new(MemoryStore::new()).with_attempts(3);
/// assert_eq!(store.get("missing").unwrap(), None);
/// ```
#[derive(Debug)]
pub struct RetryingStore<S> {
    inner: S,
    attempts: usize,
}

impl<S: Store> RetryingStore<S> {
    /// Wraps a store with the default attempt bound.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            attempts: DEFAULT_ATTEMPTS,
        }
    }

    /// Overrides the attempt bound. A bound of zero is clamped to one.
    #[must_use]
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Returns a reference to the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn run<T>(&self, op: &str, mut call: impl FnMut(&S) -> StoreResult<T>) -> StoreResult<T> {
        let mut last_err = None;
        for attempt in 1..=self.attempts {
            match call(&self.inner) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    tracing::warn!(op, attempt, error = %err, "store operation failed");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| StoreError::Unavailable("no attempts made".into())))
    }
}

impl<S: Store> Store for RetryingStore<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.run("get", |store| store.get(key))
    }

    fn cache_get(&self, key: &str) -> StoreResult<Option<f64>> {
        self.run("cache_get", |store| store.cache_get(key))
    }

    fn cache_set(&self, key: &str, value: f64, ttl: Duration) -> StoreResult<()> {
        self.run("cache_set", |store| store.cache_set(key, value, ttl))
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.run("delete", |store| store.delete(key))
    }
}
