//! In-memory store with TTL expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::{Store, StoreResult};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    /// `None` means the entry never expires.
    deadline: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

/// An in-process key-value store with per-entry TTL expiry.
///
/// Used for local runs and tests in place of an external cache service.
/// Entries written through [`MemoryStore::insert`] never expire; entries
/// written through [`Store::cache_set`] expire after their TTL.
///
/// # Example
///
/// ```
/// use tally_store::{MemoryStore, Store};
///
/// let store = MemoryStore::new();
/// store.insert("i:1", r#"["books", "travel"]"#);
/// assert_eq!(store.get("i:1").unwrap().as_deref(), Some(r#"["books", "travel"]"#));
/// assert_eq!(store.get("i:2").unwrap(), None);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a persistent (non-expiring) value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.lock().insert(
            key.into(),
            Entry {
                value: value.into(),
                deadline: None,
            },
        );
    }

    fn read(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.read(key))
    }

    fn cache_get(&self, key: &str) -> StoreResult<Option<f64>> {
        // A non-numeric entry reads as absent, matching cache semantics.
        Ok(self.read(key).and_then(|raw| raw.parse::<f64>().ok()))
    }

    fn cache_set(&self, key: &str, value: f64, ttl: Duration) -> StoreResult<()> {
        self.entries.lock().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                deadline: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
