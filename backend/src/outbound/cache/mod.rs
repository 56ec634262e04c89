//! In-process enrichment cache.
//!
//! Entries live for the lifetime of the process and are never evicted. The
//! map sits behind a `std::sync::Mutex`; no call holds the lock across an
//! `.await`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::MergeNonNull;
use crate::domain::ports::EnrichmentCache;

/// Unbounded map-backed cache shared by concurrent imports.
#[derive(Debug)]
pub struct InMemoryEnrichmentCache<V> {
    entries: Mutex<HashMap<String, V>>,
}

impl<V> Default for InMemoryEnrichmentCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> InMemoryEnrichmentCache<V> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, V>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> EnrichmentCache<V> for InMemoryEnrichmentCache<V>
where
    V: Clone + MergeNonNull + Send + Sync,
{
    fn get(&self, key: &str) -> Option<V> {
        self.lock().get(key).cloned()
    }

    fn put(&self, key: &str, value: V) {
        self.lock().insert(key.to_owned(), value);
    }

    fn merge(&self, key: &str, value: V) {
        let mut entries = self.lock();
        match entries.get_mut(key) {
            Some(existing) => existing.merge_non_null(value),
            None => {
                entries.insert(key.to_owned(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EnrichmentRecord;

    #[test]
    fn merge_keeps_known_fields() {
        let cache = InMemoryEnrichmentCache::new();
        cache.merge(
            "Q1",
            EnrichmentRecord {
                description: Some("Gothic".to_owned()),
                ..EnrichmentRecord::default()
            },
        );
        cache.merge("Q1", EnrichmentRecord::default());

        let cached = cache.get("Q1").expect("entry present");
        assert_eq!(cached.description.as_deref(), Some("Gothic"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_replaces_entry() {
        let cache: InMemoryEnrichmentCache<Option<String>> = InMemoryEnrichmentCache::new();
        cache.put("Q1:fr", Some("Tour".to_owned()));
        cache.put("Q1:fr", None);

        assert_eq!(cache.get("Q1:fr"), Some(None));
        assert!(cache.get("Q1:en").is_none());
    }
}
