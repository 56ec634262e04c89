//! Driven port for process-wide enrichment caches.
//!
//! Keys are plain strings chosen by the caller: a normalized Wikidata id for
//! metadata, or `id:lang` for article lookups. Implementations decide the
//! eviction policy; the in-memory adapter never evicts.

use crate::domain::MergeNonNull;

/// Key/value cache shared by concurrent imports.
pub trait EnrichmentCache<V>: Send + Sync
where
    V: Clone + MergeNonNull + Send + Sync,
{
    /// Cached value for `key`, if any.
    fn get(&self, key: &str) -> Option<V>;

    /// Store `value`, replacing whatever was cached.
    fn put(&self, key: &str, value: V);

    /// Fold `value` into the cached entry without discarding known fields.
    fn merge(&self, key: &str, value: V);
}

/// Composite key for per-language article caches.
///
/// # Examples
/// ```
/// use backend::domain::ports::language_cache_key;
///
/// assert_eq!(language_cache_key("Q90", "fr"), "Q90:fr");
/// ```
pub fn language_cache_key(id: &str, language: &str) -> String {
    format!("{id}:{language}")
}
