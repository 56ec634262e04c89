//! Batched knowledge-base metadata enrichment.
//!
//! Ids are normalized and de-duplicated, cache hits are served locally, and
//! the remainder is fetched in fixed-size batches with one query per batch.
//! A failed batch leaves its ids with all-null records and never aborts the
//! other batches.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::{EnrichmentCache, KnowledgeBaseSource};
use super::{EnrichmentRecord, WikidataId};

/// Number of ids resolved by one knowledge-base query.
pub const METADATA_BATCH_SIZE: usize = 50;

/// Service resolving descriptions, images, and article links per entity.
#[derive(Clone)]
pub struct MetadataEnricher {
    source: Arc<dyn KnowledgeBaseSource>,
    cache: Arc<dyn EnrichmentCache<EnrichmentRecord>>,
    batch_size: usize,
}

impl MetadataEnricher {
    /// Build an enricher with the default batch size.
    pub fn new(
        source: Arc<dyn KnowledgeBaseSource>,
        cache: Arc<dyn EnrichmentCache<EnrichmentRecord>>,
    ) -> Self {
        Self {
            source,
            cache,
            batch_size: METADATA_BATCH_SIZE,
        }
    }

    /// Override the batch size (minimum 1).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Resolve metadata for `ids`.
    ///
    /// Every valid id appears in the result, with all-null fields when nothing
    /// is known. `on_progress(processed, total)` runs after each batch, counted
    /// in ids.
    pub async fn enrich<S, F>(
        &self,
        ids: &[S],
        mut on_progress: F,
    ) -> HashMap<WikidataId, EnrichmentRecord>
    where
        S: AsRef<str> + Sync,
        F: FnMut(usize, usize) + Send,
    {
        let unique = normalize_ids(ids);
        let total = unique.len();
        let mut results = HashMap::with_capacity(total);
        let mut to_fetch = Vec::new();

        for id in unique {
            match self.cache.get(id.as_str()) {
                Some(cached) => {
                    results.insert(id, cached);
                }
                None => to_fetch.push(id),
            }
        }

        let mut processed = results.len();
        debug!(total, cached = processed, to_fetch = to_fetch.len(), "metadata enrichment started");
        if to_fetch.is_empty() {
            on_progress(processed, total);
            return results;
        }

        for batch in to_fetch.chunks(self.batch_size) {
            let fetched = self.fetch_batch(batch).await;
            for (id, record) in fetched {
                results.insert(id, record);
            }
            processed += batch.len();
            on_progress(processed, total);
        }

        results
    }

    async fn fetch_batch(&self, batch: &[WikidataId]) -> Vec<(WikidataId, EnrichmentRecord)> {
        let mut seeded: HashMap<WikidataId, EnrichmentRecord> = batch
            .iter()
            .map(|id| (id.clone(), EnrichmentRecord::default()))
            .collect();

        match self.source.fetch_entities(batch).await {
            Ok(found) => {
                for (id, record) in found {
                    if let Some(slot) = seeded.get_mut(&id) {
                        slot.merge_non_null(record);
                    }
                }
            }
            Err(error) => {
                warn!(%error, batch_size = batch.len(), "metadata batch failed; ids left empty");
                return seeded.into_iter().collect();
            }
        }

        seeded
            .into_iter()
            .map(|(id, record)| {
                self.cache.merge(id.as_str(), record.clone());
                let merged = self.cache.get(id.as_str()).unwrap_or(record);
                (id, merged)
            })
            .collect()
    }
}

/// Normalize, drop invalid, and de-duplicate ids, keeping first-seen order.
fn normalize_ids<S: AsRef<str>>(ids: &[S]) -> Vec<WikidataId> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for raw in ids {
        match raw.as_ref().parse::<WikidataId>() {
            Ok(id) => {
                if seen.insert(id.clone()) {
                    unique.push(id);
                }
            }
            Err(error) => warn!(%error, "skipping invalid knowledge-base id"),
        }
    }
    unique
}
