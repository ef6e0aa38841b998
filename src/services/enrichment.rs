// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::error::SearchError;
use crate::models::search::{ContentRecord, DocumentId, MetadataRecord};
use crate::models::store::StoreKind;
use crate::services::stores::{bounded, ContentStore, MetadataStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Metadata and content found for a set of ids.
///
/// Missing entries are normal (indexed but not yet enriched). A store that
/// failed contributes an empty map and one entry in `failures`.
#[derive(Debug, Default)]
pub struct Enrichment {
    pub metadata: HashMap<DocumentId, MetadataRecord>,
    pub content: HashMap<DocumentId, ContentRecord>,
    pub failures: Vec<SearchError>,
}

impl Enrichment {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn degraded_stores(&self) -> Vec<StoreKind> {
        self.failures.iter().map(SearchError::store).collect()
    }
}

/// Joins ranked ids against the metadata and content stores
pub struct EnrichmentFetcher {
    metadata: Arc<dyn MetadataStore>,
    content: Arc<dyn ContentStore>,
    timeout: Duration,
}

impl EnrichmentFetcher {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        content: Arc<dyn ContentStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            metadata,
            content,
            timeout,
        }
    }

    /// Look `ids` up in both stores at once and wait for both.
    ///
    /// Never fails as a whole: each store's failure is recorded and its map left
    /// empty.
    pub async fn fetch(&self, ids: &[DocumentId]) -> Enrichment {
        if ids.is_empty() {
            return Enrichment::default();
        }

        let (metadata, content) = tokio::join!(
            bounded(
                StoreKind::Metadata,
                self.timeout,
                self.metadata.fetch_metadata(ids),
            ),
            bounded(
                StoreKind::Content,
                self.timeout,
                self.content.fetch_content(ids),
            ),
        );

        let mut enrichment = Enrichment::default();

        match metadata {
            Ok(records) => {
                enrichment.metadata = records
                    .into_iter()
                    .map(|record| (record.document_id.clone(), record))
                    .collect();
            }
            Err(e) => enrichment
                .failures
                .push(SearchError::unavailable(StoreKind::Metadata, e)),
        }

        match content {
            Ok(records) => {
                enrichment.content = records
                    .into_iter()
                    .map(|record| (record.document_id.clone(), record))
                    .collect();
            }
            Err(e) => enrichment
                .failures
                .push(SearchError::unavailable(StoreKind::Content, e)),
        }

        enrichment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::{InMemoryContentStore, InMemoryMetadataStore};

    fn metadata_store() -> Arc<InMemoryMetadataStore> {
        Arc::new(InMemoryMetadataStore::from_records([
            InMemoryMetadataStore::record("d1", "https://example.com/1", "First"),
            InMemoryMetadataStore::record("d2", "https://example.com/2", "Second"),
        ]))
    }

    fn content_store() -> Arc<InMemoryContentStore> {
        Arc::new(InMemoryContentStore::from_bodies([
            ("d1", "first body"),
            ("d3", "third body"),
        ]))
    }

    fn ids(list: &[&str]) -> Vec<DocumentId> {
        list.iter().map(|id| id.to_string()).collect()
    }

    #[tokio::test]
    async fn test_fetch_tolerates_missing_keys() {
        let fetcher =
            EnrichmentFetcher::new(metadata_store(), content_store(), Duration::from_secs(1));

        let enrichment = fetcher.fetch(&ids(&["d1", "d2", "d3", "d4"])).await;

        assert!(enrichment.is_complete());
        assert_eq!(enrichment.metadata.len(), 2);
        assert_eq!(enrichment.content.len(), 2);
        assert!(enrichment.metadata.contains_key("d2"));
        assert!(!enrichment.content.contains_key("d2"));
        assert!(!enrichment.metadata.contains_key("d4"));
    }

    #[tokio::test]
    async fn test_fetch_metadata_failure_keeps_content() {
        let metadata = metadata_store();
        metadata.set_available(false);
        let fetcher = EnrichmentFetcher::new(metadata, content_store(), Duration::from_secs(1));

        let enrichment = fetcher.fetch(&ids(&["d1", "d3"])).await;

        assert!(enrichment.metadata.is_empty());
        assert_eq!(enrichment.content.len(), 2);
        assert_eq!(enrichment.degraded_stores(), vec![StoreKind::Metadata]);
    }

    #[tokio::test]
    async fn test_fetch_content_failure_keeps_metadata() {
        let content = content_store();
        content.set_available(false);
        let fetcher = EnrichmentFetcher::new(metadata_store(), content, Duration::from_secs(1));

        let enrichment = fetcher.fetch(&ids(&["d1", "d2"])).await;

        assert_eq!(enrichment.metadata.len(), 2);
        assert!(enrichment.content.is_empty());
        assert_eq!(enrichment.degraded_stores(), vec![StoreKind::Content]);
    }

    #[tokio::test]
    async fn test_fetch_both_failing() {
        let metadata = metadata_store();
        let content = content_store();
        metadata.set_available(false);
        content.set_available(false);
        let fetcher = EnrichmentFetcher::new(metadata, content, Duration::from_secs(1));

        let enrichment = fetcher.fetch(&ids(&["d1"])).await;

        assert_eq!(
            enrichment.degraded_stores(),
            vec![StoreKind::Metadata, StoreKind::Content]
        );
    }

    #[tokio::test]
    async fn test_fetch_empty_ids_makes_no_calls() {
        let metadata = metadata_store();
        let content = content_store();
        let fetcher =
            EnrichmentFetcher::new(metadata.clone(), content.clone(), Duration::from_secs(1));

        let enrichment = fetcher.fetch(&[]).await;

        assert!(enrichment.is_complete());
        assert_eq!(metadata.calls(), 0);
        assert_eq!(content.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_issues_lookups_concurrently() {
        let latency = Duration::from_millis(200);
        let metadata = Arc::new(
            InMemoryMetadataStore::from_records([InMemoryMetadataStore::record(
                "d1",
                "https://example.com/1",
                "First",
            )])
            .with_latency(latency),
        );
        let content =
            Arc::new(InMemoryContentStore::from_bodies([("d1", "body")]).with_latency(latency));
        let fetcher = EnrichmentFetcher::new(metadata, content, Duration::from_secs(5));

        let started = tokio::time::Instant::now();
        let enrichment = fetcher.fetch(&ids(&["d1"])).await;
        let elapsed = started.elapsed();

        assert!(enrichment.is_complete());
        assert!(elapsed >= latency);
        assert!(elapsed < latency * 2, "lookups ran sequentially: {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_slow_store_times_out_alone() {
        let metadata = Arc::new(
            InMemoryMetadataStore::from_records([InMemoryMetadataStore::record(
                "d1",
                "https://example.com/1",
                "First",
            )])
            .with_latency(Duration::from_secs(60)),
        );
        let fetcher =
            EnrichmentFetcher::new(metadata, content_store(), Duration::from_millis(500));

        let enrichment = fetcher.fetch(&ids(&["d1"])).await;

        assert_eq!(enrichment.degraded_stores(), vec![StoreKind::Metadata]);
        assert_eq!(enrichment.content.len(), 1);
    }
}
