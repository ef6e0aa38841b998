// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Search orchestration across the index, metadata and content stores.
//!
//! A search moves through `ValidateQuery -> ResolveIndex -> FetchEnrichment ->
//! Assemble -> Respond`. Only `ResolveIndex` can fail the request; enrichment
//! failures degrade the page and mark it partial.

use crate::error::SearchError;
use crate::models::search::{DocumentId, SearchRequest, SearchResponse};
use crate::models::stats::{HealthResponse, StatsResponse, StoreHealth, StoreStatus};
use crate::models::settings::SearchSettings;
use crate::models::store::StoreKind;
use crate::services::assembler::assemble;
use crate::services::enrichment::EnrichmentFetcher;
use crate::services::resolver::IndexResolver;
use crate::services::stores::{bounded, StoreClients};
use crate::services::tokenizer::tokenize;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

pub struct SearchAggregator {
    stores: StoreClients,
    resolver: IndexResolver,
    fetcher: EnrichmentFetcher,
    timeout: Duration,
}

impl SearchAggregator {
    pub fn new(stores: StoreClients, settings: &SearchSettings) -> Self {
        let timeout = settings.store_timeout;
        Self {
            resolver: IndexResolver::new(stores.index.clone(), timeout),
            fetcher: EnrichmentFetcher::new(
                stores.metadata.clone(),
                stores.content.clone(),
                timeout,
            ),
            stores,
            timeout,
        }
    }

    /// Run one search. Fails only when the index store cannot rank.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let span = tracing::info_span!(
            "search",
            request_id = %Uuid::now_v7(),
            page = request.page,
            limit = request.limit,
        );
        self.run_search(request).instrument(span).await
    }

    async fn run_search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let tokens = tokenize(&request.query);
        if tokens.is_empty() {
            tracing::debug!("query has no searchable tokens");
            return Ok(SearchResponse::empty(&request, tokens));
        }

        let ranked = self
            .resolver
            .resolve(&tokens, request.page, request.limit)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "index resolution failed"))?;

        let ids: Vec<DocumentId> = ranked
            .matches
            .iter()
            .map(|m| m.document_id.clone())
            .collect();
        let enrichment = self.fetcher.fetch(&ids).await;

        for failure in &enrichment.failures {
            tracing::warn!(store = %failure.store(), error = %failure, "enrichment degraded");
        }

        let results = assemble(&ranked.matches, &enrichment.metadata, &enrichment.content);
        let degraded_stores = enrichment.degraded_stores();

        tracing::info!(
            tokens = tokens.len(),
            total = ranked.total,
            returned = results.len(),
            partial = !degraded_stores.is_empty(),
            "search completed"
        );

        Ok(SearchResponse {
            results,
            total: ranked.total,
            page: request.page,
            limit: request.limit,
            query: request.query,
            tokens,
            partial: !degraded_stores.is_empty(),
            degraded_stores,
        })
    }

    /// Count records in each store; a store that fails is left out.
    pub async fn stats(&self) -> StatsResponse {
        let (documents, tokens, content_docs) = tokio::join!(
            bounded(
                StoreKind::Metadata,
                self.timeout,
                self.stores.metadata.count_documents(),
            ),
            bounded(
                StoreKind::Index,
                self.timeout,
                self.stores.index.count_tokens(),
            ),
            bounded(
                StoreKind::Content,
                self.timeout,
                self.stores.content.count_content(),
            ),
        );

        StatsResponse {
            documents: counted(StoreKind::Metadata, documents),
            tokens: counted(StoreKind::Index, tokens),
            content_docs: counted(StoreKind::Content, content_docs),
        }
    }

    /// Probe each store's liveness independently
    pub async fn health(&self) -> HealthResponse {
        let (index, metadata, content) = tokio::join!(
            bounded(StoreKind::Index, self.timeout, self.stores.index.ping()),
            bounded(
                StoreKind::Metadata,
                self.timeout,
                self.stores.metadata.ping(),
            ),
            bounded(StoreKind::Content, self.timeout, self.stores.content.ping()),
        );

        for (store, probe) in [
            (StoreKind::Index, &index),
            (StoreKind::Metadata, &metadata),
            (StoreKind::Content, &content),
        ] {
            if let Err(e) = probe {
                tracing::warn!(store = %store, error = %e, "store liveness probe failed");
            }
        }

        HealthResponse::from_stores(StoreHealth {
            index: StoreStatus::from_probe(&index),
            metadata: StoreStatus::from_probe(&metadata),
            content: StoreStatus::from_probe(&content),
        })
    }
}

fn counted(store: StoreKind, count: anyhow::Result<u64>) -> Option<u64> {
    count
        .inspect_err(|e| tracing::warn!(store = %store, error = %e, "store count failed"))
        .ok()
}
