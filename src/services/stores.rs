// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Contracts of the three stores a search is federated over.
//!
//! The core only reads through these traits. Every call is independently
//! failable and no ordering or atomicity across stores is assumed. Futures are
//! boxed so the aggregator can hold `Arc<dyn ...>` handles.

use crate::models::search::{ContentRecord, DocumentId, MetadataRecord, ScoredMatch};
use crate::models::store::StoreKind;
use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Inverted index: `(document_id, token, frequency)` rows
pub trait IndexStore: Send + Sync {
    /// Documents having at least one of `tokens`, scored by summed frequency,
    /// best first, windowed by `offset`/`limit`.
    fn ranked_matches<'a>(
        &'a self,
        tokens: &'a [String],
        limit: u32,
        offset: u64,
    ) -> BoxFuture<'a, Result<Vec<ScoredMatch>>>;

    /// Distinct documents having at least one of `tokens`
    fn count_matches<'a>(&'a self, tokens: &'a [String]) -> BoxFuture<'a, Result<u64>>;

    /// Distinct tokens in the whole index
    fn count_tokens(&self) -> BoxFuture<'_, Result<u64>>;

    fn ping(&self) -> BoxFuture<'_, Result<()>>;
}

/// Document catalog keyed by document id
pub trait MetadataStore: Send + Sync {
    /// Records for those of `ids` the store knows; unknown ids are skipped
    fn fetch_metadata<'a>(
        &'a self,
        ids: &'a [DocumentId],
    ) -> BoxFuture<'a, Result<Vec<MetadataRecord>>>;

    fn count_documents(&self) -> BoxFuture<'_, Result<u64>>;

    fn ping(&self) -> BoxFuture<'_, Result<()>>;
}

/// Raw bodies keyed by document id
pub trait ContentStore: Send + Sync {
    /// Bodies for those of `ids` the store holds; unknown ids are skipped
    fn fetch_content<'a>(
        &'a self,
        ids: &'a [DocumentId],
    ) -> BoxFuture<'a, Result<Vec<ContentRecord>>>;

    fn count_content(&self) -> BoxFuture<'_, Result<u64>>;

    fn ping(&self) -> BoxFuture<'_, Result<()>>;
}

/// Store handles threaded into the aggregator.
///
/// Connection setup and pooling belong to whoever builds this value.
#[derive(Clone)]
pub struct StoreClients {
    pub index: Arc<dyn IndexStore>,
    pub metadata: Arc<dyn MetadataStore>,
    pub content: Arc<dyn ContentStore>,
}

/// Run a store call under a deadline. An elapsed deadline is reported like any
/// other store failure.
pub async fn bounded<T, F>(store: StoreKind, timeout: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!(
            "{} store call timed out after {}ms",
            store,
            timeout.as_millis()
        )),
    }
}
