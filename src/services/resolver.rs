// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::error::SearchError;
use crate::models::search::ScoredMatch;
use crate::models::store::StoreKind;
use crate::services::stores::{bounded, IndexStore};
use std::sync::Arc;
use std::time::Duration;

/// One page of the index ranking plus the size of the whole ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPage {
    /// Best first; ties keep the order the store returned them in
    pub matches: Vec<ScoredMatch>,
    /// Distinct documents matching at least one token, independent of the window
    pub total: u64,
}

/// Ranks documents for a token set using the index store alone
pub struct IndexResolver {
    store: Arc<dyn IndexStore>,
    timeout: Duration,
}

impl IndexResolver {
    pub fn new(store: Arc<dyn IndexStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Resolve page `page` (1-based) of size `page_size`.
    ///
    /// The window is applied to the index ranking before any enrichment, so
    /// pages stay stable whatever the other stores return.
    pub async fn resolve(
        &self,
        tokens: &[String],
        page: u32,
        page_size: u32,
    ) -> Result<ResolvedPage, SearchError> {
        let page_size = page_size.max(1);
        let offset = page_offset(page, page_size);

        let (mut matches, total) = tokio::try_join!(
            bounded(
                StoreKind::Index,
                self.timeout,
                self.store.ranked_matches(tokens, page_size, offset),
            ),
            bounded(
                StoreKind::Index,
                self.timeout,
                self.store.count_matches(tokens),
            ),
        )
        .map_err(|e| SearchError::unavailable(StoreKind::Index, e))?;

        // Stable: equal scores stay in store order
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.truncate(page_size as usize);

        Ok(ResolvedPage { matches, total })
    }
}

/// `(page - 1) * page_size`, with page clamped to 1
pub fn page_offset(page: u32, page_size: u32) -> u64 {
    u64::from(page.max(1) - 1) * u64::from(page_size)
}
