// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! In-process stores with the same contracts as the PostgreSQL, Meilisearch
//! and S3 backends.
//!
//! Each one counts its calls, can be switched unavailable, and can be given a
//! fixed latency. Used by unit tests and by the router tests in `tests/`.

use crate::models::search::{ContentRecord, DocumentId, IndexEntry, MetadataRecord, ScoredMatch};
use crate::services::stores::{ContentStore, IndexStore, MetadataStore};
use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Availability switch, call counter and latency shared by the fakes
struct Behaviour {
    name: &'static str,
    available: AtomicBool,
    calls: AtomicUsize,
    latency: Duration,
}

impl Behaviour {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            available: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            latency: Duration::ZERO,
        }
    }

    async fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(anyhow!("{} store is unreachable", self.name))
        }
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

pub struct InMemoryIndexStore {
    entries: Vec<IndexEntry>,
    behaviour: Behaviour,
}

impl InMemoryIndexStore {
    /// Build from `(document_id, token, frequency)` rows. Row order is the
    /// store-assigned order used to break score ties.
    pub fn from_entries<'a>(rows: impl IntoIterator<Item = (&'a str, &'a str, i64)>) -> Self {
        let entries = rows
            .into_iter()
            .map(|(document_id, token, frequency)| IndexEntry {
                document_id: document_id.to_string(),
                token: token.to_string(),
                frequency,
            })
            .collect();

        Self {
            entries,
            behaviour: Behaviour::new("index"),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.behaviour.latency = latency;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.behaviour.available.store(available, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.behaviour.calls.load(Ordering::SeqCst)
    }

    /// Grouped scores in first-seen order, then stably sorted best first
    fn ranking(&self, tokens: &[String]) -> Vec<ScoredMatch> {
        let wanted: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        let mut order: Vec<DocumentId> = Vec::new();
        let mut scores: HashMap<&str, i64> = HashMap::new();

        for entry in self
            .entries
            .iter()
            .filter(|e| wanted.contains(e.token.as_str()))
        {
            let score = scores.entry(entry.document_id.as_str()).or_insert_with(|| {
                order.push(entry.document_id.clone());
                0
            });
            *score += entry.frequency;
        }

        let mut ranking: Vec<ScoredMatch> = order
            .into_iter()
            .map(|document_id| ScoredMatch {
                score: scores[document_id.as_str()],
                document_id,
            })
            .collect();
        ranking.sort_by(|a, b| b.score.cmp(&a.score));
        ranking
    }
}

impl IndexStore for InMemoryIndexStore {
    fn ranked_matches<'a>(
        &'a self,
        tokens: &'a [String],
        limit: u32,
        offset: u64,
    ) -> BoxFuture<'a, Result<Vec<ScoredMatch>>> {
        Box::pin(async move {
            self.behaviour.enter().await?;
            let skip = usize::try_from(offset).unwrap_or(usize::MAX);
            Ok(self
                .ranking(tokens)
                .into_iter()
                .skip(skip)
                .take(limit as usize)
                .collect())
        })
    }

    fn count_matches<'a>(&'a self, tokens: &'a [String]) -> BoxFuture<'a, Result<u64>> {
        Box::pin(async move {
            self.behaviour.enter().await?;
            Ok(self.ranking(tokens).len() as u64)
        })
    }

    fn count_tokens(&self) -> BoxFuture<'_, Result<u64>> {
        Box::pin(async move {
            self.behaviour.enter().await?;
            let distinct: HashSet<&str> = self.entries.iter().map(|e| e.token.as_str()).collect();
            Ok(distinct.len() as u64)
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.behaviour.enter())
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

pub struct InMemoryMetadataStore {
    records: HashMap<DocumentId, MetadataRecord>,
    behaviour: Behaviour,
}

impl InMemoryMetadataStore {
    pub fn from_records(records: impl IntoIterator<Item = MetadataRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| (r.document_id.clone(), r))
                .collect(),
            behaviour: Behaviour::new("metadata"),
        }
    }

    /// Fully populated record with a description derived from the title
    pub fn record(document_id: &str, url: &str, title: &str) -> MetadataRecord {
        MetadataRecord {
            document_id: document_id.to_string(),
            url: url.to_string(),
            title: Some(title.to_string()),
            description: Some(format!("Description of {}", title)),
            keywords: None,
            crawl_timestamp: None,
            source: Some("example.com".to_string()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.behaviour.latency = latency;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.behaviour.available.store(available, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.behaviour.calls.load(Ordering::SeqCst)
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn fetch_metadata<'a>(
        &'a self,
        ids: &'a [DocumentId],
    ) -> BoxFuture<'a, Result<Vec<MetadataRecord>>> {
        Box::pin(async move {
            self.behaviour.enter().await?;
            Ok(ids
                .iter()
                .filter_map(|id| self.records.get(id).cloned())
                .collect())
        })
    }

    fn count_documents(&self) -> BoxFuture<'_, Result<u64>> {
        Box::pin(async move {
            self.behaviour.enter().await?;
            Ok(self.records.len() as u64)
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.behaviour.enter())
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

pub struct InMemoryContentStore {
    bodies: HashMap<DocumentId, String>,
    behaviour: Behaviour,
}

impl InMemoryContentStore {
    pub fn from_bodies<'a>(bodies: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            bodies: bodies
                .into_iter()
                .map(|(id, body)| (id.to_string(), body.to_string()))
                .collect(),
            behaviour: Behaviour::new("content"),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.behaviour.latency = latency;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.behaviour.available.store(available, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.behaviour.calls.load(Ordering::SeqCst)
    }
}

impl ContentStore for InMemoryContentStore {
    fn fetch_content<'a>(
        &'a self,
        ids: &'a [DocumentId],
    ) -> BoxFuture<'a, Result<Vec<ContentRecord>>> {
        Box::pin(async move {
            self.behaviour.enter().await?;
            Ok(ids
                .iter()
                .filter_map(|id| {
                    self.bodies.get(id).map(|body| ContentRecord {
                        document_id: id.clone(),
                        content: body.clone(),
                    })
                })
                .collect())
        })
    }

    fn count_content(&self) -> BoxFuture<'_, Result<u64>> {
        Box::pin(async move {
            self.behaviour.enter().await?;
            Ok(self.bodies.len() as u64)
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.behaviour.enter())
    }
}
