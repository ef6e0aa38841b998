// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::search::{DocumentId, MetadataRecord};
use crate::services::stores::MetadataStore;
use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use meilisearch_sdk::client::Client;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

/// Configuration for the Meilisearch instance holding document metadata
#[derive(Debug, Clone)]
pub struct MetadataStoreConfig {
    pub host: String,
    pub api_key: Option<String>,
    pub index_name: String,
}

impl MetadataStoreConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("MEILISEARCH_HOST")
            .map_err(|_| anyhow!("MEILISEARCH_HOST environment variable not set"))?;
        let api_key = std::env::var("MEILISEARCH_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());
        let index_name =
            std::env::var("METADATA_INDEX").unwrap_or_else(|_| "documents".to_string());

        Ok(Self {
            host,
            api_key,
            index_name,
        })
    }
}

/// Metadata catalog stored as one Meilisearch document per `document_id`
pub struct MeiliMetadataStore {
    client: Client,
    index_name: String,
    settings_applied: AtomicBool,
}

impl MeiliMetadataStore {
    /// Create a new Meilisearch client
    pub fn new(config: &MetadataStoreConfig) -> Result<Self> {
        // Construct the full URL if only host:port is provided
        let url = if config.host.starts_with("http://") || config.host.starts_with("https://") {
            config.host.clone()
        } else {
            format!("http://{}", config.host)
        };

        let client = Client::new(&url, config.api_key.clone())?;

        tracing::info!(url = %url, index = %config.index_name, "metadata store client configured");

        Ok(Self {
            client,
            index_name: config.index_name.clone(),
            settings_applied: AtomicBool::new(false),
        })
    }

    /// Create the index keyed by `document_id` and make `document_id` filterable
    /// so id-set lookups work. Creating an index that already exists is a no-op
    /// on the Meilisearch side: the enqueued task fails and the existing key stays.
    pub async fn init_index(&self) -> Result<()> {
        self.client
            .create_index(&self.index_name, Some("document_id"))
            .await
            .map_err(|e| anyhow!("Failed to create metadata index: {}", e))?;

        self.client
            .index(&self.index_name)
            .set_filterable_attributes(["document_id", "source"])
            .await
            .map_err(|e| anyhow!("Failed to set filterable attributes: {}", e))?;

        self.settings_applied.store(true, Ordering::Release);
        tracing::info!(index = %self.index_name, "initialized metadata index settings");

        Ok(())
    }

    /// Retry index settings that could not be applied at startup
    async fn ensure_index_settings(&self) {
        if self.settings_applied.load(Ordering::Acquire) {
            return;
        }
        if let Err(e) = self.init_index().await {
            tracing::warn!(error = %e, "metadata index settings still not applied");
        }
    }
}

/// Convert raw search hits one by one; a hit that is not a readable metadata
/// record is logged and skipped instead of failing the batch.
pub fn metadata_from_hits(hits: impl IntoIterator<Item = Value>) -> Vec<MetadataRecord> {
    hits.into_iter()
        .filter_map(|hit| {
            let document_id = hit
                .get("document_id")
                .and_then(Value::as_str)
                .unwrap_or("<missing>")
                .to_string();
            match serde_json::from_value::<MetadataRecord>(hit) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(document_id = %document_id, error = %e, "skipping unreadable metadata record");
                    None
                }
            }
        })
        .collect()
}

/// Meilisearch filter selecting exactly `ids`, e.g. `document_id IN ["a", "b"]`.
/// Ids are JSON-encoded, which gives the quoting and escaping the filter syntax expects.
pub fn id_membership_filter(ids: &[DocumentId]) -> Result<String> {
    Ok(format!("document_id IN {}", serde_json::to_string(ids)?))
}

impl MetadataStore for MeiliMetadataStore {
    fn fetch_metadata<'a>(
        &'a self,
        ids: &'a [DocumentId],
    ) -> BoxFuture<'a, Result<Vec<MetadataRecord>>> {
        Box::pin(async move {
            if ids.is_empty() {
                return Ok(Vec::new());
            }

            self.ensure_index_settings().await;

            let index = self.client.index(&self.index_name);
            let filter = id_membership_filter(ids)?;

            let found = index
                .search()
                .with_filter(&filter)
                .with_limit(ids.len())
                .execute::<Value>()
                .await
                .map_err(|e| anyhow!("Metadata lookup failed: {}", e))?;

            Ok(metadata_from_hits(found.hits.into_iter().map(|hit| hit.result)))
        })
    }

    fn count_documents(&self) -> BoxFuture<'_, Result<u64>> {
        Box::pin(async move {
            let stats = self
                .client
                .index(&self.index_name)
                .get_stats()
                .await
                .map_err(|e| anyhow!("Metadata stats failed: {}", e))?;
            Ok(stats.number_of_documents as u64)
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.client
                .health()
                .await
                .map_err(|e| anyhow!("Metadata store ping failed: {}", e))?;
            Ok(())
        })
    }
}
