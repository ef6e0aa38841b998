// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::search::ScoredMatch;
use crate::services::logging::redact_url_credentials;
use crate::services::stores::IndexStore;
use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Summed frequency per document for a token set, best first.
/// `document_id` breaks ties so that consecutive pages never overlap.
const RANKED_MATCHES_SQL: &str = "SELECT document_id, SUM(frequency)::BIGINT AS score
     FROM inverted_index
     WHERE token = ANY($1)
     GROUP BY document_id
     ORDER BY score DESC, document_id ASC
     LIMIT $2 OFFSET $3";

const COUNT_MATCHES_SQL: &str = "SELECT COUNT(DISTINCT document_id)
     FROM inverted_index
     WHERE token = ANY($1)";

const COUNT_TOKENS_SQL: &str = "SELECT COUNT(DISTINCT token) FROM inverted_index";

/// Configuration for the PostgreSQL database holding the inverted index
#[derive(Debug, Clone)]
pub struct IndexStoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// How long a query may wait for a pooled connection
    pub acquire_timeout: Duration,
}

impl IndexStoreConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("INDEX_DATABASE_URL")
            .map_err(|_| anyhow!("INDEX_DATABASE_URL environment variable not set"))?;
        let max_connections = std::env::var("INDEX_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| anyhow!("INDEX_DB_MAX_CONNECTIONS must be a valid number"))?;

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout: Duration::from_secs(5),
        })
    }
}

/// Inverted index backed by the `inverted_index` table:
/// `(token, document_id, frequency)`, unique on `(token, document_id)`.
pub struct PgIndexStore {
    pool: PgPool,
}

impl PgIndexStore {
    /// Build a lazily connecting pool, so the service starts even when the
    /// database is down and reports it through health instead.
    pub fn connect_lazy(config: &IndexStoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy(&config.database_url)
            .map_err(|e| anyhow!("Invalid index database URL: {}", e))?;

        tracing::info!(
            url = %redact_url_credentials(&config.database_url),
            max_connections = config.max_connections,
            "index store pool configured"
        );

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl IndexStore for PgIndexStore {
    fn ranked_matches<'a>(
        &'a self,
        tokens: &'a [String],
        limit: u32,
        offset: u64,
    ) -> BoxFuture<'a, Result<Vec<ScoredMatch>>> {
        Box::pin(async move {
            let offset = i64::try_from(offset).unwrap_or(i64::MAX);
            let matches = sqlx::query_as::<_, ScoredMatch>(RANKED_MATCHES_SQL)
                .bind(tokens)
                .bind(i64::from(limit))
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| anyhow!("Ranked index query failed: {}", e))?;
            Ok(matches)
        })
    }

    fn count_matches<'a>(&'a self, tokens: &'a [String]) -> BoxFuture<'a, Result<u64>> {
        Box::pin(async move {
            let count: i64 = sqlx::query_scalar(COUNT_MATCHES_SQL)
                .bind(tokens)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| anyhow!("Index match count failed: {}", e))?;
            Ok(count.max(0) as u64)
        })
    }

    fn count_tokens(&self) -> BoxFuture<'_, Result<u64>> {
        Box::pin(async move {
            let count: i64 = sqlx::query_scalar(COUNT_TOKENS_SQL)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| anyhow!("Index token count failed: {}", e))?;
            Ok(count.max(0) as u64)
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| anyhow!("Index store ping failed: {}", e))?;
            Ok(())
        })
    }
}
