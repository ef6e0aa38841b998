// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::settings::SearchSettings;
use crate::models::store::StoreKind;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Join key shared by the index, metadata and content stores.
pub type DocumentId = String;

/// One row of the inverted index: how often `token` occurs in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub document_id: DocumentId,
    pub token: String,
    pub frequency: i64,
}

/// A ranked document id with its summed token frequency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScoredMatch {
    pub document_id: DocumentId,
    pub score: i64,
}

/// Catalog entry kept in the metadata store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetadataRecord {
    pub document_id: DocumentId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub crawl_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Crawlers write either RFC 3339 or a bare ISO timestamp without offset.
/// Anything unreadable is dropped rather than failing the record.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(serde_json::Value::as_str).and_then(parse_timestamp))
}

/// Parse a crawl timestamp; values without an offset are taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Raw body of a document as held by the content store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub document_id: DocumentId,
    pub content: String,
}

/// One entry of a result page, assembled from all three stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResultRecord {
    pub document_id: DocumentId,
    pub url: String,
    pub title: String,
    /// Metadata description, or the snippet when metadata has none
    pub description: String,
    /// First 200 characters of the content body
    pub snippet: String,
    pub score: i64,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub crawl_timestamp: Option<DateTime<Utc>>,
}

/// Raw query string parameters of `GET /api/search`.
///
/// Kept as strings so that malformed numbers fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text query
    pub q: Option<String>,
    /// 1-based page number (default: 1)
    pub page: Option<String>,
    /// Page size (default: 10)
    pub limit: Option<String>,
}

impl SearchParams {
    /// Resolve defaults and bounds into a validated request
    pub fn normalize(&self, settings: &SearchSettings) -> SearchRequest {
        let page = parse_at_least_one(self.page.as_deref(), 1);
        let limit = parse_at_least_one(self.limit.as_deref(), settings.default_limit)
            .min(settings.max_limit.max(1));

        SearchRequest {
            query: self.q.clone().unwrap_or_default(),
            page,
            limit,
        }
    }
}

fn parse_at_least_one(raw: Option<&str>, default: u32) -> u32 {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => match value.parse::<i64>() {
            Ok(n) if n < 1 => 1,
            Ok(n) => u32::try_from(n).unwrap_or(u32::MAX),
            Err(_) => default.max(1),
        },
        None => default.max(1),
    }
}

/// Validated search request: `page >= 1`, `limit >= 1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub page: u32,
    pub limit: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, page: u32, limit: u32) -> Self {
        Self {
            query: query.into(),
            page: page.max(1),
            limit: limit.max(1),
        }
    }
}

/// Successful (possibly degraded) search response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    /// Results ordered by descending score
    pub results: Vec<ResultRecord>,
    /// Distinct documents matching at least one token, across all pages
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    /// Query as received
    pub query: String,
    /// Tokens the query was reduced to
    pub tokens: Vec<String>,
    /// True when enrichment was incomplete
    pub partial: bool,
    /// Stores whose enrichment lookup failed
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub degraded_stores: Vec<StoreKind>,
}

impl SearchResponse {
    /// Response for a query that produced no searchable tokens
    pub fn empty(request: &SearchRequest, tokens: Vec<String>) -> Self {
        Self {
            results: Vec::new(),
            total: 0,
            page: request.page,
            limit: request.limit,
            query: request.query.clone(),
            tokens,
            partial: false,
            degraded_stores: Vec::new(),
        }
    }
}

/// Body returned when a search cannot produce any ranking
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchFailureResponse {
    pub error: String,
    /// Machine-readable error kind, e.g. `index_store_unavailable`
    pub kind: String,
    pub message: String,
    pub results: Vec<ResultRecord>,
    pub partial: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SearchSettings {
        SearchSettings {
            default_limit: 10,
            max_limit: 100,
            ..SearchSettings::default()
        }
    }

    fn params(page: Option<&str>, limit: Option<&str>) -> SearchParams {
        SearchParams {
            q: Some("rust search".to_string()),
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn test_normalize_defaults() {
        let request = SearchParams::default().normalize(&settings());
        assert_eq!(request, SearchRequest::new("", 1, 10));
    }

    #[test]
    fn test_normalize_explicit_values() {
        let request = params(Some("3"), Some("25")).normalize(&settings());
        assert_eq!(request.page, 3);
        assert_eq!(request.limit, 25);
        assert_eq!(request.query, "rust search");
    }

    #[test]
    fn test_normalize_raises_values_below_one() {
        let request = params(Some("0"), Some("-4")).normalize(&settings());
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 1);
    }

    #[test]
    fn test_normalize_garbage_falls_back_to_defaults() {
        let request = params(Some("abc"), Some("ten")).normalize(&settings());
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 10);
    }

    #[test]
    fn test_normalize_caps_limit() {
        let request = params(None, Some("5000")).normalize(&settings());
        assert_eq!(request.limit, 100);
    }

    #[test]
    fn test_search_request_new_clamps() {
        let request = SearchRequest::new("q", 0, 0);
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 1);
    }

    #[test]
    fn test_result_record_omits_missing_crawl_timestamp() {
        let record = ResultRecord {
            document_id: "doc-1".to_string(),
            url: String::new(),
            title: "Untitled".to_string(),
            description: String::new(),
            snippet: String::new(),
            score: 4,
            source: String::new(),
            crawl_timestamp: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("crawl_timestamp").is_none());
        assert_eq!(json["score"], 4);
    }

    #[test]
    fn test_metadata_record_tolerates_missing_optional_fields() {
        let record: MetadataRecord =
            serde_json::from_str(r#"{"document_id":"d1","url":"https://example.com"}"#).unwrap();
        assert_eq!(record.title, None);
        assert_eq!(record.crawl_timestamp, None);
    }

    #[test]
    fn test_metadata_record_accepts_timestamp_without_offset() {
        let record: MetadataRecord = serde_json::from_str(
            r#"{"document_id":"d1","url":"https://example.com","crawl_timestamp":"2024-05-01T12:00:00.123456"}"#,
        )
        .unwrap();

        let expected = DateTime::parse_from_rfc3339("2024-05-01T12:00:00.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(record.crawl_timestamp, Some(expected));
    }

    #[test]
    fn test_metadata_record_drops_unreadable_timestamp() {
        for raw in [r#""yesterday""#, "1714564800", "null"] {
            let json = format!(r#"{{"document_id":"d1","url":"u","crawl_timestamp":{}}}"#, raw);
            let record: MetadataRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(record.crawl_timestamp, None, "timestamp {}", raw);
        }
    }

    #[test]
    fn test_metadata_record_null_or_missing_url_is_empty() {
        let record: MetadataRecord =
            serde_json::from_str(r#"{"document_id":"d1","url":null,"title":"T"}"#).unwrap();
        assert_eq!(record.url, "");

        let record: MetadataRecord = serde_json::from_str(r#"{"document_id":"d2"}"#).unwrap();
        assert_eq!(record.url, "");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-05-01T12:00:00+02:00").is_some());
        assert!(parse_timestamp("2024-05-01T12:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-01T12:00:00").is_some());
        assert!(parse_timestamp("2024-05-01 12:00:00").is_some());
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn test_complete_response_has_no_degraded_stores_field() {
        let request = SearchRequest::new("ab", 1, 10);
        let json = serde_json::to_value(SearchResponse::empty(&request, Vec::new())).unwrap();
        assert_eq!(json["partial"], false);
        assert!(json.get("degraded_stores").is_none());
        assert_eq!(json["total"], 0);
    }
}
