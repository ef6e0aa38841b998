// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Error kinds surfaced by the search core.
//!
//! An empty or degenerate query is not an error (it yields an empty page) and
//! assembling results cannot fail, so neither has a variant here.

use crate::models::search::SearchFailureResponse;
use crate::models::store::StoreKind;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// No ranking is possible; fatal to the request
    #[error("Index store unavailable: {0}")]
    IndexStoreUnavailable(String),

    /// Recoverable: results keep their rank but lose metadata fields
    #[error("Metadata store unavailable: {0}")]
    MetadataStoreUnavailable(String),

    /// Recoverable: results keep their rank but lose snippets
    #[error("Content store unavailable: {0}")]
    ContentStoreUnavailable(String),
}

impl SearchError {
    /// Wrap a store failure into the kind matching the store it came from
    pub fn unavailable(store: StoreKind, cause: impl std::fmt::Display) -> Self {
        let message = cause.to_string();
        match store {
            StoreKind::Index => SearchError::IndexStoreUnavailable(message),
            StoreKind::Metadata => SearchError::MetadataStoreUnavailable(message),
            StoreKind::Content => SearchError::ContentStoreUnavailable(message),
        }
    }

    pub fn store(&self) -> StoreKind {
        match self {
            SearchError::IndexStoreUnavailable(_) => StoreKind::Index,
            SearchError::MetadataStoreUnavailable(_) => StoreKind::Metadata,
            SearchError::ContentStoreUnavailable(_) => StoreKind::Content,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::IndexStoreUnavailable(_) => "index_store_unavailable",
            SearchError::MetadataStoreUnavailable(_) => "metadata_store_unavailable",
            SearchError::ContentStoreUnavailable(_) => "content_store_unavailable",
        }
    }

    /// Whether the request can still produce a (degraded) result page
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SearchError::IndexStoreUnavailable(_))
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_recoverable() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let body = SearchFailureResponse {
            error: "Search failed".to_string(),
            kind: self.kind().to_string(),
            message: self.to_string(),
            results: Vec::new(),
            partial: true,
        };
        (self.status_code(), Json(body)).into_response()
    }
}
