// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, route handlers, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::error::SearchError;
use crate::models::search::{
    ResultRecord, SearchFailureResponse, SearchParams, SearchResponse,
};
use crate::models::settings::SearchSettings;
use crate::models::stats::{
    HealthResponse, HealthStatus, StatsResponse, StoreHealth, StoreStatus,
};
use crate::models::store::StoreKind;
use crate::models::version::VersionResponse;
use crate::services::aggregator::SearchAggregator;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `FEDSEARCH_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("FEDSEARCH_VERSION");

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<SearchAggregator>,
    pub settings: SearchSettings,
}

impl AppState {
    pub fn new(aggregator: SearchAggregator, settings: SearchSettings) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            settings,
        }
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

pub async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "fedsearch".to_string(),
        version: VERSION.to_string(),
    })
}

/// Ranked, enriched page of results for a free-text query
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Result page; `partial` is set when enrichment was incomplete", body = SearchResponse),
        (status = 503, description = "Index store unavailable, no ranking possible", body = SearchFailureResponse)
    )
)]
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, SearchError> {
    let request = params.normalize(&state.settings);
    state.aggregator.search(request).await.map(Json)
}

/// Record counts per store; a store that cannot be counted is omitted
#[utoipa::path(
    get,
    path = "/api/stats",
    responses((status = 200, description = "Per-store counts", body = StatsResponse))
)]
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.aggregator.stats().await)
}

/// Liveness of each store and the overall status
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Store liveness", body = HealthResponse))
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.aggregator.health().await)
}

// ---------------------------------------------------------------------------
// OpenAPI
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(search_handler, stats_handler, health_handler),
    components(schemas(
        SearchResponse,
        SearchFailureResponse,
        ResultRecord,
        StoreKind,
        StatsResponse,
        HealthResponse,
        HealthStatus,
        StoreHealth,
        StoreStatus
    )),
    tags((name = "search", description = "Federated search API"))
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the Axum application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/version", get(version_handler))
        .route("/api/search", get(search_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/health", get(health_handler))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
