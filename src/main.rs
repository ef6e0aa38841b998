// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{Context, Result};
use clap::Parser;
use fedsearch::app::{create_router, AppState, VERSION};
use fedsearch::models::settings::SearchSettings;
use fedsearch::services::aggregator::SearchAggregator;
use fedsearch::services::db::{IndexStoreConfig, PgIndexStore};
use fedsearch::services::logging::init_tracing;
use fedsearch::services::search::{MeiliMetadataStore, MetadataStoreConfig};
use fedsearch::services::storage::{S3Config, S3ContentStore};
use fedsearch::services::stores::StoreClients;
use std::net::SocketAddr;
use std::sync::Arc;

/// Federated search API over the index, metadata and content stores.
/// Store connections are configured through environment variables.
#[derive(Parser, Debug)]
#[command(version = VERSION, about)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3001")]
    listen: SocketAddr,

    /// Tracing filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_filter: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(&args.log_filter);

    if let Err(e) = run(args).await {
        tracing::error!(error = ?e, "fedsearch terminated");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let settings = SearchSettings::from_env()?;
    let stores = connect_stores().await?;

    let aggregator = SearchAggregator::new(stores, &settings);
    let app = create_router(AppState::new(aggregator, settings));

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;

    tracing::info!(version = VERSION, addr = %args.listen, "fedsearch listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

/// Build the three store clients. None of them needs its store to be up:
/// an unreachable store shows up in health checks and degrades searches.
async fn connect_stores() -> Result<StoreClients> {
    let index = PgIndexStore::connect_lazy(&IndexStoreConfig::from_env()?)?;

    let metadata = MeiliMetadataStore::new(&MetadataStoreConfig::from_env()?)?;
    if let Err(e) = metadata.init_index().await {
        tracing::warn!(error = %e, "failed to apply metadata index settings");
    }

    let content = S3ContentStore::new(&S3Config::from_env()?)?;

    Ok(StoreClients {
        index: Arc::new(index),
        metadata: Arc::new(metadata),
        content: Arc::new(content),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
