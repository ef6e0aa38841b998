// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Record counts per store. A field is absent when its store could not be counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    /// Documents in the metadata store
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub documents: Option<u64>,
    /// Distinct tokens in the index store
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tokens: Option<u64>,
    /// Records in the content store
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content_docs: Option<u64>,
}

/// Liveness of a single store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    Connected,
    Disconnected,
}

impl StoreStatus {
    pub fn from_probe<E>(probe: &Result<(), E>) -> Self {
        if probe.is_ok() {
            StoreStatus::Connected
        } else {
            StoreStatus::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, StoreStatus::Connected)
    }
}

/// Overall service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoreHealth {
    pub index: StoreStatus,
    pub metadata: StoreStatus,
    pub content: StoreStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub stores: StoreHealth,
}

impl HealthResponse {
    /// `ok` only when every store answered its probe
    pub fn from_stores(stores: StoreHealth) -> Self {
        let all_connected = [stores.index, stores.metadata, stores.content]
            .iter()
            .all(StoreStatus::is_connected);

        let status = if all_connected {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        };

        Self { status, stores }
    }
}
