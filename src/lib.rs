// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Federated search over an inverted index, a metadata catalog and a content
//! store that are owned and operated independently.

pub mod app;
pub mod error;
pub mod models;
pub mod services;
