// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod search;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod store;
pub mod version;
