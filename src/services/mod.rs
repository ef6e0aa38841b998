// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod aggregator;
pub mod assembler;
pub mod db;
pub mod enrichment;
pub mod logging;
pub mod memory;
pub mod resolver;
pub mod search;
pub mod storage;
pub mod stores;
pub mod tokenizer;
