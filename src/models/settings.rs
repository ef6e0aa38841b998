// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const DEFAULT_MAX_PAGE_LIMIT: u32 = 100;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

/// Tunables for the search core and its HTTP adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Page size used when the request does not give one
    pub default_limit: u32,
    /// Upper bound on the requested page size
    pub max_limit: u32,
    /// Deadline for any single store call; an elapsed call counts as unavailable
    pub store_timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: DEFAULT_MAX_PAGE_LIMIT,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        }
    }
}

impl SearchSettings {
    /// Load from `SEARCH_DEFAULT_LIMIT`, `SEARCH_MAX_LIMIT` and `STORE_TIMEOUT_MS`,
    /// each optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let default_limit = parse_var(&lookup, "SEARCH_DEFAULT_LIMIT", defaults.default_limit)?;
        let max_limit = parse_var(&lookup, "SEARCH_MAX_LIMIT", defaults.max_limit)?;
        let timeout_ms = parse_var(&lookup, "STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS)?;

        if default_limit == 0 || max_limit == 0 {
            return Err(anyhow!("SEARCH_DEFAULT_LIMIT and SEARCH_MAX_LIMIT must be at least 1"));
        }
        if default_limit > max_limit {
            return Err(anyhow!(
                "SEARCH_DEFAULT_LIMIT ({}) cannot exceed SEARCH_MAX_LIMIT ({})",
                default_limit,
                max_limit
            ));
        }

        Ok(Self {
            default_limit,
            max_limit,
            store_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} must be a valid number, got: {}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = SearchSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, SearchSettings::default());
        assert_eq!(settings.default_limit, 10);
        assert_eq!(settings.store_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_reads_overrides() {
        let settings = SearchSettings::from_lookup(lookup(&[
            ("SEARCH_DEFAULT_LIMIT", "20"),
            ("SEARCH_MAX_LIMIT", "50"),
            ("STORE_TIMEOUT_MS", "750"),
        ]))
        .unwrap();
        assert_eq!(settings.default_limit, 20);
        assert_eq!(settings.max_limit, 50);
        assert_eq!(settings.store_timeout, Duration::from_millis(750));
    }

    #[test]
    fn test_rejects_non_numeric() {
        let err = SearchSettings::from_lookup(lookup(&[("STORE_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("STORE_TIMEOUT_MS"));
    }

    #[test]
    fn test_rejects_default_above_max() {
        let result = SearchSettings::from_lookup(lookup(&[
            ("SEARCH_DEFAULT_LIMIT", "200"),
            ("SEARCH_MAX_LIMIT", "100"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_limit() {
        let result = SearchSettings::from_lookup(lookup(&[("SEARCH_DEFAULT_LIMIT", "0")]));
        assert!(result.is_err());
    }
}
