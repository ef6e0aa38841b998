// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

/// Shortest token, in characters, the index holds
pub const MIN_TOKEN_CHARS: usize = 3;

/// Reduce a raw query to index tokens: lowercase, split on whitespace, drop
/// tokens of two characters or fewer.
///
/// Duplicates are kept; the index store matches tokens as a set.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_folds_case_and_splits() {
        assert_eq!(
            tokenize("The Quick Brown Fox"),
            vec!["the", "quick", "brown", "fox"]
        );
    }

    #[test]
    fn test_tokenize_drops_short_tokens() {
        assert_eq!(tokenize("a rust is ok to learn"), vec!["rust", "learn"]);
    }

    #[test]
    fn test_tokenize_empty_inputs() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n ").is_empty());
        assert!(tokenize("a an to of").is_empty());
    }

    #[test]
    fn test_tokenize_collapses_whitespace_runs() {
        assert_eq!(tokenize("  search\t\tengine \n  index "), vec!["search", "engine", "index"]);
    }

    #[test]
    fn test_tokenize_keeps_duplicates() {
        assert_eq!(tokenize("rust Rust RUST"), vec!["rust", "rust", "rust"]);
    }

    #[test]
    fn test_tokenize_counts_characters_not_bytes() {
        // "ñu" is two characters but three bytes
        assert_eq!(tokenize("ñu café"), vec!["café"]);
    }

    #[test]
    fn test_tokenize_minimum_length_boundary() {
        let short = "x".repeat(MIN_TOKEN_CHARS - 1);
        let shortest = "y".repeat(MIN_TOKEN_CHARS);
        assert_eq!(tokenize(&format!("{} {}", short, shortest)), vec![shortest]);
    }

    #[test]
    fn test_tokenize_keeps_punctuation() {
        assert_eq!(tokenize("C++ rust-lang"), vec!["c++", "rust-lang"]);
    }
}
