// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::search::{ContentRecord, DocumentId, MetadataRecord, ResultRecord, ScoredMatch};
use std::collections::HashMap;

/// Characters of content kept in a snippet
pub const SNIPPET_MAX_CHARS: usize = 200;

/// Appended to snippets cut from longer content
pub const TRUNCATION_MARKER: &str = "...";

/// Title shown for documents without catalog metadata
pub const UNTITLED: &str = "Untitled";

/// Merge ranked matches with whatever enrichment was found, keeping rank order.
///
/// Missing metadata or content only lowers the quality of individual fields;
/// every match yields exactly one record.
pub fn assemble(
    matches: &[ScoredMatch],
    metadata: &HashMap<DocumentId, MetadataRecord>,
    content: &HashMap<DocumentId, ContentRecord>,
) -> Vec<ResultRecord> {
    matches
        .iter()
        .map(|scored| {
            let meta = metadata.get(&scored.document_id);
            let snippet = content
                .get(&scored.document_id)
                .map(|record| derive_snippet(&record.content))
                .unwrap_or_default();

            build_record(scored, meta, snippet)
        })
        .collect()
}

fn build_record(
    scored: &ScoredMatch,
    meta: Option<&MetadataRecord>,
    snippet: String,
) -> ResultRecord {
    let description = meta
        .and_then(|m| non_empty(m.description.as_deref()))
        .map(str::to_string)
        .unwrap_or_else(|| snippet.clone());

    let title = meta
        .and_then(|m| non_empty(m.title.as_deref()))
        .unwrap_or(UNTITLED)
        .to_string();

    ResultRecord {
        document_id: scored.document_id.clone(),
        url: meta.map(|m| m.url.clone()).unwrap_or_default(),
        title,
        description,
        snippet,
        score: scored.score,
        source: meta.and_then(|m| m.source.clone()).unwrap_or_default(),
        crawl_timestamp: meta.and_then(|m| m.crawl_timestamp),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// First [`SNIPPET_MAX_CHARS`] characters of `body`, marked when cut
pub fn derive_snippet(body: &str) -> String {
    match body.char_indices().nth(SNIPPET_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &body[..cut], TRUNCATION_MARKER),
        None => body.to_string(),
    }
}
