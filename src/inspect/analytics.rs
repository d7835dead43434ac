// src/inspect/analytics.rs
// =============================================================================
// Folder-wide numbers that hint at documentation health:
//
// - total lines
// - internal vs external links
// - fenced code blocks with and without a language tag
// - stub pages (fewer than STUB_WORD_COUNT words)
// - TODO / FIXME / XXX markers, in any case
// =============================================================================

use serde::Serialize;

use crate::documents::{self, Document};

/// A page with fewer words than this counts as a stub
pub const STUB_WORD_COUNT: usize = 100;

const TODO_MARKERS: [&[u8]; 3] = [b"todo", b"fixme", b"xxx"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeBlockCounts {
    pub total: usize,
    pub tagged: usize,
    pub untagged: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkCounts {
    pub total_external: usize,
    pub total_internal: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentCounts {
    pub stubs: usize,
    pub todos: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FolderAnalytics {
    pub files_scanned: usize,
    pub total_lines: usize,
    pub code_blocks: CodeBlockCounts,
    pub links: LinkCounts,
    pub content: ContentCounts,
}

pub fn analyze(documents: &[Document]) -> FolderAnalytics {
    let mut analytics = FolderAnalytics {
        files_scanned: documents.len(),
        ..FolderAnalytics::default()
    };

    for document in documents {
        let content = &document.content;

        analytics.total_lines += content.split('\n').count();

        for tag in documents::fence_tags(content) {
            analytics.code_blocks.total += 1;
            if tag.is_empty() {
                analytics.code_blocks.untagged += 1;
            } else {
                analytics.code_blocks.tagged += 1;
            }
        }

        for reference in documents::extract_references(document) {
            if documents::is_external(&reference.url) {
                analytics.links.total_external += 1;
            } else {
                analytics.links.total_internal += 1;
            }
        }

        if word_count(content) < STUB_WORD_COUNT {
            analytics.content.stubs += 1;
        }
        analytics.content.todos += todo_count(content);
    }

    analytics
}

// Runs of letters, digits and underscores
fn word_count(text: &str) -> usize {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .count()
}

// Non-overlapping TODO/FIXME/XXX markers, case-insensitive
//
// Markers are matched anywhere, so "XXXX" is one marker and "todos" is one.
fn todo_count(text: &str) -> usize {
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();

    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        match TODO_MARKERS.iter().find(|marker| bytes[i..].starts_with(marker)) {
            Some(marker) => {
                count += 1;
                i += marker.len();
            }
            None => i += 1,
        }
    }
    count
}
