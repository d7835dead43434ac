// src/documents/mod.rs
// =============================================================================
// Everything that happens before the audit: finding Markdown documents and
// pulling link occurrences out of them.
//
// Submodules:
// - local: Walks a folder for .md files
// - github: Fetches a repository README from GitHub
// - markdown: Extracts links, images, code fences and titles from Markdown text
// =============================================================================

mod github;
mod local;
mod markdown;

pub use github::fetch_repo_readme;
pub use local::{load_folder, read_folder};
pub use markdown::{extract_occurrences, extract_references, fence_tags, is_external};

use crate::audit::LinkOccurrence;

// One Markdown document to audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Stable identifier, e.g. "docs/guide.md"
    pub id: String,
    /// First H1 heading, or a placeholder
    pub title: String,
    pub content: String,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: id.into(),
            title: markdown::extract_title(&content),
            content,
        }
    }
}

/// All occurrences of all documents, in document order
pub fn collect_occurrences(documents: &[Document]) -> Vec<LinkOccurrence> {
    documents.iter().flat_map(extract_occurrences).collect()
}
