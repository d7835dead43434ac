// src/inspect/links.rs
// =============================================================================
// Lists links without checking them.
//
// Useful before an audit ("which pages still point at the old domain?") or
// on its own ("which pages link to other pages of the docs?").
//
// A link is internal when its destination is not an absolute http(s) URL,
// so "./guide.md" and "../api/index.md" are internal and
// "https://docs.rs" is external. In-page "#fragment" jumps are not links
// for this purpose.
// =============================================================================

use serde::Serialize;

use crate::documents::{self, Document};

// Which links a scan keeps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkScope {
    Internal,
    External,
    /// Destinations that start with this exact prefix
    StartingWith(String),
}

impl LinkScope {
    pub fn matches(&self, url: &str) -> bool {
        match self {
            LinkScope::Internal => !documents::is_external(url),
            LinkScope::External => documents::is_external(url),
            LinkScope::StartingWith(prefix) => url.starts_with(prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRow {
    pub file: String,
    pub title: String,
    pub anchor: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkScanCounts {
    pub files_scanned: usize,
    /// Documents with at least one matching link
    pub files_with_matches: usize,
    pub total_links_found: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkScan {
    pub analytics: LinkScanCounts,
    pub details: Vec<LinkRow>,
}

// Collects every link of `documents` that falls in `scope`
//
// Rows come out in document order, then in the order the links appear.
pub fn scan_links(documents: &[Document], scope: &LinkScope) -> LinkScan {
    let mut scan = LinkScan::default();
    scan.analytics.files_scanned = documents.len();

    for document in documents {
        let before = scan.details.len();

        scan.details.extend(
            documents::extract_references(document)
                .into_iter()
                .filter(|reference| scope.matches(&reference.url))
                .map(|reference| LinkRow {
                    file: document.id.clone(),
                    title: document.title.clone(),
                    anchor: reference.anchor,
                    link: reference.url,
                }),
        );

        if scan.details.len() > before {
            scan.analytics.files_with_matches += 1;
        }
    }

    scan.analytics.total_links_found = scan.details.len();
    scan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn documents() -> Vec<Document> {
        vec![
            Document::new(
                "README.md",
                "# Project\n\nRead the [guide](docs/guide.md), then [crates.io](https://crates.io/crates/x).\n\
                 Jump to [usage](#usage).",
            ),
            Document::new(
                "docs/guide.md",
                "# Guide\n\n[old docs](https://old.example/docs) and [old api](https://old.example/api)\n\
                 ![diagram](https://cdn.example/d.png)",
            ),
            Document::new("docs/empty.md", "No links at all."),
        ]
    }

    fn links(scan: &LinkScan) -> Vec<&str> {
        scan.details.iter().map(|row| row.link.as_str()).collect()
    }

    #[test]
    fn test_internal_links() {
        let scan = scan_links(&documents(), &LinkScope::Internal);

        assert_eq!(links(&scan), vec!["docs/guide.md"]);
        assert_eq!(scan.details[0].anchor, "guide");
        assert_eq!(scan.details[0].title, "Project");
        assert_eq!(scan.analytics.files_with_matches, 1);
    }

    #[test]
    fn test_external_links() {
        let scan = scan_links(&documents(), &LinkScope::External);

        assert_eq!(
            links(&scan),
            vec![
                "https://crates.io/crates/x",
                "https://old.example/docs",
                "https://old.example/api",
                "https://cdn.example/d.png",
            ]
        );
        assert_eq!(
            scan.analytics,
            LinkScanCounts {
                files_scanned: 3,
                files_with_matches: 2,
                total_links_found: 4,
            }
        );
    }

    #[test]
    fn test_prefix() {
        let scan = scan_links(&documents(), &LinkScope::StartingWith("https://old.example/".to_string()));

        assert_eq!(links(&scan), vec!["https://old.example/docs", "https://old.example/api"]);
        assert!(scan.details.iter().all(|row| row.file == "docs/guide.md"));
        assert_eq!(scan.analytics.files_with_matches, 1);
    }

    #[test]
    fn test_no_documents() {
        let scan = scan_links(&[], &LinkScope::External);
        assert_eq!(scan, LinkScan::default());
    }
}
