// src/audit/occurrence.rs
// =============================================================================
// This module turns a pile of raw link occurrences into the set of URLs we
// actually need to check.
//
// A documentation tree usually links to the same handful of pages over and
// over (the project homepage, the crate docs, a badge image...). We want to
// hit each of those URLs exactly once, but still be able to say "this URL
// appears in README.md as 'docs' and in guide.md as 'API reference'".
//
// The OccurrenceTable keeps both views:
// - the occurrences themselves, in the order they were handed to us
// - for every distinct URL, the positions of its occurrences
//
// Rust concepts:
// - HashMap: O(1) lookup from URL to its occurrences
// - Index-based references: store positions instead of cloned data
// =============================================================================

use std::collections::HashMap;

// One place in one document where a URL is referenced
//
// The URL is kept exactly as written in the source, never canonicalized:
// "https://example.com" and "https://example.com/" are two different URLs
// here, just as they are two different strings in the Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOccurrence {
    /// The URL as written in the document
    pub url: String,
    /// Stable identifier of the source document (e.g. "docs/guide.md")
    pub document_id: String,
    /// Link text, or the "[Image]" sentinel for embedded images
    pub anchor_text: String,
}

impl LinkOccurrence {
    pub fn new(
        url: impl Into<String>,
        document_id: impl Into<String>,
        anchor_text: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            document_id: document_id.into(),
            anchor_text: anchor_text.into(),
        }
    }
}

// Every accepted occurrence, grouped by URL
//
// Built once per audit by `deduplicate` and never mutated afterwards, so
// the checker workers and the aggregator can read it without locking.
#[derive(Debug, Default)]
pub struct OccurrenceTable {
    // Accepted occurrences in input order
    occurrences: Vec<LinkOccurrence>,
    // Distinct URLs in first-seen order
    urls: Vec<String>,
    // URL -> indexes into `occurrences`
    by_url: HashMap<String, Vec<usize>>,
}

impl OccurrenceTable {
    /// Distinct URLs, first-seen order. This is the probe set.
    pub fn unique_urls(&self) -> &[String] {
        &self.urls
    }

    /// All accepted occurrences in the order they were supplied
    pub fn occurrences(&self) -> &[LinkOccurrence] {
        &self.occurrences
    }

    /// The occurrences of one URL, in the order they were supplied
    pub fn occurrences_of<'a>(&'a self, url: &str) -> impl Iterator<Item = &'a LinkOccurrence> + 'a {
        self.by_url
            .get(url)
            .into_iter()
            .flatten()
            .map(move |&index| &self.occurrences[index])
    }

    fn insert(&mut self, occurrence: LinkOccurrence) {
        let index = self.occurrences.len();

        match self.by_url.get_mut(&occurrence.url) {
            Some(indexes) => indexes.push(index),
            None => {
                self.urls.push(occurrence.url.clone());
                self.by_url.insert(occurrence.url.clone(), vec![index]);
            }
        }

        self.occurrences.push(occurrence);
    }
}

// Collapses raw occurrences into an OccurrenceTable
//
// Occurrences with an empty (or whitespace-only) URL are dropped silently:
// a bad extraction must never abort the whole batch.
pub fn deduplicate<I>(occurrences: I) -> OccurrenceTable
where
    I: IntoIterator<Item = LinkOccurrence>,
{
    let mut table = OccurrenceTable::default();

    for occurrence in occurrences {
        if occurrence.url.trim().is_empty() {
            continue;
        }
        table.insert(occurrence);
    }

    table
}
