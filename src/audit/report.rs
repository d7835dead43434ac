// src/audit/report.rs
// =============================================================================
// Turns the raw outcomes of a finished check into an AuditReport.
//
// Two things come out of this step:
// - status_counts: how many URLs fell into each category (ALWAYS over every
//   outcome, no matter what the user filtered on)
// - details: one row per (occurrence, outcome) pair that passed the filter
//
// Outcomes arrive in whatever order the network finished them. Rows are
// emitted in the order the occurrences were originally supplied, so the
// same input always produces the same report.
// =============================================================================

use std::collections::{BTreeMap, HashMap};

use super::checker::{Category, CheckOutcome};
use super::filter::StatusFilter;
use super::occurrence::OccurrenceTable;

// One (occurrence, outcome) pair surfaced in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    /// Document the link was found in
    pub document: String,
    /// Link text, or "[Image]"
    pub anchor: String,
    /// The URL as written
    pub link: String,
    /// Absent when the probe never got an HTTP response
    pub status_code: Option<u16>,
    pub status_category: Category,
}

// The result of one audit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Unique URLs that were actually probed
    pub total_checked: usize,
    /// Category -> count, over all outcomes
    pub status_counts: BTreeMap<String, usize>,
    /// Filtered rows, in occurrence order
    pub details: Vec<DetailRow>,
    /// True when the audit was stopped before every URL was claimed
    pub cancelled: bool,
}

impl AuditReport {
    /// The report for an audit with nothing to check
    pub fn empty() -> Self {
        Self::default()
    }

    // Number of probed URLs whose category counts as broken
    // (4xx, 5xx, Timeout, ConnectionError, InvalidURL)
    pub fn broken_count(&self) -> usize {
        self.broken_categories().map(|(_, count)| count).sum()
    }

    /// Broken categories with their counts, in category order
    pub fn broken_categories(&self) -> impl Iterator<Item = (&str, usize)> {
        self.status_counts
            .iter()
            .filter(|(category, _)| is_broken_tag(category))
            .map(|(category, count)| (category.as_str(), *count))
    }
}

fn is_broken_tag(tag: &str) -> bool {
    match tag.strip_suffix("xx").and_then(|class| class.parse::<u16>().ok()) {
        Some(class) => Category::Http(class).is_broken(),
        None => true,
    }
}

// Builds the report from the finished outcomes
//
// Parameters:
//   outcomes: one per probed URL, any order
//   table: the occurrence table the probe set came from
//   filter: which outcomes get detail rows
//   cancelled: whether the check phase was cut short
pub fn aggregate(
    outcomes: Vec<CheckOutcome>,
    table: &OccurrenceTable,
    filter: &StatusFilter,
    cancelled: bool,
) -> AuditReport {
    let mut status_counts = BTreeMap::new();
    for outcome in &outcomes {
        *status_counts.entry(outcome.category().to_string()).or_insert(0) += 1;
    }

    let total_checked = outcomes.len();

    // Only outcomes that pass the filter can produce rows
    let selected: HashMap<&str, &CheckOutcome> = outcomes
        .iter()
        .filter(|outcome| filter.matches(outcome))
        .map(|outcome| (outcome.url(), outcome))
        .collect();

    // Walk occurrences in input order; unprobed URLs (after a cancel) and
    // filtered-out URLs have no entry and are skipped
    let details = table
        .occurrences()
        .iter()
        .filter_map(|occurrence| {
            selected.get(occurrence.url.as_str()).map(|outcome| DetailRow {
                document: occurrence.document_id.clone(),
                anchor: occurrence.anchor_text.clone(),
                link: occurrence.url.clone(),
                status_code: outcome.status_code(),
                status_category: outcome.category(),
            })
        })
        .collect();

    AuditReport {
        total_checked,
        status_counts,
        details,
        cancelled,
    }
}
