// src/audit/filter.rs
// =============================================================================
// Decides which checked links show up in the report details.
//
// Users ask for statuses in three shapes, and may mix them freely:
// - an exact status code:   "404"
// - a category tag:         "4xx", "Timeout", "ConnectionError", "InvalidURL"
// - the wildcard:           "*"  (everything)
//
// The token "Other" is shorthand for the three failure tags.
//
// The filter only ever affects which detail rows are shown. Summary counts
// are always computed over every outcome.
// =============================================================================

use std::collections::HashSet;

use super::checker::{Category, CheckOutcome};

/// Expands to every failure tag
pub const OTHER_TOKEN: &str = "Other";

/// Matches everything
pub const WILDCARD_TOKEN: &str = "*";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFilter {
    tokens: HashSet<String>,
}

impl StatusFilter {
    // Builds a filter from the requested tokens
    //
    // Surrounding whitespace is trimmed and empty tokens are ignored.
    // "Other" is kept alongside its expansion, so asking for ["Other", "404"]
    // matches the three failure tags and 404.
    pub fn new<I, S>(requested: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens: HashSet<String> = requested
            .into_iter()
            .map(|token| token.as_ref().trim().to_string())
            .filter(|token| !token.is_empty())
            .collect();

        if tokens.contains(OTHER_TOKEN) {
            tokens.extend(Category::FAILURE_TAGS.iter().map(|tag| tag.to_string()));
        }

        Self { tokens }
    }

    pub fn is_wildcard(&self) -> bool {
        self.tokens.contains(WILDCARD_TOKEN)
    }

    // True if the outcome's category, or its status code written as a
    // string, was requested
    pub fn matches(&self, outcome: &CheckOutcome) -> bool {
        if self.is_wildcard() {
            return true;
        }

        if self.tokens.contains(&outcome.category().to_string()) {
            return true;
        }

        outcome
            .status_code()
            .map(|code| self.tokens.contains(&code.to_string()))
            .unwrap_or(false)
    }
}
