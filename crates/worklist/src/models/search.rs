//! Search parameters for search-driven folders

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::WorkItem;

/// User-supplied search criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text terms, whitespace separated
    pub terms: String,
    /// Exact-match field filters (field name -> value)
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl SearchParams {
    pub fn new(terms: impl Into<String>) -> Self {
        Self {
            terms: terms.into(),
            filters: BTreeMap::new(),
        }
    }

    /// Builder method to add a field filter
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Number of alphanumeric characters in the free-text terms.
    ///
    /// Wildcards and punctuation do not narrow a search, so they don't count.
    pub fn significant_len(&self) -> usize {
        self.terms.chars().filter(|c| c.is_alphanumeric()).count()
    }

    /// Lowercased free-text terms
    pub fn term_list(&self) -> Vec<String> {
        self.terms
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect()
    }

    /// Check whether an item satisfies every term and every filter.
    ///
    /// A term matches when it occurs (case-insensitively) in any text field.
    pub fn matches(&self, item: &WorkItem) -> bool {
        let texts: Vec<String> = item.text_fields().map(|t| t.to_lowercase()).collect();
        let terms_match = self
            .term_list()
            .iter()
            .all(|term| texts.iter().any(|text| text.contains(term.as_str())));

        terms_match
            && self
                .filters
                .iter()
                .all(|(field, value)| item.field(field).to_string() == *value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemKind;

    fn item() -> WorkItem {
        WorkItem::new("p1", ItemKind::PROCEDURE)
            .with_field("patient", "Doe, Jane")
            .with_field("modality", "CT")
            .with_field("priority", 2)
    }

    #[test]
    fn test_significant_len_ignores_wildcards() {
        assert_eq!(SearchParams::new("d* ").significant_len(), 1);
        assert_eq!(SearchParams::new("doe jane").significant_len(), 7);
    }

    #[test]
    fn test_terms_match_case_insensitive() {
        assert!(SearchParams::new("DOE jane").matches(&item()));
        assert!(!SearchParams::new("smith").matches(&item()));
    }

    #[test]
    fn test_filters_match_exactly() {
        assert!(SearchParams::new("").with_filter("modality", "CT").matches(&item()));
        assert!(SearchParams::new("doe").with_filter("priority", "2").matches(&item()));
        assert!(!SearchParams::new("doe").with_filter("modality", "MR").matches(&item()));
    }
}
