//! Item table: the ordered, sortable projection of a folder's fetched items
//!
//! The UI binds to this table. It is only ever mutated on the control thread,
//! and a fetch result replaces its contents in one step.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{WorkItem, WorkItemId};

/// Tables larger than this are sorted on the rayon pool
const PARALLEL_SORT_THRESHOLD: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One column of a multi-column sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Ordered rows plus the sort order to keep them in
#[derive(Debug, Clone, Default)]
pub struct ItemTable {
    rows: Vec<WorkItem>,
    sort: Vec<SortKey>,
}

impl ItemTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with an initial sort order
    pub fn with_sort(sort: Vec<SortKey>) -> Self {
        Self {
            rows: Vec::new(),
            sort,
        }
    }

    pub fn rows(&self) -> &[WorkItem] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WorkItem> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkItem> {
        self.rows.iter()
    }

    /// Row index of an item
    pub fn position(&self, id: &WorkItemId) -> Option<usize> {
        self.rows.iter().position(|row| &row.id == id)
    }

    pub fn ids(&self) -> Vec<WorkItemId> {
        self.rows.iter().map(|row| row.id.clone()).collect()
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort
    }

    /// Change the sort order and re-sort the current rows.
    ///
    /// An empty key list keeps rows in the order the service returned them.
    pub fn set_sort(&mut self, sort: Vec<SortKey>) {
        self.sort = sort;
        self.apply_sort();
    }

    /// Replace all rows (clear + bulk insert) and re-apply the sort order
    pub fn replace_all(&mut self, items: Vec<WorkItem>) {
        self.rows = items;
        self.apply_sort();
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    fn apply_sort(&mut self) {
        if self.sort.is_empty() {
            return;
        }
        let keys = &self.sort;
        // Both sorts are stable, so ties keep service order
        if self.rows.len() > PARALLEL_SORT_THRESHOLD {
            self.rows.par_sort_by(|a, b| compare_rows(a, b, keys));
        } else {
            self.rows.sort_by(|a, b| compare_rows(a, b, keys));
        }
    }
}

fn compare_rows(a: &WorkItem, b: &WorkItem, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ord = a.field(&key.column).cmp(b.field(&key.column));
        let ord = match key.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemKind;

    fn item(id: &str, modality: &str, priority: i64) -> WorkItem {
        WorkItem::new(id, ItemKind::PROCEDURE)
            .with_field("modality", modality)
            .with_field("priority", priority)
    }

    fn ids(table: &ItemTable) -> Vec<&str> {
        table.iter().map(|row| row.id.as_str()).collect()
    }

    #[test]
    fn test_unsorted_keeps_service_order() {
        let mut table = ItemTable::new();
        table.replace_all(vec![item("b", "MR", 1), item("a", "CT", 2)]);
        assert_eq!(ids(&table), vec!["b", "a"]);
    }

    #[test]
    fn test_replace_all_applies_sort() {
        let mut table = ItemTable::with_sort(vec![SortKey::ascending("modality")]);
        table.replace_all(vec![item("1", "MR", 1), item("2", "CT", 1), item("3", "US", 1)]);
        assert_eq!(ids(&table), vec!["2", "1", "3"]);

        // A second fetch replaces everything
        table.replace_all(vec![item("4", "XR", 1)]);
        assert_eq!(ids(&table), vec!["4"]);
    }

    #[test]
    fn test_multi_key_sort() {
        let mut table = ItemTable::new();
        table.replace_all(vec![
            item("1", "MR", 1),
            item("2", "CT", 1),
            item("3", "MR", 3),
            item("4", "CT", 2),
        ]);
        table.set_sort(vec![
            SortKey::ascending("modality"),
            SortKey::descending("priority"),
        ]);
        assert_eq!(ids(&table), vec!["4", "2", "3", "1"]);
    }

    #[test]
    fn test_missing_values_sort_first() {
        let mut table = ItemTable::with_sort(vec![SortKey::ascending("room")]);
        table.replace_all(vec![
            WorkItem::new("a", ItemKind::PROCEDURE).with_field("room", "R2"),
            WorkItem::new("b", ItemKind::PROCEDURE),
        ]);
        assert_eq!(ids(&table), vec!["b", "a"]);
    }

    #[test]
    fn test_large_table_sort_is_stable() {
        let items: Vec<WorkItem> = (0..5000)
            .map(|i| item(&format!("{}", i), if i % 2 == 0 { "CT" } else { "MR" }, 0))
            .collect();
        let mut table = ItemTable::with_sort(vec![SortKey::ascending("modality")]);
        table.replace_all(items);

        assert_eq!(table.len(), 5000);
        assert_eq!(table.get(0).unwrap().id.as_str(), "0");
        assert_eq!(table.get(1).unwrap().id.as_str(), "2");
        assert_eq!(table.get(2500).unwrap().id.as_str(), "1");
    }

    #[test]
    fn test_position() {
        let mut table = ItemTable::new();
        table.replace_all(vec![item("a", "CT", 1), item("b", "CT", 1)]);
        assert_eq!(table.position(&WorkItemId::new("b")), Some(1));
        assert_eq!(table.position(&WorkItemId::new("z")), None);
    }
}
