//! In-memory worklist service
//!
//! Used by the host binary and tests in place of the remote service.

use anyhow::{Result, anyhow, bail};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{QueryRequest, QueryResponse, WorklistService};
use crate::models::{FolderClass, WorkItem, WorkItemId};

/// In-memory implementation of WorklistService
///
/// Worklists are keyed by folder class and keep insertion order. Queries that
/// carry search parameters run across every worklist.
pub struct InMemoryWorklistService {
    worklists: RwLock<HashMap<FolderClass, Vec<WorkItem>>>,
    available: AtomicBool,
    query_count: AtomicUsize,
}

impl InMemoryWorklistService {
    /// Create a new empty service
    pub fn new() -> Self {
        Self {
            worklists: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            query_count: AtomicUsize::new(0),
        }
    }

    /// Append an item to a worklist
    pub fn add_item(&self, class: impl Into<FolderClass>, item: WorkItem) -> Result<()> {
        let mut worklists = self.write()?;
        worklists.entry(class.into()).or_default().push(item);
        Ok(())
    }

    /// Replace a worklist's contents
    pub fn set_worklist(&self, class: impl Into<FolderClass>, items: Vec<WorkItem>) -> Result<()> {
        let mut worklists = self.write()?;
        worklists.insert(class.into(), items);
        Ok(())
    }

    /// Move items from one worklist to the end of another.
    ///
    /// Returns false (and moves nothing) unless every item is in `from`.
    pub fn move_items(&self, ids: &[WorkItemId], from: &FolderClass, to: &FolderClass) -> Result<bool> {
        let mut worklists = self.write()?;
        let wanted: HashSet<&WorkItemId> = ids.iter().collect();

        let source = worklists.entry(from.clone()).or_default();
        let present = source.iter().filter(|item| wanted.contains(&item.id)).count();
        if present != wanted.len() {
            return Ok(false);
        }

        let (moved, kept): (Vec<WorkItem>, Vec<WorkItem>) = source
            .drain(..)
            .partition(|item| wanted.contains(&item.id));
        *source = kept;
        worklists.entry(to.clone()).or_default().extend(moved);
        Ok(true)
    }

    /// Number of items in a worklist
    pub fn count(&self, class: &FolderClass) -> Result<usize> {
        let worklists = self.read()?;
        Ok(worklists.get(class).map_or(0, Vec::len))
    }

    /// Check whether a worklist contains an item
    pub fn contains(&self, class: &FolderClass, id: &WorkItemId) -> Result<bool> {
        let worklists = self.read()?;
        Ok(worklists
            .get(class)
            .is_some_and(|items| items.iter().any(|item| &item.id == id)))
    }

    /// Simulate the service going offline (queries fail) or coming back
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of queries served so far, including failed ones
    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<FolderClass, Vec<WorkItem>>>> {
        self.worklists
            .read()
            .map_err(|_| anyhow!("worklist store lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<FolderClass, Vec<WorkItem>>>> {
        self.worklists
            .write()
            .map_err(|_| anyhow!("worklist store lock poisoned"))
    }
}

impl Default for InMemoryWorklistService {
    fn default() -> Self {
        Self::new()
    }
}

impl WorklistService for InMemoryWorklistService {
    fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        if !self.available.load(Ordering::SeqCst) {
            bail!("worklist service unavailable");
        }

        let worklists = self.read()?;
        let matching: Vec<&WorkItem> = match &request.search {
            Some(params) => {
                // Search runs across all worklists in a stable class order
                let mut classes: Vec<&FolderClass> = worklists.keys().collect();
                classes.sort();
                let mut seen = HashSet::new();
                classes
                    .into_iter()
                    .flat_map(|class| worklists[class].iter())
                    .filter(|item| params.matches(item))
                    .filter(|item| seen.insert(&item.id))
                    .collect()
            }
            None => worklists
                .get(&request.folder_class)
                .map(|items| items.iter().collect())
                .unwrap_or_default(),
        };

        let total_count = matching.len();
        if request.count_only {
            return Ok(QueryResponse::count(total_count));
        }

        let items = matching
            .into_iter()
            .skip(request.page_offset)
            .take(request.page_size)
            .cloned()
            .collect();
        Ok(QueryResponse::page(items, total_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FolderId, ItemKind, SearchParams, SessionContext};

    fn request(class: &str, offset: usize, size: usize, count_only: bool) -> QueryRequest {
        QueryRequest {
            folder_id: FolderId::new(class),
            folder_class: FolderClass::new(class),
            search: None,
            session: SessionContext::new("tech1"),
            page_offset: offset,
            page_size: size,
            count_only,
        }
    }

    fn setup_service() -> InMemoryWorklistService {
        let service = InMemoryWorklistService::new();
        for i in 0..25 {
            let item = WorkItem::new(format!("p{}", i), ItemKind::PROCEDURE)
                .with_field("patient", format!("Patient {}", i))
                .with_field("modality", if i % 2 == 0 { "CT" } else { "MR" });
            service.add_item(FolderClass::SCHEDULED, item).unwrap();
        }
        service
    }

    #[test]
    fn test_paging() {
        let service = setup_service();

        let page = service.query(&request(FolderClass::SCHEDULED, 20, 10, false)).unwrap();
        assert_eq!(page.total_count, 25);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].id.as_str(), "p20");
    }

    #[test]
    fn test_count_only_returns_no_items() {
        let service = setup_service();

        let response = service.query(&request(FolderClass::SCHEDULED, 0, 10, true)).unwrap();
        assert_eq!(response.total_count, 25);
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_unknown_class_is_empty() {
        let service = setup_service();

        let response = service.query(&request("nothing", 0, 10, false)).unwrap();
        assert_eq!(response.total_count, 0);
    }

    #[test]
    fn test_search_across_worklists() {
        let service = setup_service();
        service
            .add_item(
                FolderClass::IN_PROGRESS,
                WorkItem::new("x1", ItemKind::PROCEDURE).with_field("patient", "Patient 1x"),
            )
            .unwrap();

        let mut req = request(FolderClass::SEARCH, 0, 50, false);
        req.search = Some(SearchParams::new("patient 1"));
        let response = service.query(&req).unwrap();
        // p1, p10..p19, p21, x1
        assert_eq!(response.total_count, 13);
    }

    #[test]
    fn test_move_items() {
        let service = setup_service();
        let scheduled = FolderClass::new(FolderClass::SCHEDULED);
        let in_progress = FolderClass::new(FolderClass::IN_PROGRESS);

        let moved = service
            .move_items(&[WorkItemId::new("p3")], &scheduled, &in_progress)
            .unwrap();
        assert!(moved);
        assert_eq!(service.count(&scheduled).unwrap(), 24);
        assert!(service.contains(&in_progress, &WorkItemId::new("p3")).unwrap());
    }

    #[test]
    fn test_move_missing_item_moves_nothing() {
        let service = setup_service();
        let scheduled = FolderClass::new(FolderClass::SCHEDULED);
        let in_progress = FolderClass::new(FolderClass::IN_PROGRESS);

        let moved = service
            .move_items(
                &[WorkItemId::new("p3"), WorkItemId::new("missing")],
                &scheduled,
                &in_progress,
            )
            .unwrap();
        assert!(!moved);
        assert_eq!(service.count(&scheduled).unwrap(), 25);
    }

    #[test]
    fn test_unavailable_service_fails() {
        let service = setup_service();
        service.set_available(false);

        assert!(service.query(&request(FolderClass::SCHEDULED, 0, 10, false)).is_err());
        assert_eq!(service.query_count(), 1);
    }
}
