//! Query service trait definitions

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::{FolderClass, FolderId, SearchParams, SessionContext, WorkItem};

/// One page (or count) request for a folder's worklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Folder issuing the query
    pub folder_id: FolderId,
    /// Worklist class the folder shows
    pub folder_class: FolderClass,
    /// Search criteria, for search-driven folders
    pub search: Option<SearchParams>,
    /// Logged-in user context
    pub session: SessionContext,
    /// Number of items to skip
    pub page_offset: usize,
    /// Maximum number of items to return
    pub page_size: usize,
    /// When true, only `total_count` is wanted and `items` may be empty
    pub count_only: bool,
}

/// Result of a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Items of the requested page (empty for count-only queries)
    pub items: Vec<WorkItem>,
    /// Total number of items in the worklist, regardless of paging
    pub total_count: usize,
}

impl QueryResponse {
    pub fn count(total_count: usize) -> Self {
        Self {
            items: Vec::new(),
            total_count,
        }
    }

    pub fn page(items: Vec<WorkItem>, total_count: usize) -> Self {
        Self { items, total_count }
    }
}

/// Trait for the remote worklist query service
///
/// Implementations may block. Folder fetches call them off the control
/// thread; the one exception is the count check in
/// `FolderSystem::execute_search`, which runs synchronously on the control
/// thread so that search errors reach the user directly. No retry is expected of implementations: a failed query leaves the
/// folder invalid and the next update retries.
pub trait WorklistService: Send + Sync {
    /// Fetch a page of items (or only the count) for a folder
    fn query(&self, request: &QueryRequest) -> Result<QueryResponse>;
}
