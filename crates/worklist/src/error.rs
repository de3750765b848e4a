//! Error types raised by the folder engine
//!
//! Fetch failures never surface here: they are logged at the coordinator
//! boundary and reflected in the folder's icon. These errors are returned only
//! from synchronous, caller-initiated operations.

use crate::models::FolderId;

/// Contract violations on folder and folder-system operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FolderError {
    #[error("Folder {folder} does not support paging")]
    PagingNotSupported { folder: FolderId },

    #[error("Folder {folder} is not a search folder")]
    NotSearchFolder { folder: FolderId },

    #[error("Folder not found: {folder}")]
    NotFound { folder: FolderId },

    #[error("Folder already exists: {folder}")]
    Duplicate { folder: FolderId },
}

/// Errors from executing a user search; shown to the user as-is
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search criteria too weak: at least {required} significant characters or a field filter required")]
    WeakCriteria { required: usize },

    #[error("Search matched {count} items, more than the {limit} allowed; refine the criteria")]
    TooManyMatches { count: usize, limit: usize },

    #[error(transparent)]
    Folder(#[from] FolderError),

    #[error("Search failed: {0}")]
    Service(#[from] anyhow::Error),
}
