//! Worklist crate - Folder synchronization engine for clinical worklists
//!
//! This crate keeps a set of worklist folders consistent with a remote query
//! service:
//! - Domain models (WorkItem, FolderId, SearchParams)
//! - Query service trait and an in-memory implementation
//! - Two-tier validity (count vs. items) and the update/invalidate protocol
//! - Background fetches with generation-based supersession
//! - Paging, search-driven folders, and drag-and-drop handlers
//!
//! The crate has no UI dependencies. Hosts bind to folders through event
//! subscriptions and pump fetch completions from their event loop.

pub mod actions;
pub mod config;
pub mod error;
pub mod events;
pub mod folder;
pub mod models;
pub mod paging;
pub mod service;
pub mod sync;
pub mod system;
pub mod table;

pub use actions::{DragDropKind, DropHandler, DropHandlerRegistry, HandlerId};
pub use config::EngineSettings;
pub use error::{FolderError, SearchError};
pub use events::{FolderEvent, FolderSystemEvent, Listeners, SubscriptionId};
pub use folder::{ERROR_ICON, Folder, FolderBuilder};
pub use models::{
    FieldValue, FolderClass, FolderId, ItemKind, SearchParams, SessionContext, WorkItem,
    WorkItemId,
};
pub use paging::PagingState;
pub use service::{InMemoryWorklistService, QueryRequest, QueryResponse, WorklistService};
pub use sync::{
    // Fetch coordination
    CompletionStats, FetchCompletion, FetchKind, FetchOutcome, FetchState, Job,
    // Background contexts
    InlineSpawner, RayonSpawner, Spawner,
    // Staleness
    Validity, interval_elapsed,
};
pub use system::FolderSystem;
pub use table::{ItemTable, SortDirection, SortKey};
