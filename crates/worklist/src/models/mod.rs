//! Domain models for worklist entities

mod folder_id;
mod item;
mod search;
mod session;

pub use folder_id::{FolderClass, FolderId};
pub use item::{FieldValue, ItemKind, WorkItem, WorkItemId};
pub use search::SearchParams;
pub use session::SessionContext;
