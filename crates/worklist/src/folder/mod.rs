//! Folders: worklist panes with their own validity, paging and item table
//!
//! A folder is built through [`FolderBuilder`] and owned by a folder system,
//! which injects the fetch dispatcher and session it queries with.

mod builder;
mod base;
mod search;

pub use builder::FolderBuilder;
pub use base::{ERROR_ICON, Folder};
