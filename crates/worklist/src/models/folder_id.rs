//! Folder identity types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a folder within a folder system
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FolderId(pub String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for FolderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FolderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type tag naming what kind of worklist a folder shows.
///
/// Drop handlers and class-filtered invalidation are keyed by this tag, and the
/// query service uses it to select the worklist to page through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FolderClass(pub String);

impl FolderClass {
    pub fn new(class: impl Into<String>) -> Self {
        Self(class.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Well-known worklist classes
    pub const SCHEDULED: &'static str = "scheduled";
    pub const CHECKED_IN: &'static str = "checked-in";
    pub const IN_PROGRESS: &'static str = "in-progress";
    pub const COMPLETED: &'static str = "completed";
    pub const CANCELLED: &'static str = "cancelled";
    pub const SEARCH: &'static str = "search";
}

impl From<String> for FolderClass {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FolderClass {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for FolderClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
