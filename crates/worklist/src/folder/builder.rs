//! Folder construction

use std::time::Duration;

use super::Folder;
use super::base::FolderVariant;
use crate::config::EngineSettings;
use crate::events::Listeners;
use crate::models::{FolderClass, FolderId, SessionContext};
use crate::paging::PagingState;
use crate::sync::{FetchDispatcher, FetchSlot, Validity};
use crate::table::{ItemTable, SortKey};

/// Default icon for worklist folders
pub const DEFAULT_ICON: &str = "folder";

/// Default icon for search folders
pub const SEARCH_ICON: &str = "folder-search";

/// Description of a folder to add to a folder system
#[derive(Debug, Clone)]
pub struct FolderBuilder {
    id: FolderId,
    class: FolderClass,
    text: String,
    tooltip: Option<String>,
    icon: String,
    is_static: bool,
    supports_paging: bool,
    sort: Vec<SortKey>,
    /// None = use the folder system's setting
    auto_invalidate: Option<Option<Duration>>,
    search: bool,
}

impl FolderBuilder {
    /// Describe a paged worklist folder
    pub fn new(id: impl Into<FolderId>, class: impl Into<FolderClass>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class: class.into(),
            text: text.into(),
            tooltip: None,
            icon: DEFAULT_ICON.to_string(),
            is_static: false,
            supports_paging: true,
            sort: Vec::new(),
            auto_invalidate: None,
            search: false,
        }
    }

    /// Describe a search-driven folder.
    ///
    /// Search folders are static, unpaged, and never auto-invalidate.
    pub fn search(id: impl Into<FolderId>, text: impl Into<String>) -> Self {
        Self {
            icon: SEARCH_ICON.to_string(),
            is_static: true,
            supports_paging: false,
            auto_invalidate: Some(None),
            search: true,
            ..Self::new(id, FolderClass::SEARCH, text)
        }
    }

    pub fn id(&self) -> &FolderId {
        &self.id
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Mark the folder as not backed by a persisted worklist instance
    pub fn static_folder(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn paging(mut self, supports_paging: bool) -> Self {
        self.supports_paging = supports_paging;
        self
    }

    /// Initial sort order of the item table
    pub fn sort(mut self, sort: Vec<SortKey>) -> Self {
        self.sort = sort;
        self
    }

    /// Override the folder system's auto-invalidate interval (None = never)
    pub fn auto_invalidate(mut self, interval: Option<Duration>) -> Self {
        self.auto_invalidate = Some(interval);
        self
    }

    pub(crate) fn build(
        self,
        settings: &EngineSettings,
        session: SessionContext,
        dispatcher: FetchDispatcher,
    ) -> Folder {
        // Search folders return every match in one page; anything larger was
        // rejected as too many matches
        let page_size = if self.search {
            settings.max_search_matches
        } else {
            settings.page_size
        };
        let variant = if self.search {
            FolderVariant::Search(None)
        } else {
            FolderVariant::Worklist
        };

        Folder {
            id: self.id,
            class: self.class,
            text: self.text,
            tooltip: self.tooltip,
            icon: self.icon,
            is_static: self.is_static,
            supports_paging: self.supports_paging,
            is_open: false,
            total_item_count: None,
            last_update_time: None,
            auto_invalidate_interval: self
                .auto_invalidate
                .unwrap_or_else(|| settings.auto_invalidate_interval()),
            validity: Validity::new(),
            paging: PagingState::new(page_size),
            table: ItemTable::with_sort(self.sort),
            items_fetch: FetchSlot::new(),
            count_fetch: FetchSlot::new(),
            fetch_error: None,
            variant,
            listeners: Listeners::new(),
            drag_complete_hook: None,
            dispatcher: Some(dispatcher),
            session,
        }
    }
}
