//! Drop handlers registered by the ward tools

use anyhow::Result;
use log::info;
use std::sync::Arc;
use worklist::{DropHandler, FolderClass, InMemoryWorklistService, ItemKind, WorkItem, WorkItemId};

/// Moves procedures between two worklists when they are dropped on the
/// destination folder
pub struct TransitionHandler {
    kind: ItemKind,
    from: FolderClass,
    to: FolderClass,
    service: Arc<InMemoryWorklistService>,
}

impl TransitionHandler {
    /// Dropping a scheduled procedure on "in progress" starts it
    pub fn start_procedure(service: Arc<InMemoryWorklistService>) -> Self {
        Self {
            kind: ItemKind::new(ItemKind::PROCEDURE),
            from: FolderClass::new(FolderClass::SCHEDULED),
            to: FolderClass::new(FolderClass::IN_PROGRESS),
            service,
        }
    }

    /// Dropping an in-progress procedure on "completed" completes it
    pub fn complete_procedure(service: Arc<InMemoryWorklistService>) -> Self {
        Self {
            kind: ItemKind::new(ItemKind::PROCEDURE),
            from: FolderClass::new(FolderClass::IN_PROGRESS),
            to: FolderClass::new(FolderClass::COMPLETED),
            service,
        }
    }
}

impl DropHandler for TransitionHandler {
    fn item_kind(&self) -> &ItemKind {
        &self.kind
    }

    fn can_accept_drop(&self, items: &[WorkItem]) -> bool {
        items
            .iter()
            .all(|item| self.service.contains(&self.from, &item.id).unwrap_or(false))
    }

    fn process_drop(&self, items: &[WorkItem]) -> Result<bool> {
        let ids: Vec<WorkItemId> = items.iter().map(|item| item.id.clone()).collect();
        let moved = self.service.move_items(&ids, &self.from, &self.to)?;
        if moved {
            info!("Moved {} procedure(s) from {} to {}", ids.len(), self.from, self.to);
        }
        Ok(moved)
    }
}
