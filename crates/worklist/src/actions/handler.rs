//! Drop handler registry

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{FolderClass, ItemKind, WorkItem};

/// Drag-and-drop effect.
///
/// Folders only ever offer `Move`: copying a work item into another queue
/// has no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragDropKind {
    None,
    Move,
    Copy,
}

/// Capability that decides whether a folder accepts dropped items and
/// performs the resulting mutation
pub trait DropHandler: Send + Sync {
    /// Kind of item this handler works on
    fn item_kind(&self) -> &ItemKind;

    /// Check whether the items can be dropped
    fn can_accept_drop(&self, items: &[WorkItem]) -> bool;

    /// Perform the drop. Returns false if the mutation did not happen.
    fn process_drop(&self, items: &[WorkItem]) -> Result<bool>;
}

/// Handle returned by `register`, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Mapping from folder class to the handlers registered for it
#[derive(Default)]
pub struct DropHandlerRegistry {
    handlers: HashMap<FolderClass, Vec<(HandlerId, Arc<dyn DropHandler>)>>,
    next_id: u64,
}

impl DropHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for folders of `class`. Handlers are consulted in
    /// registration order.
    pub fn register(&mut self, class: impl Into<FolderClass>, handler: Arc<dyn DropHandler>) -> HandlerId {
        self.next_id += 1;
        let id = HandlerId(self.next_id);
        self.handlers.entry(class.into()).or_default().push((id, handler));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        let mut removed = false;
        for entries in self.handlers.values_mut() {
            let before = entries.len();
            entries.retain(|(entry_id, _)| *entry_id != id);
            removed |= entries.len() != before;
        }
        self.handlers.retain(|_, entries| !entries.is_empty());
        removed
    }

    /// Number of handlers registered for a class
    pub fn handler_count(&self, class: &FolderClass) -> usize {
        self.handlers.get(class).map_or(0, Vec::len)
    }

    /// Find the first handler for `class` that accepts every item.
    ///
    /// Handlers only see item sets made entirely of their item kind.
    pub fn resolve(&self, class: &FolderClass, items: &[WorkItem]) -> Option<Arc<dyn DropHandler>> {
        if items.is_empty() {
            return None;
        }
        self.handlers
            .get(class)?
            .iter()
            .map(|(_, handler)| handler)
            .find(|handler| {
                let kind = handler.item_kind();
                items.iter().all(|item| &item.kind == kind) && handler.can_accept_drop(items)
            })
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TestHandler {
        kind: ItemKind,
        accepts: bool,
        processed: AtomicUsize,
    }

    impl TestHandler {
        fn new(kind: &str, accepts: bool) -> Arc<Self> {
            Arc::new(Self {
                kind: ItemKind::new(kind),
                accepts,
                processed: AtomicUsize::new(0),
            })
        }
    }

    impl DropHandler for TestHandler {
        fn item_kind(&self) -> &ItemKind {
            &self.kind
        }

        fn can_accept_drop(&self, _items: &[WorkItem]) -> bool {
            self.accepts
        }

        fn process_drop(&self, _items: &[WorkItem]) -> Result<bool> {
            self.processed.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    fn procedures() -> Vec<WorkItem> {
        vec![WorkItem::new("p1", ItemKind::PROCEDURE)]
    }

    #[test]
    fn test_first_match_wins() {
        let mut registry = DropHandlerRegistry::new();
        let rejecting = TestHandler::new(ItemKind::PROCEDURE, false);
        let first = TestHandler::new(ItemKind::PROCEDURE, true);
        let second = TestHandler::new(ItemKind::PROCEDURE, true);
        registry.register(FolderClass::IN_PROGRESS, rejecting);
        registry.register(FolderClass::IN_PROGRESS, first.clone());
        registry.register(FolderClass::IN_PROGRESS, second);

        let class = FolderClass::new(FolderClass::IN_PROGRESS);
        let handler = registry.resolve(&class, &procedures()).unwrap();
        handler.process_drop(&procedures()).unwrap();
        assert_eq!(first.processed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolve_is_keyed_by_class() {
        let mut registry = DropHandlerRegistry::new();
        registry.register(FolderClass::IN_PROGRESS, TestHandler::new(ItemKind::PROCEDURE, true));

        let other = FolderClass::new(FolderClass::COMPLETED);
        assert!(registry.resolve(&other, &procedures()).is_none());
    }

    #[test]
    fn test_item_kind_must_match() {
        let mut registry = DropHandlerRegistry::new();
        registry.register(FolderClass::IN_PROGRESS, TestHandler::new(ItemKind::ORDER, true));

        let class = FolderClass::new(FolderClass::IN_PROGRESS);
        assert!(registry.resolve(&class, &procedures()).is_none());
    }

    #[test]
    fn test_empty_items_never_accepted() {
        let mut registry = DropHandlerRegistry::new();
        registry.register(FolderClass::IN_PROGRESS, TestHandler::new(ItemKind::PROCEDURE, true));

        let class = FolderClass::new(FolderClass::IN_PROGRESS);
        assert!(registry.resolve(&class, &[]).is_none());
    }

    #[test]
    fn test_unregister() {
        let mut registry = DropHandlerRegistry::new();
        let id = registry.register(FolderClass::IN_PROGRESS, TestHandler::new(ItemKind::PROCEDURE, true));
        let class = FolderClass::new(FolderClass::IN_PROGRESS);
        assert_eq!(registry.handler_count(&class), 1);

        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert_eq!(registry.handler_count(&class), 0);
        assert!(registry.resolve(&class, &procedures()).is_none());
    }
}
