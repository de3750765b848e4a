//! Search-driven folders
//!
//! A search folder's contents change only when its parameters change. It
//! ignores external invalidation and otherwise follows the same open/closed
//! fetch gating as any other folder.

use log::debug;

use super::Folder;
use super::base::FolderVariant;
use crate::error::FolderError;
use crate::models::SearchParams;

impl Folder {
    /// Current search parameters (None for worklist folders or before the
    /// first search)
    pub fn search_params(&self) -> Option<&SearchParams> {
        match &self.variant {
            FolderVariant::Search(params) => params.as_ref(),
            FolderVariant::Worklist => None,
        }
    }

    /// Replace the search parameters and invalidate the results.
    ///
    /// Nothing is fetched until the next `update`. Criteria are not validated
    /// here; `FolderSystem::execute_search` does that for user searches.
    pub fn set_search_params(&mut self, params: SearchParams) -> Result<(), FolderError> {
        let FolderVariant::Search(current) = &mut self.variant else {
            return Err(FolderError::NotSearchFolder {
                folder: self.id.clone(),
            });
        };

        debug!("Folder {}: search parameters set to {:?}", self.id, params.terms);
        *current = Some(params);
        self.invalidate_internal(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineSettings;
    use crate::folder::FolderBuilder;
    use crate::models::{FolderClass, ItemKind, SessionContext, WorkItem};
    use crate::service::InMemoryWorklistService;
    use crate::sync::{FetchCompletion, FetchDispatcher, FetchKind, FetchState, InlineSpawner};
    use std::sync::Arc;
    use std::sync::mpsc::Receiver;
    use std::time::Duration;

    fn make_search_folder() -> (Folder, Receiver<FetchCompletion>) {
        let service = Arc::new(InMemoryWorklistService::new());
        for (id, patient) in [("p1", "Doe, Jane"), ("p2", "Doe, John"), ("p3", "Roe, Rita")] {
            service
                .add_item(
                    FolderClass::SCHEDULED,
                    WorkItem::new(id, ItemKind::PROCEDURE).with_field("patient", patient),
                )
                .unwrap();
        }
        let (dispatcher, receiver) = FetchDispatcher::new(service, Arc::new(InlineSpawner));
        let folder = FolderBuilder::search("search", "Search Results").build(
            &EngineSettings::default(),
            SessionContext::new("clerk"),
            dispatcher,
        );
        (folder, receiver)
    }

    #[test]
    fn test_search_folder_defaults() {
        let (folder, _receiver) = make_search_folder();
        assert!(folder.is_search());
        assert!(folder.is_static());
        assert!(!folder.supports_paging());
        assert_eq!(folder.auto_invalidate_interval(), None);
        assert!(folder.search_params().is_none());
    }

    #[test]
    fn test_no_fetch_without_params() {
        let (mut folder, _receiver) = make_search_folder();
        folder.open_folder();
        assert!(!folder.update());
    }

    #[test]
    fn test_external_invalidate_suppressed() {
        let (mut folder, receiver) = make_search_folder();
        folder.set_search_params(SearchParams::new("doe")).unwrap();
        folder.open_folder();
        assert!(folder.update());
        for completion in receiver.try_iter() {
            folder.apply_completion(completion);
        }
        assert!(folder.is_items_valid());
        assert_eq!(folder.items().len(), 2);

        folder.invalidate();
        folder.invalidate_with(true);
        assert!(folder.is_items_valid());
        assert!(!folder.update());
    }

    #[test]
    fn test_new_params_invalidate() {
        let (mut folder, receiver) = make_search_folder();
        folder.open_folder();
        folder.set_search_params(SearchParams::new("doe")).unwrap();
        folder.update();
        for completion in receiver.try_iter() {
            folder.apply_completion(completion);
        }

        folder.set_search_params(SearchParams::new("rita")).unwrap();
        assert!(!folder.is_items_valid());
        assert!(folder.update());
        for completion in receiver.try_iter() {
            folder.apply_completion(completion);
        }
        assert_eq!(folder.items().len(), 1);
        assert_eq!(folder.total_item_count(), 1);
    }

    #[test]
    fn test_closed_search_folder_counts_only() {
        let (mut folder, _receiver) = make_search_folder();
        folder.set_search_params(SearchParams::new("doe")).unwrap();
        assert!(folder.update());
        assert_eq!(folder.fetch_state(FetchKind::Count), FetchState::Running);
        assert_eq!(folder.fetch_state(FetchKind::Items), FetchState::Idle);
    }

    #[test]
    fn test_auto_invalidate_ignored_for_search_folder() {
        let service = Arc::new(InMemoryWorklistService::new());
        service
            .add_item(
                FolderClass::SCHEDULED,
                WorkItem::new("p1", ItemKind::PROCEDURE).with_field("patient", "Doe, Jane"),
            )
            .unwrap();
        let (dispatcher, receiver) = FetchDispatcher::new(service.clone(), Arc::new(InlineSpawner));
        let mut folder = FolderBuilder::search("search", "Search Results")
            .auto_invalidate(Some(Duration::ZERO))
            .build(&EngineSettings::default(), SessionContext::new("clerk"), dispatcher);

        folder.set_search_params(SearchParams::new("doe")).unwrap();
        folder.open_folder();
        assert!(folder.update());
        for completion in receiver.try_iter() {
            folder.apply_completion(completion);
        }
        let queries = service.query_count();

        assert!(!folder.is_stale());
        assert!(!folder.update());
        folder.set_auto_invalidate_interval(Some(Duration::ZERO));
        assert!(!folder.update());
        assert!(folder.is_items_valid());
        assert_eq!(service.query_count(), queries);
    }

    #[test]
    fn test_worklist_folder_rejects_params() {
        let service = Arc::new(InMemoryWorklistService::new());
        let (dispatcher, _receiver) = FetchDispatcher::new(service, Arc::new(InlineSpawner));
        let mut folder = FolderBuilder::new("scheduled", FolderClass::SCHEDULED, "Scheduled")
            .build(&EngineSettings::default(), SessionContext::default(), dispatcher);

        assert!(matches!(
            folder.set_search_params(SearchParams::new("doe")),
            Err(FolderError::NotSearchFolder { .. })
        ));
    }
}
