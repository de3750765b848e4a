//! Folder system: the set of folders making up a workspace
//!
//! Owns its folders, the drop-handler registry, and the receiving end of the
//! fetch completion channel. Everything here runs on the control thread; call
//! [`FolderSystem::process_completions`] from the UI loop to apply finished
//! fetches.

use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::actions::{DragDropKind, DropHandler, DropHandlerRegistry, HandlerId};
use crate::config::EngineSettings;
use crate::error::{FolderError, SearchError};
use crate::events::{FolderSystemEvent, Listeners, SubscriptionId};
use crate::folder::{Folder, FolderBuilder};
use crate::models::{FolderClass, FolderId, SearchParams, SessionContext, WorkItem};
use crate::service::{QueryRequest, WorklistService};
use crate::sync::{
    CompletionStats, FetchCompletion, FetchDispatcher, FetchOutcome, RayonSpawner, Spawner,
};

/// Ordered set of folders sharing settings, session, and a query service
pub struct FolderSystem {
    settings: EngineSettings,
    session: SessionContext,
    dispatcher: FetchDispatcher,
    completions: Receiver<FetchCompletion>,
    folders: Vec<Folder>,
    selected: Option<FolderId>,
    registry: DropHandlerRegistry,
    listeners: Listeners<FolderSystemEvent>,
}

impl FolderSystem {
    /// Create an empty folder system.
    ///
    /// # Arguments
    /// * `settings` - Page size, auto-invalidate interval and search limits
    /// * `session` - Logged-in user context attached to every query
    /// * `service` - Remote worklist query service
    /// * `spawner` - Background context that runs fetch bodies
    pub fn new(
        settings: EngineSettings,
        session: SessionContext,
        service: Arc<dyn WorklistService>,
        spawner: Arc<dyn Spawner>,
    ) -> Self {
        let (dispatcher, completions) = FetchDispatcher::new(service, spawner);
        Self {
            settings,
            session,
            dispatcher,
            completions,
            folders: Vec::new(),
            selected: None,
            registry: DropHandlerRegistry::new(),
            listeners: Listeners::new(),
        }
    }

    /// Create a folder system that runs fetches on the rayon pool
    pub fn with_rayon(
        settings: EngineSettings,
        session: SessionContext,
        service: Arc<dyn WorklistService>,
    ) -> Self {
        Self::new(settings, session, service, Arc::new(RayonSpawner))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    // ========================================================================
    // Folders
    // ========================================================================

    /// Add a folder at the end of the display order
    pub fn add_folder(&mut self, builder: FolderBuilder) -> Result<&mut Folder, FolderError> {
        if self.folder(builder.id()).is_some() {
            return Err(FolderError::Duplicate {
                folder: builder.id().clone(),
            });
        }

        let folder = builder.build(&self.settings, self.session.clone(), self.dispatcher.clone());
        debug!("Added folder {} ({})", folder.id(), folder.class());
        self.folders.push(folder);
        self.listeners.emit(&FolderSystemEvent::FoldersChanged);

        let index = self.folders.len() - 1;
        Ok(&mut self.folders[index])
    }

    /// Remove and dispose a folder. Its outstanding fetches are orphaned.
    pub fn remove_folder(&mut self, id: &FolderId) -> Result<(), FolderError> {
        let index = self.index_of(id)?;
        let mut folder = self.folders.remove(index);
        folder.dispose();

        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        debug!("Removed folder {}", id);
        self.listeners.emit(&FolderSystemEvent::FoldersChanged);
        Ok(())
    }

    /// Folders in display order
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn folder(&self, id: &FolderId) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id() == id)
    }

    pub fn folder_mut(&mut self, id: &FolderId) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.id() == id)
    }

    fn index_of(&self, id: &FolderId) -> Result<usize, FolderError> {
        self.folders
            .iter()
            .position(|f| f.id() == id)
            .ok_or_else(|| FolderError::NotFound { folder: id.clone() })
    }

    fn require_mut(&mut self, id: &FolderId) -> Result<&mut Folder, FolderError> {
        let index = self.index_of(id)?;
        Ok(&mut self.folders[index])
    }

    /// Currently selected (open) folder
    pub fn selected_folder(&self) -> Option<&Folder> {
        self.selected.as_ref().and_then(|id| self.folder(id))
    }

    /// Selection-change handler: close the previous folder, open this one,
    /// and update it. Returns whether a fetch was started.
    pub fn select_folder(&mut self, id: &FolderId) -> Result<bool, FolderError> {
        self.index_of(id)?;

        if let Some(previous) = self.selected.take() {
            if &previous != id {
                if let Some(folder) = self.folder_mut(&previous) {
                    folder.close_folder();
                }
            }
        }

        let folder = self.require_mut(id)?;
        folder.open_folder();
        let started = folder.update();
        self.selected = Some(id.clone());
        Ok(started)
    }

    /// Update every folder; closed ones only refresh their counts.
    /// Returns the number of fetches started.
    pub fn update_folders(&mut self) -> usize {
        let mut started = 0;
        for folder in &mut self.folders {
            if folder.update() {
                started += 1;
            }
        }
        started
    }

    // ========================================================================
    // Invalidation
    // ========================================================================

    /// Invalidate every folder. Does not fetch.
    pub fn invalidate_folders(&mut self) {
        self.invalidate_folders_with(false);
    }

    /// Invalidate every folder, optionally returning each to its first page
    pub fn invalidate_folders_with(&mut self, reset_page: bool) {
        for folder in &mut self.folders {
            folder.invalidate_with(reset_page);
        }
        self.listeners.emit(&FolderSystemEvent::FoldersInvalidated);
    }

    /// Invalidate the folders of one class
    pub fn invalidate_folders_of_class(&mut self, class: &FolderClass) {
        for folder in self.folders.iter_mut().filter(|f| f.class() == class) {
            folder.invalidate();
        }
        self.listeners.emit(&FolderSystemEvent::FoldersInvalidated);
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&FolderSystemEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ========================================================================
    // Fetch completions
    // ========================================================================

    /// Apply every fetch result that has arrived, without blocking
    pub fn process_completions(&mut self) -> CompletionStats {
        let mut stats = CompletionStats::default();
        while let Ok(completion) = self.completions.try_recv() {
            stats.record(self.apply(completion));
        }
        stats
    }

    /// Block until at least one fetch result arrives (or `timeout` passes),
    /// then apply everything that has arrived
    pub fn wait_for_completions(&mut self, timeout: Duration) -> CompletionStats {
        let mut stats = CompletionStats::default();
        match self.completions.recv_timeout(timeout) {
            Ok(completion) => stats.record(self.apply(completion)),
            Err(RecvTimeoutError::Timeout) => return stats,
            // The system holds a sender itself, so this cannot happen
            Err(RecvTimeoutError::Disconnected) => return stats,
        }
        let rest = self.process_completions();
        stats.completed += rest.completed;
        stats.failed += rest.failed;
        stats.orphaned += rest.orphaned;
        stats
    }

    /// Number of folders with a fetch in flight
    pub fn pending_fetches(&self) -> usize {
        self.folders.iter().filter(|f| f.has_pending_fetch()).count()
    }

    fn apply(&mut self, completion: FetchCompletion) -> FetchOutcome {
        match self.folder_mut(&completion.folder_id) {
            Some(folder) => folder.apply_completion(completion),
            None => {
                debug!(
                    "Discarding {:?} fetch for removed folder {}",
                    completion.kind, completion.folder_id
                );
                FetchOutcome::Orphaned
            }
        }
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Run a user search in a search folder.
    ///
    /// Validates the criteria and checks the match count synchronously so that
    /// weak criteria and too-many-matches errors reach the user directly. On
    /// success the folder's results are invalidated and, if it is open, a
    /// fetch is started.
    pub fn execute_search(&mut self, id: &FolderId, params: SearchParams) -> Result<(), SearchError> {
        let min_len = self.settings.min_search_term_len;
        if params.filters.is_empty() && params.significant_len() < min_len {
            return Err(SearchError::WeakCriteria { required: min_len });
        }

        let folder = self.folder(id).ok_or_else(|| FolderError::NotFound { folder: id.clone() })?;
        if !folder.is_search() {
            return Err(FolderError::NotSearchFolder { folder: id.clone() }.into());
        }

        let count_request = QueryRequest {
            folder_id: id.clone(),
            folder_class: folder.class().clone(),
            search: Some(params.clone()),
            session: self.session.clone(),
            page_offset: 0,
            page_size: 0,
            count_only: true,
        };
        let count = self.dispatcher.service().query(&count_request)?.total_count;
        let limit = self.settings.max_search_matches;
        if count > limit {
            warn!("Search {:?} matched {} items (limit {})", params.terms, count, limit);
            return Err(SearchError::TooManyMatches { count, limit });
        }

        info!("Search {:?} matched {} items", params.terms, count);
        let folder = self.require_mut(id)?;
        folder.set_search_params(params)?;
        if folder.is_open() {
            folder.update();
        }
        Ok(())
    }

    // ========================================================================
    // Drag and drop
    // ========================================================================

    /// Register a drop handler for folders of `class`
    pub fn register_drop_handler(
        &mut self,
        class: impl Into<FolderClass>,
        handler: Arc<dyn DropHandler>,
    ) -> HandlerId {
        self.registry.register(class, handler)
    }

    pub fn unregister_drop_handler(&mut self, id: HandlerId) -> bool {
        self.registry.unregister(id)
    }

    pub fn drop_handlers(&self) -> &DropHandlerRegistry {
        &self.registry
    }

    /// Whether `items` can be dropped on a folder
    pub fn can_accept_drop(
        &self,
        target: &FolderId,
        items: &[WorkItem],
        kind: DragDropKind,
    ) -> Result<DragDropKind, FolderError> {
        let folder = self.folder(target).ok_or_else(|| FolderError::NotFound { folder: target.clone() })?;
        Ok(folder.can_accept_drop(&self.registry, items, kind))
    }

    /// Drop `items` on a folder. No folder is invalidated; the caller knows
    /// which folders the drop affected.
    pub fn accept_drop(
        &self,
        target: &FolderId,
        items: &[WorkItem],
        kind: DragDropKind,
    ) -> Result<DragDropKind, FolderError> {
        let folder = self.folder(target).ok_or_else(|| FolderError::NotFound { folder: target.clone() })?;
        Ok(folder.accept_drop(&self.registry, items, kind))
    }

    /// Tell the source folder how a drag out of it ended
    pub fn drag_complete(
        &mut self,
        source: &FolderId,
        items: &[WorkItem],
        result: DragDropKind,
    ) -> Result<(), FolderError> {
        self.require_mut(source)?.drag_complete(items, result);
        Ok(())
    }
}

impl Drop for FolderSystem {
    fn drop(&mut self) {
        for folder in &mut self.folders {
            folder.dispose();
        }
    }
}
