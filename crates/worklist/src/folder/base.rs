//! Folder state and the update/invalidate protocol

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use std::time::Duration;

use crate::actions::{DragDropKind, DropHandlerRegistry};
use crate::error::FolderError;
use crate::events::{FolderEvent, Listeners, SubscriptionId};
use crate::models::{FolderClass, FolderId, SearchParams, SessionContext, WorkItem};
use crate::paging::PagingState;
use crate::service::{QueryRequest, QueryResponse};
use crate::sync::{
    FetchCompletion, FetchDispatcher, FetchKind, FetchOutcome, FetchSlot, FetchState, Validity,
    interval_elapsed,
};
use crate::table::{ItemTable, SortKey};

/// Icon shown while the last fetch of a folder failed
pub const ERROR_ICON: &str = "folder-error";

/// What drives a folder's invalidation
pub(crate) enum FolderVariant {
    /// External invalidation and the auto-invalidate interval
    Worklist,
    /// Only a change of search parameters
    Search(Option<SearchParams>),
}

/// Callback run when items dragged out of a folder are dropped elsewhere
pub type DragCompleteHook = Box<dyn FnMut(&[WorkItem], DragDropKind)>;

/// A worklist pane: identity, validity, paging, and the fetched item table.
///
/// All methods run on the control thread. `update` never blocks: it starts a
/// background fetch whose result is applied later by the folder system.
pub struct Folder {
    pub(super) id: FolderId,
    pub(super) class: FolderClass,
    pub(super) text: String,
    pub(super) tooltip: Option<String>,
    pub(super) icon: String,
    pub(super) is_static: bool,
    pub(super) supports_paging: bool,
    pub(super) is_open: bool,
    /// None until the first count arrives
    pub(super) total_item_count: Option<usize>,
    pub(super) last_update_time: Option<DateTime<Utc>>,
    pub(super) auto_invalidate_interval: Option<Duration>,
    pub(super) validity: Validity,
    pub(super) paging: PagingState,
    pub(super) table: ItemTable,
    pub(super) items_fetch: FetchSlot,
    pub(super) count_fetch: FetchSlot,
    pub(super) fetch_error: Option<String>,
    pub(super) variant: FolderVariant,
    pub(super) listeners: Listeners<FolderEvent>,
    pub(super) drag_complete_hook: Option<DragCompleteHook>,
    /// None once disposed
    pub(super) dispatcher: Option<FetchDispatcher>,
    pub(super) session: SessionContext,
}

impl Folder {
    pub fn id(&self) -> &FolderId {
        &self.id
    }

    pub fn class(&self) -> &FolderClass {
        &self.class
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text with the item count appended once a count is known
    pub fn display_text(&self) -> String {
        match self.total_item_count {
            Some(count) => format!("{} ({})", self.text, count),
            None => self.text.clone(),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.listeners.emit(&FolderEvent::TextChanged);
        }
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    /// Current icon: the error icon while the last fetch failed
    pub fn icon(&self) -> &str {
        if self.fetch_error.is_some() {
            ERROR_ICON
        } else {
            &self.icon
        }
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_search(&self) -> bool {
        matches!(self.variant, FolderVariant::Search(_))
    }

    pub fn supports_paging(&self) -> bool {
        self.supports_paging
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_disposed(&self) -> bool {
        self.dispatcher.is_none()
    }

    /// Logical item count; may exceed the rows in the table when paged
    pub fn total_item_count(&self) -> usize {
        self.total_item_count.unwrap_or(0)
    }

    pub fn last_update_time(&self) -> Option<DateTime<Utc>> {
        self.last_update_time
    }

    pub fn auto_invalidate_interval(&self) -> Option<Duration> {
        self.auto_invalidate_interval
    }

    pub fn set_auto_invalidate_interval(&mut self, interval: Option<Duration>) {
        self.auto_invalidate_interval = interval;
    }

    /// Whether fetched data has outlived the auto-invalidate interval.
    ///
    /// Only checked when `update` runs; nothing polls it. Search folders are
    /// never stale: only new parameters invalidate them.
    pub fn is_stale(&self) -> bool {
        !self.is_search()
            && self.validity.is_count_valid()
            && interval_elapsed(self.last_update_time, self.auto_invalidate_interval)
    }

    pub fn is_items_valid(&self) -> bool {
        self.validity.is_items_valid()
    }

    pub fn is_count_valid(&self) -> bool {
        self.validity.is_count_valid()
    }

    /// Message of the last failed fetch, until a fetch succeeds
    pub fn last_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    pub fn fetch_state(&self, kind: FetchKind) -> FetchState {
        match kind {
            FetchKind::Items => self.items_fetch.state(),
            FetchKind::Count => self.count_fetch.state(),
        }
    }

    pub fn has_pending_fetch(&self) -> bool {
        self.items_fetch.is_running() || self.count_fetch.is_running()
    }

    pub fn items(&self) -> &ItemTable {
        &self.table
    }

    /// Change the item table's sort order
    pub fn set_sort(&mut self, sort: Vec<SortKey>) {
        self.listeners.emit(&FolderEvent::ItemsTableChanging);
        self.table.set_sort(sort);
        self.listeners.emit(&FolderEvent::ItemsTableChanged);
    }

    pub fn page_number(&self) -> usize {
        self.paging.page_number()
    }

    pub fn page_size(&self) -> usize {
        self.paging.page_size()
    }

    pub fn has_next(&self) -> bool {
        self.paging.has_next()
    }

    pub fn has_previous(&self) -> bool {
        self.paging.has_previous()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&FolderEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Mark the folder as being viewed. Does not fetch; the next `update`
    /// upgrades to an items fetch if needed.
    pub fn open_folder(&mut self) {
        self.is_open = true;
    }

    /// Mark the folder as no longer viewed. Never invalidates.
    pub fn close_folder(&mut self) {
        self.is_open = false;
    }

    /// Invalidate count and items.
    ///
    /// Ignored by search folders, which only change with their parameters.
    pub fn invalidate(&mut self) {
        self.invalidate_with(false);
    }

    /// Invalidate count and items, optionally returning to the first page
    pub fn invalidate_with(&mut self, reset_page: bool) {
        if self.is_search() {
            debug!("Folder {}: ignoring external invalidation of search folder", self.id);
            return;
        }
        self.invalidate_internal(reset_page);
    }

    pub(super) fn invalidate_internal(&mut self, reset_page: bool) {
        self.validity.invalidate();
        if reset_page && self.paging.page_number() != 0 {
            self.paging.reset();
            // The running page is no longer the one shown
            self.items_fetch.orphan();
        }
        self.items_fetch.mark_invalidated();
        self.count_fetch.mark_invalidated();
    }

    /// Advance one page. Invalidates items (not the count); fetches on the
    /// next `update`. Returns false if there is no next page.
    pub fn move_next_page(&mut self) -> Result<bool, FolderError> {
        self.ensure_paging()?;
        if !self.paging.move_next() {
            return Ok(false);
        }
        self.page_changed();
        Ok(true)
    }

    /// Go back one page. Returns false if already on the first page.
    pub fn move_previous_page(&mut self) -> Result<bool, FolderError> {
        self.ensure_paging()?;
        if !self.paging.move_previous() {
            return Ok(false);
        }
        self.page_changed();
        Ok(true)
    }

    fn ensure_paging(&self) -> Result<(), FolderError> {
        if self.supports_paging {
            Ok(())
        } else {
            Err(FolderError::PagingNotSupported {
                folder: self.id.clone(),
            })
        }
    }

    fn page_changed(&mut self) {
        self.validity.invalidate_items();
        self.items_fetch.orphan();
        debug!("Folder {}: moved to page {}", self.id, self.paging.page_number());
    }

    /// Start whatever fetch the folder's state calls for.
    ///
    /// Open folders with invalid items get a full page fetch; otherwise an
    /// invalid count gets a count-only fetch. Returns true if a fetch was
    /// started, false if nothing was needed or the same fetch is already in
    /// flight. Returns immediately either way.
    pub fn update(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }

        if self.is_stale() {
            debug!(
                "Folder {}: auto-invalidated after {:?}",
                self.id, self.auto_invalidate_interval
            );
            self.invalidate_internal(false);
        }

        let Some(kind) = self.validity.required_fetch(self.is_open) else {
            return false;
        };
        let Some(request) = self.build_request(kind) else {
            return false;
        };

        let Some(dispatcher) = &self.dispatcher else {
            return false;
        };
        let (slot, other) = match kind {
            FetchKind::Items => (&mut self.items_fetch, &mut self.count_fetch),
            FetchKind::Count => (&mut self.count_fetch, &mut self.items_fetch),
        };
        if !slot.needs_start(&request) {
            return false;
        }
        // Items and count fetches of one folder never run together
        other.orphan();
        let generation = dispatcher.next_generation();
        slot.begin(generation, request.clone());

        debug!(
            "Folder {}: starting {:?} fetch (generation {}, offset {}, size {})",
            self.id, kind, generation, request.page_offset, request.page_size
        );
        dispatcher.dispatch(kind, generation, request);
        true
    }

    fn build_request(&self, kind: FetchKind) -> Option<QueryRequest> {
        let search = match &self.variant {
            FolderVariant::Worklist => None,
            // Nothing to query until search parameters are set
            FolderVariant::Search(params) => Some(params.clone()?),
        };
        let page_offset = if self.supports_paging {
            self.paging.offset()
        } else {
            0
        };

        Some(QueryRequest {
            folder_id: self.id.clone(),
            folder_class: self.class.clone(),
            search,
            session: self.session.clone(),
            page_offset,
            page_size: self.paging.page_size(),
            count_only: kind == FetchKind::Count,
        })
    }

    /// Apply a fetch result delivered to the control thread
    pub(crate) fn apply_completion(&mut self, completion: FetchCompletion) -> FetchOutcome {
        let FetchCompletion {
            kind,
            generation,
            result,
            ..
        } = completion;

        let slot = match kind {
            FetchKind::Items => &mut self.items_fetch,
            FetchKind::Count => &mut self.count_fetch,
        };
        let Some(invalidated_in_flight) = slot.finish(generation) else {
            debug!(
                "Folder {}: discarding superseded {:?} fetch (generation {})",
                self.id, kind, generation
            );
            return FetchOutcome::Orphaned;
        };

        match result {
            Ok(response) => {
                match kind {
                    FetchKind::Items => self.install_items(response, invalidated_in_flight),
                    FetchKind::Count => {
                        self.set_total_item_count(response.total_count);
                        if !invalidated_in_flight {
                            self.validity.mark_count_valid();
                        }
                    }
                }
                self.last_update_time = Some(Utc::now());
                self.set_fetch_error(None);
                debug!(
                    "Folder {}: {:?} fetch complete, {} total",
                    self.id,
                    kind,
                    self.total_item_count()
                );
                FetchOutcome::Completed
            }
            Err(e) => {
                error!("Folder {}: {:?} fetch failed: {:#}", self.id, kind, e);
                self.set_fetch_error(Some(format!("{:#}", e)));
                FetchOutcome::Failed
            }
        }
    }

    /// Swap in a fetched page as one step: tear down, install, notify
    fn install_items(&mut self, response: QueryResponse, invalidated_in_flight: bool) {
        let QueryResponse { items, total_count } = response;

        self.listeners.emit(&FolderEvent::ItemsTableChanging);
        self.table.replace_all(items);
        self.paging.set_total(total_count);
        if !invalidated_in_flight {
            self.validity.mark_items_valid();
        }
        self.listeners.emit(&FolderEvent::ItemsTableChanged);

        self.set_total_item_count(total_count);
    }

    fn set_total_item_count(&mut self, count: usize) {
        if self.total_item_count == Some(count) {
            return;
        }
        self.total_item_count = Some(count);
        self.listeners.emit(&FolderEvent::TotalItemCountChanged(count));
        self.listeners.emit(&FolderEvent::TextChanged);
    }

    fn set_fetch_error(&mut self, error: Option<String>) {
        let had_error = self.fetch_error.is_some();
        self.fetch_error = error;
        if had_error != self.fetch_error.is_some() {
            self.listeners.emit(&FolderEvent::IconChanged);
        }
    }

    /// Whether items can be dropped here. Only `Move` is ever offered.
    pub fn can_accept_drop(
        &self,
        registry: &DropHandlerRegistry,
        items: &[WorkItem],
        kind: DragDropKind,
    ) -> DragDropKind {
        if kind != DragDropKind::Move {
            return DragDropKind::None;
        }
        match registry.resolve(&self.class, items) {
            Some(_) => DragDropKind::Move,
            None => DragDropKind::None,
        }
    }

    /// Run the drop mutation through the first accepting handler.
    ///
    /// Does not invalidate anything: a drop can affect other folders too, so
    /// the caller decides what to invalidate.
    pub fn accept_drop(
        &self,
        registry: &DropHandlerRegistry,
        items: &[WorkItem],
        kind: DragDropKind,
    ) -> DragDropKind {
        if kind != DragDropKind::Move {
            return DragDropKind::None;
        }
        let Some(handler) = registry.resolve(&self.class, items) else {
            return DragDropKind::None;
        };

        match handler.process_drop(items) {
            Ok(true) => {
                info!("Dropped {} item(s) on folder {}", items.len(), self.id);
                DragDropKind::Move
            }
            Ok(false) => DragDropKind::None,
            Err(e) => {
                error!("Drop on folder {} failed: {:#}", self.id, e);
                DragDropKind::None
            }
        }
    }

    /// Notification that items dragged from this folder were dropped
    /// elsewhere with `result`
    pub fn drag_complete(&mut self, items: &[WorkItem], result: DragDropKind) {
        if let Some(hook) = &mut self.drag_complete_hook {
            hook(items, result);
        }
    }

    /// React to completed drags out of this folder
    pub fn on_drag_complete(&mut self, hook: impl FnMut(&[WorkItem], DragDropKind) + 'static) {
        self.drag_complete_hook = Some(Box::new(hook));
    }

    /// Release outstanding fetches and listeners; later completions are orphaned
    pub(crate) fn dispose(&mut self) {
        self.items_fetch.orphan();
        self.count_fetch.orphan();
        self.listeners.clear();
        self.drag_complete_hook = None;
        self.dispatcher = None;
    }
}
