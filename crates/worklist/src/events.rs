//! Change notifications toward the UI binding layer

/// Notifications fired by a single folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderEvent {
    /// The item table is about to be replaced; release references to old rows
    ItemsTableChanging,
    /// The new item table snapshot is installed
    ItemsTableChanged,
    /// Total item count changed (new value)
    TotalItemCountChanged(usize),
    /// Display text changed
    TextChanged,
    /// Icon changed (error indicator set or cleared)
    IconChanged,
}

/// Notifications fired by a folder system
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderSystemEvent {
    /// Some or all folders were invalidated
    FoldersInvalidated,
    /// A folder was added or removed
    FoldersChanged,
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Listener list for one event source.
///
/// Listeners run synchronously on the control thread, in subscription order.
pub struct Listeners<E> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<dyn FnMut(&E)>)>,
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}
