//! Async fetch coordination
//!
//! Each folder owns one [`FetchSlot`] per [`FetchKind`]. Every fetch gets a
//! generation from the [`FetchDispatcher`], unique across the folder system;
//! the background job carries it back in its [`FetchCompletion`], and the
//! folder applies the result only if the slot is still running that
//! generation. Older completions are orphaned, including those started by a
//! removed folder whose id was reused.

use anyhow::{Result, anyhow};
use log::debug;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::models::FolderId;
use crate::service::{QueryRequest, QueryResponse, WorklistService};

/// Which part of a folder a fetch refreshes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    /// Full page of items (also yields the count)
    Items,
    /// Count only; the item table is untouched
    Count,
}

/// Work to run on a background context
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Background scheduling context for fetch bodies
pub trait Spawner: Send + Sync {
    /// Run a job off the control thread (or queue it to be run later)
    fn spawn(&self, job: Job);
}

/// Runs fetch bodies on the global rayon thread pool
#[derive(Debug, Default, Clone, Copy)]
pub struct RayonSpawner;

impl Spawner for RayonSpawner {
    fn spawn(&self, job: Job) {
        rayon::spawn(job);
    }
}

/// Runs fetch bodies immediately on the calling thread.
///
/// Results still go through the completion channel, so nothing is applied
/// until the folder system processes completions.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineSpawner;

impl Spawner for InlineSpawner {
    fn spawn(&self, job: Job) {
        job();
    }
}

/// Result of a fetch body, on its way back to the control thread
#[derive(Debug)]
pub struct FetchCompletion {
    pub folder_id: FolderId,
    pub kind: FetchKind,
    pub generation: u64,
    pub result: Result<QueryResponse>,
}

/// Sends fetch bodies to the spawner and their results to the completion channel
#[derive(Clone)]
pub struct FetchDispatcher {
    service: Arc<dyn WorklistService>,
    spawner: Arc<dyn Spawner>,
    sender: Sender<FetchCompletion>,
    /// Shared by every clone so generations never repeat within a system
    generations: Arc<AtomicU64>,
}

impl FetchDispatcher {
    /// Create a dispatcher and the receiving end of its completion channel
    pub fn new(
        service: Arc<dyn WorklistService>,
        spawner: Arc<dyn Spawner>,
    ) -> (Self, Receiver<FetchCompletion>) {
        let (sender, receiver) = channel();
        (
            Self {
                service,
                spawner,
                sender,
                generations: Arc::new(AtomicU64::new(0)),
            },
            receiver,
        )
    }

    pub fn service(&self) -> &Arc<dyn WorklistService> {
        &self.service
    }

    /// Hand out the next fetch generation
    pub fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Start a fetch body in the background
    pub fn dispatch(&self, kind: FetchKind, generation: u64, request: QueryRequest) {
        let service = self.service.clone();
        let sender = self.sender.clone();

        self.spawner.spawn(Box::new(move || {
            let folder_id = request.folder_id.clone();
            // A panicking service must not take down the worker pool
            let result = catch_unwind(AssertUnwindSafe(|| service.query(&request)))
                .unwrap_or_else(|_| Err(anyhow!("worklist query panicked")));

            let completion = FetchCompletion {
                folder_id,
                kind,
                generation,
                result,
            };
            if sender.send(completion).is_err() {
                debug!("Folder system gone, dropping {:?} fetch result", kind);
            }
        }));
    }
}

/// Lifecycle of a fetch slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Running,
}

/// What happened to a delivered completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Result applied to the folder
    Completed,
    /// Service error; folder left invalid
    Failed,
    /// Superseded or disposed; result discarded
    Orphaned,
}

/// Counts of completions handled in one processing pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompletionStats {
    pub completed: usize,
    pub failed: usize,
    pub orphaned: usize,
}

impl CompletionStats {
    pub fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Completed => self.completed += 1,
            FetchOutcome::Failed => self.failed += 1,
            FetchOutcome::Orphaned => self.orphaned += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.completed + self.failed + self.orphaned
    }
}

#[derive(Debug, Clone)]
struct RunningFetch {
    request: QueryRequest,
    /// Set when the folder is invalidated while this fetch is in flight
    invalidated: bool,
}

/// One outstanding fetch of a given kind for a folder
#[derive(Debug, Clone, Default)]
pub struct FetchSlot {
    generation: u64,
    running: Option<RunningFetch>,
}

impl FetchSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FetchState {
        if self.running.is_some() {
            FetchState::Running
        } else {
            FetchState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether an update wanting `request` has to start a new fetch.
    ///
    /// A fetch already running for the same request is left alone unless the
    /// folder was invalidated after it started.
    pub fn needs_start(&self, request: &QueryRequest) -> bool {
        match &self.running {
            Some(running) => running.invalidated || running.request != *request,
            None => true,
        }
    }

    /// Start a new fetch under `generation`, superseding any running one
    pub fn begin(&mut self, generation: u64, request: QueryRequest) {
        self.generation = generation;
        self.running = Some(RunningFetch {
            request,
            invalidated: false,
        });
    }

    /// Note that the folder was invalidated while a fetch is in flight
    pub fn mark_invalidated(&mut self) {
        if let Some(running) = &mut self.running {
            running.invalidated = true;
        }
    }

    /// Finish the fetch with the given generation.
    ///
    /// Returns `None` if that generation is no longer current (the completion
    /// is orphaned), otherwise whether the folder was invalidated while the
    /// fetch ran.
    pub fn finish(&mut self, generation: u64) -> Option<bool> {
        if generation != self.generation {
            return None;
        }
        self.running.take().map(|running| running.invalidated)
    }

    /// Abandon any running fetch without starting a replacement
    pub fn orphan(&mut self) {
        self.running = None;
    }
}
