//! Tokio-backed background context for worklist fetches

use tokio::runtime::Handle;
use worklist::{Job, Spawner};

/// Runs fetch bodies on the tokio blocking pool.
///
/// Worklist queries are blocking calls, so they go through `spawn_blocking`
/// rather than onto the async worker threads.
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Spawner for TokioSpawner {
    fn spawn(&self, job: Job) {
        // Completion is reported through the engine's channel
        drop(self.handle.spawn_blocking(job));
    }
}
