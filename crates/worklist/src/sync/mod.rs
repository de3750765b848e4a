//! Folder synchronization engine
//!
//! Decides when a folder's contents are stale and runs the background fetches
//! that refresh them. Fetch bodies run on a [`Spawner`]; their results are sent
//! back over a channel and applied on the control thread by the folder system.

mod coordinator;
mod timing;
mod validity;

pub use coordinator::{
    CompletionStats, FetchCompletion, FetchDispatcher, FetchKind, FetchOutcome, FetchSlot,
    FetchState, InlineSpawner, Job, RayonSpawner, Spawner,
};
pub use timing::interval_elapsed;
pub use validity::Validity;
