//! Query service boundary and implementations
//!
//! The engine treats the remote worklist service as an opaque, blocking
//! request/response function. Folder fetches call it from a background
//! scheduling context. User searches are the exception: their count check
//! runs synchronously on the control thread before any parameters change.

mod memory;
mod traits;

pub use memory::InMemoryWorklistService;
pub use traits::{QueryRequest, QueryResponse, WorklistService};
