//! Drag-and-drop actions
//!
//! Tools register [`DropHandler`]s against a folder class; dropping items on a
//! folder resolves the first registered handler that accepts them.

mod handler;

pub use handler::{DragDropKind, DropHandler, DropHandlerRegistry, HandlerId};
