//! History snapshot optimizer and the undo/redo stack built on it.

mod entry;
mod stack;

pub use entry::*;
pub use stack::*;
