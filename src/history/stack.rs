//! Bounded undo/redo stack over serialized history entries.
//!
//! Mutation is expected on a single logical thread of UI events; concurrent
//! undo/redo must be serialized by the caller.

use std::collections::VecDeque;

use crate::errors::BuilderError;
use crate::models::Page;

use super::entry::{deserialize_history_entry_json, serialize_history_entry_json};

/// Undo/redo stack of serialized page snapshots.
///
/// The caller pushes the outgoing state before applying a new action; `undo`
/// hands back the most recent past state and stashes the current one for
/// `redo`. Pushing a new action invalidates the redo branch, and the oldest
/// entry is evicted once the stack exceeds its capacity.
#[derive(Debug)]
pub struct HistoryStack {
    undo: VecDeque<String>,
    redo: Vec<String>,
    capacity: usize,
}

impl HistoryStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Snapshot an accepted state onto the undo stack. Clears the redo
    /// branch and evicts the oldest entry past capacity.
    pub fn push(&mut self, page: &Page) -> Result<(), BuilderError> {
        let snapshot = serialize_history_entry_json(page)?;
        self.redo.clear();
        self.undo.push_back(snapshot);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        Ok(())
    }

    /// Step back one state. The current page moves onto the redo branch.
    /// Corrupt entries are skipped with a warning; they never block the
    /// rest of the stack.
    pub fn undo(&mut self, current: &Page) -> Option<Page> {
        while let Some(snapshot) = self.undo.pop_back() {
            match deserialize_history_entry_json(&snapshot) {
                Ok(page) => {
                    match serialize_history_entry_json(current) {
                        Ok(blob) => self.redo.push(blob),
                        Err(err) => {
                            tracing::warn!("could not stash current state for redo: {}", err);
                        }
                    }
                    return Some(page);
                }
                Err(err) => tracing::warn!("skipping corrupt history entry: {}", err),
            }
        }
        None
    }

    /// Step forward one state. The current page moves back onto the undo
    /// stack without touching the remaining redo branch.
    pub fn redo(&mut self, current: &Page) -> Option<Page> {
        while let Some(snapshot) = self.redo.pop() {
            match deserialize_history_entry_json(&snapshot) {
                Ok(page) => {
                    match serialize_history_entry_json(current) {
                        Ok(blob) => {
                            self.undo.push_back(blob);
                            while self.undo.len() > self.capacity {
                                self.undo.pop_front();
                            }
                        }
                        Err(err) => {
                            tracing::warn!("could not stash current state for undo: {}", err);
                        }
                    }
                    return Some(page);
                }
                Err(err) => tracing::warn!("skipping corrupt history entry: {}", err),
            }
        }
        None
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of entries currently on the undo stack.
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub(crate) fn inject_raw(&mut self, snapshot: String) {
        self.undo.push_back(snapshot);
    }
}
