// crates/neoncut-core/src/history.rs
//
// Snapshot undo/redo over the clip collection.
//
// `past` holds the clip sets as they were *before* each commit; `future`
// holds sets displaced by undo. Any new commit forks the timeline and drops
// `future`. Track flags and session state are not covered.

use std::collections::VecDeque;

use crate::state::Clip;

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    /// Short action name for logs ("Move clip", "Split", …).
    pub label: String,
    pub clips: Vec<Clip>,
}

#[derive(Clone, Debug)]
pub struct History {
    past:   VecDeque<HistoryEntry>,
    future: Vec<HistoryEntry>,
    depth:  usize,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self { past: VecDeque::new(), future: Vec::new(), depth: depth.max(1) }
    }

    /// Record the pre-mutation clip set. Clears redo; evicts the oldest entry
    /// once `depth` is exceeded.
    pub fn push(&mut self, label: &str, clips: Vec<Clip>) {
        self.future.clear();
        self.push_past(HistoryEntry { label: label.to_string(), clips });
        tracing::debug!(label, undo_depth = self.past.len(), "history entry pushed");
    }

    /// Step back. `current` is the live clip set, parked on the redo stack.
    /// Returns the clip set to restore.
    pub fn undo(&mut self, current: Vec<Clip>) -> Option<Vec<Clip>> {
        let entry = self.past.pop_back()?;
        tracing::debug!(label = %entry.label, undo_remaining = self.past.len(), "undo");
        self.future.push(HistoryEntry { label: entry.label.clone(), clips: current });
        Some(entry.clips)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: Vec<Clip>) -> Option<Vec<Clip>> {
        let entry = self.future.pop()?;
        tracing::debug!(label = %entry.label, redo_remaining = self.future.len(), "redo");
        self.push_past(HistoryEntry { label: entry.label.clone(), clips: current });
        Some(entry.clips)
    }

    fn push_past(&mut self, entry: HistoryEntry) {
        self.past.push_back(entry);
        while self.past.len() > self.depth {
            self.past.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool { !self.past.is_empty() }
    pub fn can_redo(&self) -> bool { !self.future.is_empty() }
    pub fn undo_len(&self) -> usize { self.past.len() }
    pub fn redo_len(&self) -> usize { self.future.len() }

    /// Label of the action the next undo would revert.
    pub fn next_undo_label(&self) -> Option<&str> {
        self.past.back().map(|e| e.label.as_str())
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
