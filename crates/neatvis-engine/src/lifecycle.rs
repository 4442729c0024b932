//! Load lifecycle.
//!
//! The widget starts `Loading`. External selection changes that arrive before
//! the first batch of records is ingested are queued and replayed, in arrival
//! order, exactly once when the widget becomes `Ready`.

use std::collections::VecDeque;

use crate::record::Record;

/// A selection change waiting for the first load.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Select(Record),
    Unselect(Record),
}

/// Whether records have been ingested yet.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// No records ingested; actions are queued.
    Loading { pending: VecDeque<PendingAction> },
    /// Records ingested; actions apply immediately.
    Ready,
}

impl Default for LoadState {
    fn default() -> Self {
        Self::Loading {
            pending: VecDeque::new(),
        }
    }
}

impl LoadState {
    /// Check if records have been ingested.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Number of queued actions.
    pub fn pending_len(&self) -> usize {
        match self {
            Self::Loading { pending } => pending.len(),
            Self::Ready => 0,
        }
    }

    /// Queue `action` if still loading.
    ///
    /// Hands the action back when it should run now.
    pub fn defer(&mut self, action: PendingAction) -> Option<PendingAction> {
        match self {
            Self::Loading { pending } => {
                pending.push_back(action);
                None
            }
            Self::Ready => Some(action),
        }
    }

    /// Transition to `Ready`, draining the queue.
    ///
    /// Only the first transition yields actions; later calls return an empty
    /// queue.
    pub fn finish(&mut self) -> VecDeque<PendingAction> {
        match std::mem::replace(self, Self::Ready) {
            Self::Loading { pending } => pending,
            Self::Ready => VecDeque::new(),
        }
    }
}
