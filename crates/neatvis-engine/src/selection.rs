//! Selection bookkeeping.
//!
//! Tracks the ordered set of selected ids and diffs it against the complete
//! sets reported by the timeline.

use crate::record::RecordId;

/// Changes between two selection sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDiff {
    /// Ids no longer selected, in previous-selection order.
    pub removed: Vec<RecordId>,
    /// Newly selected ids, in new-selection order.
    pub added: Vec<RecordId>,
}

impl SelectionDiff {
    /// Check if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// The widget's selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: Vec<RecordId>,
}

impl SelectionSet {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected ids.
    pub fn ids(&self) -> &[RecordId] {
        &self.selected
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Check if `id` is selected.
    pub fn contains(&self, id: RecordId) -> bool {
        self.selected.contains(&id)
    }

    /// Adopt a complete new set, returning what changed.
    ///
    /// Repeated ids in `new_ids` collapse to their first occurrence.
    pub fn reconcile(&mut self, new_ids: &[RecordId]) -> SelectionDiff {
        let mut unique: Vec<RecordId> = Vec::with_capacity(new_ids.len());
        for id in new_ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }
        let new_ids = unique;

        let removed = self
            .selected
            .iter()
            .filter(|id| !new_ids.contains(id))
            .copied()
            .collect();
        let added = new_ids
            .iter()
            .filter(|id| !self.selected.contains(id))
            .copied()
            .collect();

        self.selected = new_ids;
        SelectionDiff { removed, added }
    }

    /// Collapse the selection to a single id.
    pub fn select_only(&mut self, id: RecordId) {
        self.selected.clear();
        self.selected.push(id);
    }

    /// Remove `id`. Returns whether it was selected.
    pub fn remove(&mut self, id: RecordId) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| *s != id);
        self.selected.len() != before
    }
}
