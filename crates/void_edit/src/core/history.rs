//! Undo/redo history with batch support.
//!
//! Entries are pushed after their mutation has already been applied to the
//! scene. Undo applies the inverse of the newest entry, redo replays it.
//! Entries pushed while a batch is open are collected and recorded as one
//! step when the batch closes.

use std::collections::VecDeque;

use super::{HistoryEntry, SceneStore, Selection};

/// Entries collected while a batch is open.
#[derive(Clone, Debug, Default)]
struct PendingBatch {
    label: Option<String>,
    entries: Vec<HistoryEntry>,
}

/// Undo/redo history for one document.
#[derive(Clone, Debug)]
pub struct EditHistory {
    /// Entries that can be undone, oldest first
    past: VecDeque<HistoryEntry>,
    /// Entries that can be redone, next to redo last
    future: Vec<HistoryEntry>,
    /// Currently open batch
    pending: Option<PendingBatch>,
    /// Maximum number of past entries, 0 for unbounded
    limit: usize,
    /// Whether history has been modified since last save
    dirty: bool,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl EditHistory {
    /// Default maximum history size.
    pub const DEFAULT_LIMIT: usize = 100;

    pub fn new() -> Self {
        Self::with_limit(Self::DEFAULT_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            pending: None,
            limit,
            dirty: false,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the size cap, dropping the oldest entries if needed.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.enforce_limit();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Description of the next undo step.
    pub fn undo_description(&self) -> Option<&str> {
        self.past.back().map(HistoryEntry::description)
    }

    /// Description of the next redo step.
    pub fn redo_description(&self) -> Option<&str> {
        self.future.last().map(HistoryEntry::description)
    }

    /// Undoable entries, oldest first.
    pub fn past(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> + '_ {
        self.past.iter()
    }

    /// Redoable entries, most recently undone first.
    pub fn future(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> + '_ {
        self.future.iter().rev()
    }

    pub fn undo_count(&self) -> usize {
        self.past.len()
    }

    pub fn redo_count(&self) -> usize {
        self.future.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark as saved (clears dirty flag).
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Whether a batch is currently open.
    pub fn in_batch(&self) -> bool {
        self.pending.is_some()
    }

    /// Record an entry whose mutation has already been applied.
    pub fn push_entry(&mut self, entry: HistoryEntry) {
        if let Some(pending) = self.pending.as_mut() {
            pending.entries.push(entry);
            return;
        }

        self.past.push_back(entry);
        self.future.clear(); // Clear redo on new action
        self.dirty = true;
        self.enforce_limit();
    }

    /// Open a batch. Entries pushed until [`end_batch`](Self::end_batch)
    /// undo and redo as one step.
    pub fn begin_batch(&mut self) {
        self.open_batch(None);
    }

    /// Open a batch with a label for the undo menu.
    pub fn begin_named_batch(&mut self, label: impl Into<String>) {
        self.open_batch(Some(label.into()));
    }

    fn open_batch(&mut self, label: Option<String>) {
        if self.pending.is_some() {
            log::warn!("Beginning batch while one is already open, ignoring");
            return;
        }
        self.pending = Some(PendingBatch { label, entries: Vec::new() });
    }

    /// Close the open batch and record it. Returns whether anything was recorded.
    ///
    /// An empty batch records nothing; a batch holding a single entry records
    /// that entry on its own.
    pub fn end_batch(&mut self) -> bool {
        let Some(mut pending) = self.pending.take() else {
            log::warn!("Ending batch while none is open");
            return false;
        };

        match pending.entries.len() {
            0 => false,
            1 => {
                if let Some(entry) = pending.entries.pop() {
                    self.push_entry(entry);
                }
                true
            }
            _ => {
                self.push_entry(HistoryEntry::Batch {
                    label: pending.label,
                    entries: pending.entries,
                });
                true
            }
        }
    }

    /// Discard the open batch without recording it.
    /// The mutations it described stay applied.
    pub fn cancel_batch(&mut self) -> usize {
        self.pending.take().map_or(0, |pending| pending.entries.len())
    }

    /// Revert the newest entry and clear the selection.
    pub fn undo(&mut self, scene: &mut dyn SceneStore, selection: &mut dyn Selection) -> bool {
        if self.pending.is_some() {
            log::warn!("Undo requested while a batch is open, ignoring");
            return false;
        }
        let Some(entry) = self.past.pop_back() else {
            return false;
        };

        log::debug!("Undo: {}", entry.description());
        entry.apply_inverse(scene);
        self.future.push(entry);
        self.dirty = true;
        selection.clear();
        true
    }

    /// Replay the most recently undone entry and clear the selection.
    pub fn redo(&mut self, scene: &mut dyn SceneStore, selection: &mut dyn Selection) -> bool {
        if self.pending.is_some() {
            log::warn!("Redo requested while a batch is open, ignoring");
            return false;
        }
        let Some(entry) = self.future.pop() else {
            return false;
        };

        log::debug!("Redo: {}", entry.description());
        entry.apply_forward(scene);
        self.past.push_back(entry);
        self.dirty = true;
        selection.clear();
        true
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.pending = None;
        self.dirty = false;
    }

    fn enforce_limit(&mut self) {
        if self.limit == 0 {
            return;
        }
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        EntityFields, EntityId, SceneEntity, SceneGraph, SelectionManager, Transform,
    };

    fn rename(id: u32, from: &str, to: &str) -> HistoryEntry {
        HistoryEntry::Update {
            id: EntityId(id),
            before: EntityFields::name(from),
            after: EntityFields::name(to),
        }
    }

    fn name(scene: &SceneGraph, id: u32) -> String {
        scene.get(EntityId(id)).map(|e| e.name.clone()).unwrap_or_default()
    }

    fn set_name(scene: &mut SceneGraph, id: u32, name: &str) {
        if let Some(e) = scene.get_mut(EntityId(id)) {
            e.name = name.to_string();
        }
    }

    fn scene() -> SceneGraph {
        SceneGraph::from_entities([SceneEntity::new(EntityId(1), "a"), SceneEntity::new(EntityId(2), "x")])
    }

    #[test]
    fn test_history_basic() {
        let mut history = EditHistory::new();

        assert!(!history.can_undo());
        assert!(!history.can_redo());

        history.push_entry(rename(1, "a", "b"));

        assert!(history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo_description(), Some("Edit Properties"));
        assert!(history.is_dirty());
    }

    #[test]
    fn test_undo_redo_moves_between_stacks() {
        let mut scene = scene();
        let mut selection = SelectionManager::new();
        let mut history = EditHistory::new();

        set_name(&mut scene, 1, "b");
        history.push_entry(rename(1, "a", "b"));
        set_name(&mut scene, 1, "c");
        history.push_entry(rename(1, "b", "c"));

        assert!(history.undo(&mut scene, &mut selection));
        assert_eq!(name(&scene, 1), "b");
        assert_eq!((history.undo_count(), history.redo_count()), (1, 1));

        assert!(history.redo(&mut scene, &mut selection));
        assert_eq!(name(&scene, 1), "c");
        assert_eq!((history.undo_count(), history.redo_count()), (2, 0));
    }

    #[test]
    fn test_push_discards_future() {
        let mut scene = scene();
        let mut selection = SelectionManager::new();
        let mut history = EditHistory::new();

        history.push_entry(rename(1, "a", "b"));
        history.undo(&mut scene, &mut selection);
        assert!(history.can_redo());

        history.push_entry(rename(2, "x", "y"));
        assert!(!history.can_redo());
        assert_eq!(history.future().count(), 0);
    }

    #[test]
    fn test_empty_undo_is_noop() {
        let mut scene = scene();
        let mut selection = SelectionManager::new();
        selection.select_multiple([EntityId(1)]);
        let mut history = EditHistory::new();

        assert!(!history.undo(&mut scene, &mut selection));
        assert!(!history.redo(&mut scene, &mut selection));
        assert_eq!(selection.count(), 1);
    }

    #[test]
    fn test_undo_clears_selection() {
        let mut scene = scene();
        let mut selection = SelectionManager::new();
        let mut history = EditHistory::new();

        history.push_entry(rename(1, "a", "b"));
        selection.select_multiple([EntityId(1), EntityId(2)]);
        history.undo(&mut scene, &mut selection);
        assert!(selection.is_empty());

        selection.select_multiple([EntityId(2)]);
        history.redo(&mut scene, &mut selection);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_batch_records_one_step() {
        let mut scene = scene();
        let mut selection = SelectionManager::new();
        let mut history = EditHistory::new();

        history.begin_named_batch("Rename both");
        set_name(&mut scene, 1, "b");
        history.push_entry(rename(1, "a", "b"));
        set_name(&mut scene, 2, "y");
        history.push_entry(rename(2, "x", "y"));
        assert!(!history.can_undo());
        assert!(history.end_batch());

        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.undo_description(), Some("Rename both"));

        assert!(history.undo(&mut scene, &mut selection));
        assert_eq!((name(&scene, 1).as_str(), name(&scene, 2).as_str()), ("a", "x"));
        assert!(!history.undo(&mut scene, &mut selection));
    }

    #[test]
    fn test_empty_batch_records_nothing() {
        let mut history = EditHistory::new();
        history.begin_batch();
        assert!(!history.end_batch());
        assert!(!history.can_undo());
        assert!(!history.in_batch());
    }

    #[test]
    fn test_single_entry_batch_is_unwrapped() {
        let mut history = EditHistory::new();
        history.begin_batch();
        history.push_entry(rename(1, "a", "b"));
        history.end_batch();

        assert!(matches!(history.past().next(), Some(HistoryEntry::Update { .. })));
    }

    #[test]
    fn test_nested_begin_is_ignored() {
        let mut history = EditHistory::new();
        history.begin_named_batch("Outer");
        history.push_entry(rename(1, "a", "b"));
        history.begin_named_batch("Inner");
        history.push_entry(rename(2, "x", "y"));
        assert!(history.end_batch());

        assert!(!history.in_batch());
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.undo_description(), Some("Outer"));
    }

    #[test]
    fn test_undo_refused_while_batching() {
        let mut scene = scene();
        let mut selection = SelectionManager::new();
        let mut history = EditHistory::new();

        history.push_entry(rename(1, "a", "b"));
        history.begin_batch();
        assert!(!history.undo(&mut scene, &mut selection));
        assert_eq!(history.cancel_batch(), 0);
        assert!(history.undo(&mut scene, &mut selection));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = EditHistory::with_limit(2);
        history.push_entry(HistoryEntry::transform(EntityId(1), &Transform::new(), &Transform::new().with_uniform_scale(2.0)));
        history.push_entry(rename(1, "a", "b"));
        history.push_entry(rename(1, "b", "c"));

        assert_eq!(history.undo_count(), 2);
        assert!(history.past().all(|e| matches!(e, HistoryEntry::Update { .. })));

        history.set_limit(1);
        assert_eq!(history.past().next(), Some(&rename(1, "b", "c")));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut history = EditHistory::new();
        history.push_entry(rename(1, "a", "b"));
        history.begin_batch();
        history.clear();

        assert!(!history.can_undo());
        assert!(!history.in_batch());
        assert!(!history.is_dirty());
    }
}
