//! Selection tracking for multi-object editing.
//!
//! The selection is ordered; the entity added last is the reference entity
//! that the transform handle drives. Modifier handling follows the usual
//! editor conventions:
//! - Click: Replace selection
//! - Shift+Click: Add to selection
//! - Ctrl+Click: Remove from selection
//! - Ctrl+Shift+Click: Toggle selection

use super::EntityId;

/// Contract the edit core consumes from the selection.
pub trait Selection {
    /// Selected ids in selection order, plus the reference id.
    fn current(&self) -> (Vec<EntityId>, Option<EntityId>);

    /// Drop the whole selection.
    fn clear(&mut self);
}

/// Selection mode based on modifier keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Replace current selection (normal click)
    #[default]
    Replace,
    /// Add to current selection (Shift+click)
    Add,
    /// Remove from current selection (Ctrl+click)
    Remove,
    /// Toggle selection state (Ctrl+Shift+click)
    Toggle,
}

impl SelectionMode {
    /// Determine selection mode from modifier keys.
    pub fn from_modifiers(shift: bool, ctrl: bool) -> Self {
        match (shift, ctrl) {
            (true, true) => Self::Toggle,
            (true, false) => Self::Add,
            (false, true) => Self::Remove,
            (false, false) => Self::Replace,
        }
    }
}

/// Ordered multi-selection with a reference entity.
#[derive(Clone, Debug, Default)]
pub struct SelectionManager {
    /// Currently selected entities (in selection order)
    selected: Vec<EntityId>,
    /// Reference entity (drives the handle, last selected)
    reference: Option<EntityId>,
    /// Whether selection has changed since last checked
    dirty: bool,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reference (last selected) entity.
    pub fn reference(&self) -> Option<EntityId> {
        self.reference
    }

    pub fn selected(&self) -> &[EntityId] {
        &self.selected
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_reference(&self, id: EntityId) -> bool {
        self.reference == Some(id)
    }

    /// Check and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Select an entity with the given mode.
    pub fn select(&mut self, id: EntityId, mode: SelectionMode) {
        match mode {
            SelectionMode::Replace => {
                self.selected.clear();
                self.selected.push(id);
                self.reference = Some(id);
            }
            SelectionMode::Add => {
                // Re-adding moves the entity to the end so it becomes the reference
                self.selected.retain(|&e| e != id);
                self.selected.push(id);
                self.reference = Some(id);
            }
            SelectionMode::Remove => self.drop_id(id),
            SelectionMode::Toggle => {
                if self.selected.contains(&id) {
                    self.drop_id(id);
                } else {
                    self.selected.push(id);
                    self.reference = Some(id);
                }
            }
        }
        self.dirty = true;
    }

    /// Replace the selection with `ids`; the last one becomes the reference.
    pub fn select_multiple(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.selected.clear();
        for id in ids {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
        self.reference = self.selected.last().copied();
        self.dirty = true;
    }

    /// Clear all selection.
    pub fn clear(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.reference = None;
            self.dirty = true;
        }
    }

    /// Remove an entity from selection (e.g., when entity is deleted).
    pub fn remove_entity(&mut self, id: EntityId) {
        if self.selected.contains(&id) {
            self.drop_id(id);
            self.dirty = true;
        }
    }

    pub fn add(&mut self, id: EntityId) {
        self.select(id, SelectionMode::Add);
    }

    pub fn toggle(&mut self, id: EntityId) {
        self.select(id, SelectionMode::Toggle);
    }

    fn drop_id(&mut self, id: EntityId) {
        self.selected.retain(|&e| e != id);
        if self.reference == Some(id) {
            self.reference = self.selected.last().copied();
        }
    }
}

impl Selection for SelectionManager {
    fn current(&self) -> (Vec<EntityId>, Option<EntityId>) {
        (self.selected.clone(), self.reference)
    }

    fn clear(&mut self) {
        SelectionManager::clear(self);
    }
}
