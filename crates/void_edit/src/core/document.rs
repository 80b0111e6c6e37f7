//! One edited document: the single handle editor code passes around.
//!
//! `EditDocument` owns the scene, selection, undo history and transform
//! manipulator of one document, so several documents can be open side by
//! side without sharing state. Modifications should go through the command
//! system (or record their own entries) for undo/redo support.

use super::{
    EditHistory, EditPreferences, EntityId, HistoryEntry, SceneEntity, SceneGraph,
    SelectionManager,
};
use crate::commands::{self, CommandOutcome, CommandResult, EditCommand};
use crate::tools::{ManipulationMode, TransformManipulator};

/// Central state of one edited document.
#[derive(Clone, Debug)]
pub struct EditDocument {
    // Scene data
    pub scene: SceneGraph,

    // Selection
    pub selection: SelectionManager,

    // History
    pub history: EditHistory,

    // Multi-object manipulation
    pub manipulator: TransformManipulator,

    preferences: EditPreferences,
}

impl Default for EditDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl EditDocument {
    pub fn new() -> Self {
        Self::with_preferences(EditPreferences::default())
    }

    pub fn with_preferences(preferences: EditPreferences) -> Self {
        Self {
            scene: SceneGraph::new(),
            selection: SelectionManager::new(),
            history: EditHistory::with_limit(preferences.history_limit),
            manipulator: TransformManipulator::new().with_move_frozen(preferences.move_frozen),
            preferences,
        }
    }

    pub fn preferences(&self) -> &EditPreferences {
        &self.preferences
    }

    /// Replace the preferences, applying them to history and manipulation.
    pub fn set_preferences(&mut self, preferences: EditPreferences) {
        self.history.set_limit(preferences.history_limit);
        self.manipulator.set_move_frozen(preferences.move_frozen);
        self.preferences = preferences;
    }

    // ========================================================================
    // Scene lifecycle
    // ========================================================================

    /// Replace the scene contents. History and selection are session-local
    /// and start over.
    pub fn load_scene(&mut self, entities: impl IntoIterator<Item = SceneEntity>) {
        self.scene = SceneGraph::from_entities(entities);
        self.selection.clear();
        self.history.clear();
        self.manipulator.reset();
        log::info!("Loaded scene with {} entities", self.scene.len());
    }

    /// Create a new empty scene.
    pub fn new_scene(&mut self) {
        self.load_scene(std::iter::empty());
    }

    /// Check if the document has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.history.is_dirty()
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    pub fn entity(&self, id: EntityId) -> Option<&SceneEntity> {
        self.scene.get(id)
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Record an entry whose mutation was already applied to the scene.
    pub fn push_entry(&mut self, entry: HistoryEntry) {
        self.history.push_entry(entry);
    }

    pub fn begin_batch(&mut self) {
        self.history.begin_batch();
    }

    pub fn end_batch(&mut self) -> bool {
        self.history.end_batch()
    }

    /// Undo the last step.
    pub fn undo(&mut self) -> bool {
        if self.manipulator.is_active() {
            log::warn!("Undo requested during manipulation, ignoring");
            return false;
        }
        self.history.undo(&mut self.scene, &mut self.selection)
    }

    /// Redo the last undone step.
    pub fn redo(&mut self) -> bool {
        if self.manipulator.is_active() {
            log::warn!("Redo requested during manipulation, ignoring");
            return false;
        }
        self.history.redo(&mut self.scene, &mut self.selection)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }

    // ========================================================================
    // Manipulation
    // ========================================================================

    pub fn begin_manipulation(&mut self, mode: ManipulationMode) -> bool {
        self.manipulator.begin(mode, &self.scene, &self.selection)
    }

    pub fn tick_manipulation(&mut self) -> usize {
        self.manipulator.tick(&mut self.scene, &self.selection)
    }

    pub fn commit_manipulation(&mut self) -> bool {
        self.manipulator.commit(&self.scene, &mut self.history)
    }

    pub fn cancel_manipulation(&mut self) -> usize {
        self.manipulator.cancel(&mut self.scene)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Execute a command and record it for undo/redo.
    pub fn execute(&mut self, command: EditCommand) -> CommandResult<CommandOutcome> {
        commands::execute(self, command)
    }
}
