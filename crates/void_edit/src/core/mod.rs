//! Core edit types and state management.
//!
//! This module contains the scene data model, the store and selection
//! contracts the engines consume, the undo/redo history and the
//! `EditDocument` that ties them together.

pub mod document;
pub mod entry;
mod history;
mod preferences;
pub mod scene;
mod selection;
pub mod store;

pub use document::EditDocument;
pub use entry::{HistoryEntry, PartChange};
pub use history::EditHistory;
pub use preferences::{EditPreferences, PreferencesError};
pub use scene::{EntityFields, EntityPart, EntityPatch, SceneEntity, Transform, TransformSnapshot};
pub use selection::{Selection, SelectionManager, SelectionMode};
pub use store::{SceneGraph, SceneStore};

use serde::{Deserialize, Serialize};

/// Entity identifier used throughout the edit core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Stable identifier of a rigid sub-part inside a composite entity.
///
/// Part ids are unique across the whole scene, not just within their owner,
/// so a part can be found again after its owner was re-inserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(pub u64);

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Part({})", self.0)
    }
}
