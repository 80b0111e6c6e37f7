//! History entries: recorded, reversible scene mutations.
//!
//! Every entry owns deep copies of the values it needs, so later live edits
//! never alter what was recorded. Entries are applied against a
//! [`SceneStore`] on a best-effort basis: a sub-step whose target no longer
//! resolves is skipped and the rest still applies.

use super::{
    EntityFields, EntityId, EntityPatch, PartId, SceneEntity, SceneStore, Transform,
    TransformSnapshot,
};

/// Recorded before/after transforms of one composite sub-part.
#[derive(Clone, Debug, PartialEq)]
pub struct PartChange {
    pub part: PartId,
    pub before: Transform,
    pub after: Transform,
}

/// A reversible scene mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum HistoryEntry {
    /// An entity was inserted.
    Add { snapshot: SceneEntity },
    /// An entity was deleted from storage position `index`.
    Remove { snapshot: SceneEntity, index: usize },
    /// Non-transform fields changed.
    Update {
        id: EntityId,
        before: EntityFields,
        after: EntityFields,
    },
    /// Transform components changed.
    Transform {
        id: EntityId,
        before: TransformSnapshot,
        after: TransformSnapshot,
    },
    /// Parent changed.
    Reparent {
        id: EntityId,
        before: Option<EntityId>,
        after: Option<EntityId>,
    },
    /// Sub-parts of composite entities moved.
    PartTransform { parts: Vec<PartChange> },
    /// Entries that undo and redo together.
    Batch {
        label: Option<String>,
        entries: Vec<HistoryEntry>,
    },
}

impl HistoryEntry {
    /// Transform entry covering only the components that differ.
    pub fn transform(id: EntityId, before: &Transform, after: &Transform) -> Self {
        let (before, after) = TransformSnapshot::diff(before, after);
        HistoryEntry::Transform { id, before, after }
    }

    pub fn batch(label: impl Into<String>, entries: Vec<HistoryEntry>) -> Self {
        HistoryEntry::Batch {
            label: Some(label.into()),
            entries,
        }
    }

    /// Human-readable description for the undo/redo menu.
    pub fn description(&self) -> &str {
        match self {
            HistoryEntry::Add { .. } => "Create Entity",
            HistoryEntry::Remove { .. } => "Delete Entity",
            HistoryEntry::Update { .. } => "Edit Properties",
            HistoryEntry::Transform { .. } => "Transform",
            HistoryEntry::Reparent { .. } => "Reparent Entity",
            HistoryEntry::PartTransform { .. } => "Move Parts",
            HistoryEntry::Batch { label, .. } => label.as_deref().unwrap_or("Batch"),
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, HistoryEntry::Batch { .. })
    }

    /// Number of leaf (non-batch) entries.
    pub fn leaf_count(&self) -> usize {
        match self {
            HistoryEntry::Batch { entries, .. } => entries.iter().map(HistoryEntry::leaf_count).sum(),
            _ => 1,
        }
    }

    /// Replay the mutation.
    pub fn apply_forward(&self, scene: &mut dyn SceneStore) {
        match self {
            HistoryEntry::Add { snapshot } => scene.insert(snapshot.clone()),
            HistoryEntry::Remove { snapshot, .. } => delete(scene, snapshot.id),
            HistoryEntry::Update { id, after, .. } => apply(scene, *id, &EntityPatch::from(after)),
            HistoryEntry::Transform { id, after, .. } => {
                apply(scene, *id, &EntityPatch::transform(*after))
            }
            HistoryEntry::Reparent { id, after, .. } => apply(scene, *id, &EntityPatch::parent(*after)),
            HistoryEntry::PartTransform { parts } => {
                for change in parts {
                    apply_part(scene, change.part, change.after);
                }
            }
            HistoryEntry::Batch { entries, .. } => {
                for entry in entries {
                    entry.apply_forward(scene);
                }
            }
        }
    }

    /// Revert the mutation.
    pub fn apply_inverse(&self, scene: &mut dyn SceneStore) {
        match self {
            HistoryEntry::Add { snapshot } => delete(scene, snapshot.id),
            HistoryEntry::Remove { snapshot, index } => scene.insert_at(*index, snapshot.clone()),
            HistoryEntry::Update { id, before, .. } => apply(scene, *id, &EntityPatch::from(before)),
            HistoryEntry::Transform { id, before, .. } => {
                apply(scene, *id, &EntityPatch::transform(*before))
            }
            HistoryEntry::Reparent { id, before, .. } => {
                apply(scene, *id, &EntityPatch::parent(*before))
            }
            HistoryEntry::PartTransform { parts } => {
                for change in parts.iter().rev() {
                    apply_part(scene, change.part, change.before);
                }
            }
            HistoryEntry::Batch { entries, .. } => {
                for entry in entries.iter().rev() {
                    entry.apply_inverse(scene);
                }
            }
        }
    }
}

fn apply(scene: &mut dyn SceneStore, id: EntityId, patch: &EntityPatch) {
    if !scene.apply(id, patch) {
        log::debug!("{} no longer exists, skipping", id);
    }
}

fn delete(scene: &mut dyn SceneStore, id: EntityId) {
    if scene.delete(id).is_none() {
        log::debug!("{} already deleted, skipping", id);
    }
}

fn apply_part(scene: &mut dyn SceneStore, part: PartId, transform: Transform) {
    match scene.find_part_owner(part) {
        Some(owner) => apply(scene, owner, &EntityPatch::part(part, transform)),
        None => log::debug!("{} no longer exists, skipping", part),
    }
}
