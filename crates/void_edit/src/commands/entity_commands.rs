//! Entity creation, deletion, duplication and hierarchy commands.

use crate::core::{
    EditDocument, EntityFields, EntityId, EntityPart, EntityPatch, HistoryEntry, SceneEntity,
    SceneStore, Transform,
};

use super::{CommandError, CommandOutcome, CommandResult, PartSpec};

fn require(doc: &EditDocument, id: EntityId) -> CommandResult<&SceneEntity> {
    doc.scene.get(id).ok_or(CommandError::EntityNotFound(id))
}

/// Run `body` inside a history batch unless the caller already opened one.
fn batched<T>(
    doc: &mut EditDocument,
    label: &str,
    body: impl FnOnce(&mut EditDocument) -> T,
) -> T {
    let opened = !doc.history.in_batch();
    if opened {
        doc.history.begin_named_batch(label);
    }
    let result = body(doc);
    if opened {
        doc.history.end_batch();
    }
    result
}

/// Create a new entity as the last child of `parent`.
pub fn create_entity(
    doc: &mut EditDocument,
    name: String,
    parent: Option<EntityId>,
    transform: Transform,
    parts: Vec<PartSpec>,
) -> CommandResult<CommandOutcome> {
    if let Some(parent) = parent {
        require(doc, parent)?;
    }

    let id = doc.scene.next_entity_id();
    let mut entity = SceneEntity::new(id, name)
        .with_parent(parent)
        .with_order(doc.scene.next_order(parent))
        .with_transform(transform);
    for part in parts {
        let part_id = doc.scene.next_part_id();
        entity.parts.push(EntityPart::new(part_id, part.name).with_transform(part.transform));
    }

    log::info!("Created entity: {} ({})", entity.name, id);
    doc.scene.insert(entity.clone());
    doc.history.push_entry(HistoryEntry::Add { snapshot: entity });
    Ok(CommandOutcome::Created { ids: vec![id] })
}

/// Delete entities as one undo step.
///
/// Before each entity is removed, its children are re-parented to the
/// entity's own parent and the moves are recorded ahead of the removal, so
/// undo restores the entity first and then puts the children back.
pub fn delete_entities(doc: &mut EditDocument, ids: &[EntityId]) -> CommandResult<CommandOutcome> {
    for &id in ids {
        require(doc, id)?;
    }
    if ids.is_empty() {
        return Ok(CommandOutcome::Unchanged);
    }

    let removed = batched(doc, "Delete", |doc| {
        let mut removed = 0;
        for &id in ids {
            // Already removed earlier in this call when listed twice
            let Some(parent) = doc.scene.get(id).map(|e| e.parent) else {
                continue;
            };

            for child in doc.scene.children_of(id) {
                doc.scene.apply(child, &EntityPatch::parent(parent));
                doc.history.push_entry(HistoryEntry::Reparent {
                    id: child,
                    before: Some(id),
                    after: parent,
                });
            }

            let index = doc.scene.index_of(id).unwrap_or(usize::MAX);
            if let Some(snapshot) = doc.scene.delete(id) {
                log::info!("Deleted entity: {} ({})", snapshot.name, id);
                doc.selection.remove_entity(id);
                doc.history.push_entry(HistoryEntry::Remove { snapshot, index });
                removed += 1;
            }
        }
        removed
    });

    log::debug!("Deleted {} entities", removed);
    Ok(CommandOutcome::Applied)
}

/// Duplicate entities next to their originals and select the copies.
pub fn duplicate_entities(
    doc: &mut EditDocument,
    ids: &[EntityId],
    offset: [f32; 3],
) -> CommandResult<CommandOutcome> {
    let sources = ids
        .iter()
        .map(|&id| require(doc, id).cloned())
        .collect::<CommandResult<Vec<_>>>()?;
    if sources.is_empty() {
        return Ok(CommandOutcome::Unchanged);
    }

    let created = batched(doc, "Duplicate", |doc| {
        let mut created = Vec::with_capacity(sources.len());
        for source in sources {
            let id = doc.scene.next_entity_id();
            let mut copy = source.clone();
            copy.id = id;
            copy.name = format!("{} (Copy)", source.name);
            copy.order = doc.scene.next_order(source.parent);
            for (axis, delta) in offset.iter().enumerate() {
                copy.transform.position[axis] += delta;
            }
            for part in &mut copy.parts {
                part.id = doc.scene.next_part_id();
            }

            log::info!("Duplicated entity: {}", copy.name);
            doc.scene.insert(copy.clone());
            doc.history.push_entry(HistoryEntry::Add { snapshot: copy });
            created.push(id);
        }
        created
    });

    doc.selection.select_multiple(created.iter().copied());
    Ok(CommandOutcome::Created { ids: created })
}

/// Change an entity's parent. Moves that would create a cycle are rejected.
pub fn reparent(
    doc: &mut EditDocument,
    id: EntityId,
    parent: Option<EntityId>,
) -> CommandResult<CommandOutcome> {
    let current = require(doc, id)?.parent;
    if let Some(new_parent) = parent {
        require(doc, new_parent)?;
        if doc.scene.is_ancestor_or_self(id, new_parent) {
            return Err(CommandError::InvalidOperation(format!(
                "cannot parent {} under its own descendant {}",
                id, new_parent
            )));
        }
    }
    if current == parent {
        return Ok(CommandOutcome::Unchanged);
    }

    doc.scene.apply(id, &EntityPatch::parent(parent));
    doc.history.push_entry(HistoryEntry::Reparent { id, before: current, after: parent });

    let parent_name = parent
        .and_then(|p| doc.scene.get(p))
        .map(|e| e.name.clone())
        .unwrap_or_else(|| "root".to_string());
    log::info!("Reparented {} to {}", id, parent_name);
    Ok(CommandOutcome::Applied)
}

/// Change name, visibility or frozen state.
pub fn update_fields(
    doc: &mut EditDocument,
    id: EntityId,
    after: EntityFields,
) -> CommandResult<CommandOutcome> {
    let before = EntityFields::capture(require(doc, id)?, &after);
    if after.is_empty() || before == after {
        return Ok(CommandOutcome::Unchanged);
    }

    doc.scene.apply(id, &EntityPatch::from(&after));
    doc.history.push_entry(HistoryEntry::Update { id, before, after });
    Ok(CommandOutcome::Applied)
}
