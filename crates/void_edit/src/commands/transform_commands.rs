//! Direct transform edits (inspector fields, scripted moves).

use crate::core::{
    EditDocument, EntityId, HistoryEntry, PartChange, PartId, SceneStore, Transform,
    TransformSnapshot,
};

use super::{CommandError, CommandOutcome, CommandResult};

/// Overwrite the components set in `transform`. Only components that actually
/// change are recorded.
pub fn set_transform(
    doc: &mut EditDocument,
    id: EntityId,
    transform: TransformSnapshot,
) -> CommandResult<CommandOutcome> {
    let before = doc
        .scene
        .get(id)
        .ok_or(CommandError::EntityNotFound(id))?
        .transform;
    let after = transform.applied(&before);
    if !after.is_finite() {
        return Err(CommandError::InvalidOperation(format!(
            "non-finite transform for {}",
            id
        )));
    }
    if after == before {
        return Ok(CommandOutcome::Unchanged);
    }

    let entry = HistoryEntry::transform(id, &before, &after);
    entry.apply_forward(&mut doc.scene);
    log::trace!("Set transform of {}", id);
    doc.history.push_entry(entry);
    Ok(CommandOutcome::Applied)
}

/// Move one sub-part of a composite entity. The owner is found by a full
/// scene traversal.
pub fn set_part_transform(
    doc: &mut EditDocument,
    part: PartId,
    transform: Transform,
) -> CommandResult<CommandOutcome> {
    let before = doc
        .scene
        .find_part_owner(part)
        .and_then(|owner| doc.scene.get(owner)?.part(part))
        .map(|p| p.transform)
        .ok_or(CommandError::PartNotFound(part))?;
    if !transform.is_finite() {
        return Err(CommandError::InvalidOperation(format!(
            "non-finite transform for {}",
            part
        )));
    }
    if transform == before {
        return Ok(CommandOutcome::Unchanged);
    }

    let entry = HistoryEntry::PartTransform {
        parts: vec![PartChange { part, before, after: transform }],
    };
    entry.apply_forward(&mut doc.scene);
    doc.history.push_entry(entry);
    Ok(CommandOutcome::Applied)
}
