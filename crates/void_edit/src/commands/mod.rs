//! Named edit operations for undo/redo support.
//!
//! Every operation mutates the scene and records the matching history entry
//! in one step, so edits made through [`execute`] are always undoable.

mod command;
mod entity_commands;
mod transform_commands;

pub use command::{CommandError, CommandOutcome, CommandResult, EditCommand, PartSpec};
pub use entity_commands::{
    create_entity, delete_entities, duplicate_entities, reparent, update_fields,
};
pub use transform_commands::{set_part_transform, set_transform};

use crate::core::{EditDocument, EntityFields};

/// Execute a command against `doc`.
///
/// Structural commands validate their targets before touching the scene, so
/// an error leaves both the scene and the history unchanged.
pub fn execute(doc: &mut EditDocument, command: EditCommand) -> CommandResult<CommandOutcome> {
    log::debug!("Executing {}", command.name());
    match command {
        EditCommand::CreateEntity { name, parent, transform, parts } => {
            create_entity(doc, name, parent, transform, parts)
        }
        EditCommand::DeleteEntities { ids } => delete_entities(doc, &ids),
        EditCommand::DuplicateEntities { ids, offset } => duplicate_entities(doc, &ids, offset),
        EditCommand::Reparent { id, parent } => reparent(doc, id, parent),
        EditCommand::UpdateFields { id, name, visible, frozen } => {
            update_fields(doc, id, EntityFields { name, visible, frozen, parent: None })
        }
        EditCommand::SetTransform { id, transform } => set_transform(doc, id, transform),
        EditCommand::SetPartTransform { part, transform } => {
            set_part_transform(doc, part, transform)
        }
        EditCommand::Select { ids } => {
            if let Some(&missing) = ids.iter().find(|&&id| !doc.scene.contains(id)) {
                return Err(CommandError::EntityNotFound(missing));
            }
            doc.selection.select_multiple(ids);
            Ok(CommandOutcome::Applied)
        }
        EditCommand::ClearSelection => {
            if doc.selection.is_empty() {
                return Ok(CommandOutcome::Unchanged);
            }
            doc.selection.clear();
            Ok(CommandOutcome::Applied)
        }
        EditCommand::Undo => Ok(CommandOutcome::History { changed: doc.undo() }),
        EditCommand::Redo => Ok(CommandOutcome::History { changed: doc.redo() }),
        EditCommand::BeginBatch { label } => {
            if doc.history.in_batch() {
                return Err(CommandError::InvalidOperation("a batch is already open".into()));
            }
            match label {
                Some(label) => doc.history.begin_named_batch(label),
                None => doc.history.begin_batch(),
            }
            Ok(CommandOutcome::Applied)
        }
        EditCommand::EndBatch => {
            if !doc.history.in_batch() {
                return Err(CommandError::InvalidOperation("no batch is open".into()));
            }
            if doc.history.end_batch() {
                Ok(CommandOutcome::Applied)
            } else {
                Ok(CommandOutcome::Unchanged)
            }
        }
    }
}
