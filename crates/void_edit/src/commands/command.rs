//! Named edit operations and their result types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{EntityId, PartId, Transform};

/// Result type for command execution.
pub type CommandResult<T = ()> = Result<T, CommandError>;

/// Errors that can occur during command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No operation with this name exists
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Payload could not be decoded
    #[error("Malformed command: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Entity not found
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Part not found
    #[error("Part not found: {0}")]
    PartNotFound(PartId),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Sub-part description for [`EditCommand::CreateEntity`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartSpec {
    pub name: String,
    #[serde(default)]
    pub transform: Transform,
}

/// A named edit operation.
///
/// Each mutating variant is executed against the document's scene and
/// recorded as a history entry, so it can be undone and redone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditCommand {
    /// Create a new entity
    CreateEntity {
        name: String,
        #[serde(default)]
        parent: Option<EntityId>,
        #[serde(default)]
        transform: Transform,
        #[serde(default)]
        parts: Vec<PartSpec>,
    },
    /// Delete entities; their children move up to the deleted entity's parent
    DeleteEntities { ids: Vec<EntityId> },
    /// Copy entities next to the originals
    DuplicateEntities {
        ids: Vec<EntityId>,
        #[serde(default = "default_duplicate_offset")]
        offset: [f32; 3],
    },
    /// Change an entity's parent in the hierarchy
    Reparent {
        id: EntityId,
        #[serde(default)]
        parent: Option<EntityId>,
    },
    /// Change non-transform properties
    UpdateFields {
        id: EntityId,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        visible: Option<bool>,
        #[serde(default)]
        frozen: Option<bool>,
    },
    /// Overwrite some or all transform components
    SetTransform {
        id: EntityId,
        #[serde(flatten)]
        transform: crate::core::TransformSnapshot,
    },
    /// Move one sub-part of a composite entity
    SetPartTransform { part: PartId, transform: Transform },
    /// Replace the selection
    Select { ids: Vec<EntityId> },
    /// Clear selection
    ClearSelection,
    /// Undo the last step
    Undo,
    /// Redo the last undone step
    Redo,
    /// Group following commands into one undo step
    BeginBatch {
        #[serde(default)]
        label: Option<String>,
    },
    /// Close the open group
    EndBatch,
}

fn default_duplicate_offset() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

impl EditCommand {
    /// Every command name accepted by [`EditCommand::parse`].
    pub const NAMES: &'static [&'static str] = &[
        "create_entity",
        "delete_entities",
        "duplicate_entities",
        "reparent",
        "update_fields",
        "set_transform",
        "set_part_transform",
        "select",
        "clear_selection",
        "undo",
        "redo",
        "begin_batch",
        "end_batch",
    ];

    /// Resolve a JSON payload such as `{"command": "undo"}`.
    pub fn parse(json: &str) -> CommandResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let name = value
            .get("command")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| CommandError::InvalidOperation("missing \"command\" field".to_string()))?;
        if !Self::NAMES.contains(&name) {
            return Err(CommandError::UnknownCommand(name.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Operation name, as used in payloads.
    pub fn name(&self) -> &'static str {
        match self {
            EditCommand::CreateEntity { .. } => "create_entity",
            EditCommand::DeleteEntities { .. } => "delete_entities",
            EditCommand::DuplicateEntities { .. } => "duplicate_entities",
            EditCommand::Reparent { .. } => "reparent",
            EditCommand::UpdateFields { .. } => "update_fields",
            EditCommand::SetTransform { .. } => "set_transform",
            EditCommand::SetPartTransform { .. } => "set_part_transform",
            EditCommand::Select { .. } => "select",
            EditCommand::ClearSelection => "clear_selection",
            EditCommand::Undo => "undo",
            EditCommand::Redo => "redo",
            EditCommand::BeginBatch { .. } => "begin_batch",
            EditCommand::EndBatch => "end_batch",
        }
    }
}

/// What a successfully executed command did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// The scene or selection changed
    Applied,
    /// The command was valid but changed nothing
    Unchanged,
    /// New entities were created
    Created { ids: Vec<EntityId> },
    /// Undo or redo ran; `changed` is false when there was nothing to do
    History { changed: bool },
}
