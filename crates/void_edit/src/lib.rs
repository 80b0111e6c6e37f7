//! Void Engine Edit Core
//!
//! The transactional heart of the Void scene editor: reversible history
//! entries, undo/redo with batching, and multi-object transform manipulation.
//!
//! ## Features
//!
//! - **Undo/Redo**: Bounded history of typed, reversible entries
//! - **Batches**: Group any number of edits into one undo step
//! - **Multi-Select Manipulation**: Move, rotate or scale a selection by
//!   following the reference entity's live transform
//! - **Commands**: JSON-addressable named operations over one document
//!
//! ## Architecture
//!
//! ```text
//! Command / Gesture → EditDocument → SceneStore + EditHistory
//! ```
//!
//! Every modification records a [`HistoryEntry`] so it can be undone.

pub mod commands;
pub mod core;
pub mod tools;

// Re-export commonly used types
pub use core::{
    EditDocument, EditHistory, EditPreferences, EntityFields, EntityId, EntityPart, EntityPatch,
    HistoryEntry, PartChange, PartId, SceneEntity, SceneGraph, SceneStore, Selection,
    SelectionManager, SelectionMode, Transform, TransformSnapshot,
};

pub use commands::{CommandError, CommandOutcome, CommandResult, EditCommand};

pub use tools::{ManipulationMode, ManipulationPhase, TransformManipulator};

/// Edit core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Edit core name
pub const NAME: &str = "Void Engine Edit Core";
