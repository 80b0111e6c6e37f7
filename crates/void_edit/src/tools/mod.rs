//! Interactive editing tools.

mod manipulation;

pub use manipulation::{Baseline, ManipulationMode, ManipulationPhase, TransformManipulator};
