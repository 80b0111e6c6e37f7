//! Multi-object transform manipulation.
//!
//! While the transform handle drives the reference entity directly, every
//! other selected entity follows it: on each tick the reference's change
//! relative to its baseline is re-applied to each follower's own baseline.
//! Ticks only touch live transforms. History is written once, at commit.

use std::collections::HashSet;

use crate::core::{
    EditHistory, EntityId, EntityPatch, HistoryEntry, SceneStore, Selection, Transform,
    TransformSnapshot,
};

/// Current manipulation mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ManipulationMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl ManipulationMode {
    pub fn label(&self) -> &'static str {
        match self {
            ManipulationMode::Translate => "Move",
            ManipulationMode::Rotate => "Rotate",
            ManipulationMode::Scale => "Scale",
        }
    }
}

/// Lifecycle of one gesture.
///
/// `Capturing` and `Committing` only last for the duration of
/// [`TransformManipulator::begin`] and [`TransformManipulator::commit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ManipulationPhase {
    #[default]
    Idle,
    Capturing,
    Streaming,
    Committing,
}

/// Transform of one entity recorded at gesture start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    pub id: EntityId,
    pub transform: Transform,
}

/// Drives a selection as one ensemble from its reference entity.
#[derive(Clone, Debug, Default)]
pub struct TransformManipulator {
    phase: ManipulationPhase,
    mode: ManipulationMode,
    reference: Option<EntityId>,
    /// Captured baselines still following the reference, in selection order
    baselines: Vec<Baseline>,
    /// Baselines of entities that left the selection mid-gesture
    detached: Vec<Baseline>,
    /// Whether frozen entities follow the reference
    move_frozen: bool,
}

impl TransformManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_move_frozen(mut self, move_frozen: bool) -> Self {
        self.move_frozen = move_frozen;
        self
    }

    pub fn set_move_frozen(&mut self, move_frozen: bool) {
        self.move_frozen = move_frozen;
    }

    pub fn phase(&self) -> ManipulationPhase {
        self.phase
    }

    pub fn mode(&self) -> ManipulationMode {
        self.mode
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.phase != ManipulationPhase::Idle
    }

    pub fn reference(&self) -> Option<EntityId> {
        self.reference
    }

    pub fn baselines(&self) -> &[Baseline] {
        &self.baselines
    }

    pub fn baseline(&self, id: EntityId) -> Option<&Transform> {
        self.baselines.iter().find(|b| b.id == id).map(|b| &b.transform)
    }

    /// Start a gesture: capture a baseline for every selected entity.
    ///
    /// Returns false and stays idle if a gesture is already running, nothing
    /// is selected, or the reference entity does not resolve.
    pub fn begin(
        &mut self,
        mode: ManipulationMode,
        scene: &dyn SceneStore,
        selection: &dyn Selection,
    ) -> bool {
        if self.is_active() {
            log::warn!("Manipulation already in progress, ignoring begin");
            return false;
        }

        let (selected, reference) = selection.current();
        let Some(reference) = reference.or_else(|| selected.last().copied()) else {
            return false;
        };
        if scene.lookup(reference).is_none() {
            log::debug!("Reference {} no longer exists, not starting", reference);
            return false;
        }

        self.phase = ManipulationPhase::Capturing;
        self.mode = mode;
        self.reference = Some(reference);
        self.baselines.clear();
        self.detached.clear();

        for id in selected.iter().copied().chain(std::iter::once(reference)) {
            if self.baseline(id).is_some() {
                continue;
            }
            let Some(entity) = scene.lookup(id) else {
                log::debug!("Selected {} no longer exists, skipping", id);
                continue;
            };
            if entity.frozen && id != reference && !self.move_frozen {
                continue;
            }
            self.baselines.push(Baseline { id, transform: entity.transform });
        }

        log::trace!("{} started on {} entities", mode.label(), self.baselines.len());
        self.phase = ManipulationPhase::Streaming;
        true
    }

    /// Propagate the reference entity's current change to every follower.
    ///
    /// Followers that left the selection are detached first: they stop
    /// receiving deltas, but commit still records them and cancel still
    /// restores them. The reference keeps driving even if it was deselected.
    /// Returns the number of followers updated.
    pub fn tick(&mut self, scene: &mut dyn SceneStore, selection: &dyn Selection) -> usize {
        if self.phase != ManipulationPhase::Streaming {
            return 0;
        }

        let Some(reference) = self.reference else {
            return 0;
        };

        let (selected, _) = selection.current();
        let selected: HashSet<EntityId> = selected.into_iter().collect();
        let (following, detached): (Vec<Baseline>, Vec<Baseline>) = self
            .baselines
            .drain(..)
            .partition(|b| b.id == reference || selected.contains(&b.id));
        self.baselines = following;
        self.detached.extend(detached);

        let Some(reference_base) = self.baseline(reference).copied() else {
            return 0;
        };
        let Some(reference_live) = scene.lookup(reference).map(|e| e.transform) else {
            return 0;
        };

        let mut updated = 0;
        for follower in self.baselines.iter().filter(|b| b.id != reference) {
            let Some(live) = scene.lookup(follower.id).map(|e| e.transform) else {
                continue;
            };
            let derived = derive(
                self.mode,
                &reference_base,
                &reference_live,
                &follower.transform,
                &live,
            );
            if scene.apply(follower.id, &EntityPatch::transform(derived)) {
                updated += 1;
            }
        }
        updated
    }

    /// End the gesture, recording one `Transform` entry per changed entity.
    ///
    /// Several entries are wrapped in one batch. Returns whether anything
    /// was recorded.
    pub fn commit(&mut self, scene: &dyn SceneStore, history: &mut EditHistory) -> bool {
        if self.phase != ManipulationPhase::Streaming {
            return false;
        }
        self.phase = ManipulationPhase::Committing;

        let mut entries = Vec::new();
        for baseline in self.baselines.drain(..).chain(self.detached.drain(..)) {
            let Some(entity) = scene.lookup(baseline.id) else {
                log::debug!("{} vanished during manipulation, skipping", baseline.id);
                continue;
            };
            if entity.transform != baseline.transform {
                entries.push(HistoryEntry::Transform {
                    id: baseline.id,
                    before: TransformSnapshot::full(&baseline.transform),
                    after: TransformSnapshot::full(&entity.transform),
                });
            }
        }

        let recorded = !entries.is_empty();
        if entries.len() == 1 {
            if let Some(entry) = entries.pop() {
                history.push_entry(entry);
            }
        } else if recorded {
            history.push_entry(HistoryEntry::batch(self.mode.label(), entries));
        }

        self.reset();
        recorded
    }

    /// Abort the gesture, restoring every captured entity to its baseline.
    /// Returns the number of entities restored.
    pub fn cancel(&mut self, scene: &mut dyn SceneStore) -> usize {
        if !self.is_active() {
            return 0;
        }

        let restored = self
            .baselines
            .iter()
            .chain(&self.detached)
            .filter(|b| scene.apply(b.id, &EntityPatch::transform(TransformSnapshot::full(&b.transform))))
            .count();
        log::trace!("{} cancelled, restored {} entities", self.mode.label(), restored);
        self.reset();
        restored
    }

    /// Forget the gesture without touching the scene (e.g. when the scene was replaced).
    pub fn reset(&mut self) {
        self.phase = ManipulationPhase::Idle;
        self.reference = None;
        self.baselines.clear();
        self.detached.clear();
    }
}

/// Follower transform component for the current tick.
fn derive(
    mode: ManipulationMode,
    reference_base: &Transform,
    reference_live: &Transform,
    follower_base: &Transform,
    follower_live: &Transform,
) -> TransformSnapshot {
    match mode {
        ManipulationMode::Translate => {
            let delta = sub(reference_live.position, reference_base.position);
            TransformSnapshot::position(add(follower_base.position, delta))
        }
        // Per-axis Euler delta; exact only while rotating about a single axis.
        ManipulationMode::Rotate => {
            let delta = sub(reference_live.rotation, reference_base.rotation);
            TransformSnapshot::rotation(add(follower_base.rotation, delta))
        }
        ManipulationMode::Scale => {
            let mut scale = follower_live.scale;
            for axis in 0..3 {
                let base = reference_base.scale[axis];
                if base == 0.0 || !base.is_finite() {
                    continue;
                }
                let value = follower_base.scale[axis] * (reference_live.scale[axis] / base);
                if value.is_finite() {
                    scale[axis] = value;
                }
            }
            TransformSnapshot::scale(scale)
        }
    }
}

fn add(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}
