//! Edit session tests for void_edit
//!
//! These tests drive a whole document the way the editor does: gestures,
//! commands, undo and redo against the in-memory scene.

use approx::assert_relative_eq;
use void_edit::{
    CommandError, CommandOutcome, EditCommand, EditDocument, EditPreferences, EntityId,
    EntityPart, EntityPatch, HistoryEntry, ManipulationMode, PartId, SceneEntity, SceneStore,
    Transform, TransformSnapshot,
};

fn entity(id: u32, name: &str) -> SceneEntity {
    SceneEntity::new(EntityId(id), name)
}

fn document(entities: impl IntoIterator<Item = SceneEntity>) -> EditDocument {
    let mut doc = EditDocument::new();
    doc.load_scene(entities);
    doc
}

fn transform_of(doc: &EditDocument, id: u32) -> Transform {
    doc.entity(EntityId(id)).map(|e| e.transform).unwrap_or_default()
}

fn drag(doc: &mut EditDocument, id: u32, snapshot: TransformSnapshot) {
    doc.scene.apply(EntityId(id), &EntityPatch::transform(snapshot));
    doc.tick_manipulation();
}

/// Undoing every recorded step restores the scene exactly
#[test]
fn undo_all_restores_scene() {
    let mut doc = document([entity(1, "A"), entity(2, "B"), entity(3, "C")]);
    let original = doc.scene.entities().to_vec();

    let script = [
        r#"{"command": "update_fields", "id": 1, "name": "Alpha", "visible": false}"#,
        r#"{"command": "set_transform", "id": 2, "position": [1.0, 2.0, 3.0]}"#,
        r#"{"command": "reparent", "id": 3, "parent": 2}"#,
        r#"{"command": "create_entity", "name": "D", "parent": 1}"#,
        r#"{"command": "delete_entities", "ids": [2]}"#,
    ];
    for line in script {
        doc.execute(EditCommand::parse(line).expect("parse")).expect("execute");
    }
    assert_eq!(doc.history.undo_count(), script.len());

    while doc.undo() {}
    assert_eq!(doc.scene.entities(), original.as_slice());
    assert_eq!(doc.history.redo_count(), script.len());
}

/// Undo followed by redo leaves scene and history as they were
#[test]
fn undo_redo_round_trip() {
    let mut doc = document([entity(1, "A"), entity(2, "B")]);
    doc.execute(EditCommand::Reparent { id: EntityId(2), parent: Some(EntityId(1)) })
        .expect("reparent");
    doc.execute(EditCommand::SetTransform {
        id: EntityId(1),
        transform: TransformSnapshot::rotation([0.0, 45.0, 0.0]),
    })
    .expect("rotate");

    let scene = doc.scene.entities().to_vec();
    let past: Vec<HistoryEntry> = doc.history.past().cloned().collect();

    assert!(doc.undo());
    assert!(doc.redo());

    assert_eq!(doc.scene.entities(), scene.as_slice());
    assert_eq!(doc.history.past().cloned().collect::<Vec<_>>(), past);
    assert!(!doc.can_redo());
}

/// Recording a new step discards the redo stack
#[test]
fn new_entry_clears_redo() {
    let mut doc = document([entity(1, "A")]);
    doc.execute(EditCommand::UpdateFields {
        id: EntityId(1),
        name: Some("B".into()),
        visible: None,
        frozen: None,
    })
    .expect("rename");
    doc.undo();
    assert!(doc.can_redo());

    doc.execute(EditCommand::UpdateFields {
        id: EntityId(1),
        name: None,
        visible: None,
        frozen: Some(true),
    })
    .expect("freeze");
    assert!(!doc.can_redo());
    assert_eq!(doc.history.future().count(), 0);
}

/// A batch undoes as one step
#[test]
fn batch_undoes_together() {
    let mut doc = document([entity(1, "A"), entity(2, "B")]);
    doc.begin_batch();
    doc.execute(EditCommand::SetTransform {
        id: EntityId(1),
        transform: TransformSnapshot::position([1.0, 0.0, 0.0]),
    })
    .expect("move a");
    doc.execute(EditCommand::SetTransform {
        id: EntityId(2),
        transform: TransformSnapshot::position([2.0, 0.0, 0.0]),
    })
    .expect("move b");
    assert!(doc.end_batch());

    assert_eq!(doc.history.undo_count(), 1);
    assert!(doc.undo());
    assert_eq!(transform_of(&doc, 1).position, [0.0; 3]);
    assert_eq!(transform_of(&doc, 2).position, [0.0; 3]);
    assert!(!doc.undo());
}

/// Moving the reference drags the rest of the selection along
#[test]
fn translate_follows_reference() {
    let mut doc = document([entity(1, "A"), entity(2, "B")]);
    doc.selection.select_multiple([EntityId(1), EntityId(2)]);
    assert_eq!(doc.selection.reference(), Some(EntityId(2)));

    assert!(doc.begin_manipulation(ManipulationMode::Translate));
    drag(&mut doc, 2, TransformSnapshot::position([5.0, 0.0, 0.0]));
    assert!(doc.commit_manipulation());

    assert_eq!(transform_of(&doc, 1).position, [5.0, 0.0, 0.0]);
    assert_eq!(transform_of(&doc, 2).position, [5.0, 0.0, 0.0]);

    let entries: Vec<&HistoryEntry> = doc.history.past().collect();
    assert_eq!(entries.len(), 1);
    let HistoryEntry::Batch { entries: steps, .. } = entries[0] else {
        panic!("expected a batch");
    };
    assert_eq!(steps.len(), 2);
    assert!(steps.iter().all(|e| matches!(e, HistoryEntry::Transform { .. })));

    assert!(doc.undo());
    assert_eq!(transform_of(&doc, 1).position, [0.0; 3]);
    assert_eq!(transform_of(&doc, 2).position, [0.0; 3]);
}

/// Followers keep their own offset from the reference while rotating
#[test]
fn rotate_applies_delta() {
    let mut doc = document([
        entity(1, "A").with_transform(Transform::new().with_rotation([0.0, 10.0, 0.0])),
        entity(2, "B"),
    ]);
    doc.selection.select_multiple([EntityId(1), EntityId(2)]);

    doc.begin_manipulation(ManipulationMode::Rotate);
    drag(&mut doc, 2, TransformSnapshot::rotation([0.0, 30.0, 0.0]));
    drag(&mut doc, 2, TransformSnapshot::rotation([0.0, 45.0, 0.0]));
    doc.commit_manipulation();

    assert_relative_eq!(transform_of(&doc, 1).rotation[1], 55.0, epsilon = 1e-4);
    assert_eq!(doc.undo_description(), Some("Rotate"));
}

/// Deleting a parent moves its children up first
#[test]
fn remove_with_children() {
    let mut doc = document([
        entity(1, "Parent"),
        entity(2, "C1").with_parent(Some(EntityId(1))).with_order(0),
        entity(3, "C2").with_parent(Some(EntityId(1))).with_order(1),
    ]);

    doc.execute(EditCommand::DeleteEntities { ids: vec![EntityId(1)] }).expect("delete");
    assert!(doc.entity(EntityId(1)).is_none());
    assert_eq!(doc.entity(EntityId(2)).and_then(|e| e.parent), None);

    let Some(HistoryEntry::Batch { entries, .. }) = doc.history.past().next() else {
        panic!("expected a batch");
    };
    assert!(matches!(
        entries.as_slice(),
        [HistoryEntry::Reparent { .. }, HistoryEntry::Reparent { .. }, HistoryEntry::Remove { .. }]
    ));

    assert!(doc.undo());
    assert!(doc.entity(EntityId(1)).is_some());
    assert_eq!(doc.entity(EntityId(2)).and_then(|e| e.parent), Some(EntityId(1)));
    assert_eq!(doc.entity(EntityId(3)).and_then(|e| e.parent), Some(EntityId(1)));
}

/// Scaling never divides a zero axis into NaN
#[test]
fn scale_with_zero_axis_stays_finite() {
    let mut doc = document([
        entity(1, "Flat").with_transform(Transform::new().with_scale([0.0, 1.0, 1.0])),
        entity(2, "Ref").with_transform(Transform::new().with_scale([0.0, 1.0, 2.0])),
    ]);
    doc.selection.select_multiple([EntityId(1), EntityId(2)]);

    doc.begin_manipulation(ManipulationMode::Scale);
    drag(&mut doc, 2, TransformSnapshot::scale([3.0, 2.0, 4.0]));
    doc.commit_manipulation();

    let scale = transform_of(&doc, 1).scale;
    assert_eq!(scale[0], 0.0);
    assert_relative_eq!(scale[1], 2.0);
    assert_relative_eq!(scale[2], 2.0);
    assert!(scale.iter().all(|v| v.is_finite()));
}

/// Cancelling a gesture puts everything back and records nothing
#[test]
fn cancel_restores_exactly() {
    let mut doc = document([
        entity(1, "A").with_transform(Transform::new().with_position([0.1, 0.2, 0.3])),
        entity(2, "B").with_transform(Transform::new().with_uniform_scale(1.7)),
        entity(3, "C"),
    ]);
    let original = doc.scene.entities().to_vec();
    doc.selection.select_multiple([EntityId(1), EntityId(2), EntityId(3)]);

    doc.begin_manipulation(ManipulationMode::Translate);
    for step in 1..=5 {
        drag(&mut doc, 3, TransformSnapshot::position([step as f32 * 0.37, -1.3, 9.1]));
    }
    assert_eq!(doc.cancel_manipulation(), 3);

    assert_eq!(doc.scene.entities(), original.as_slice());
    assert!(!doc.can_undo());
    assert!(!doc.manipulator.is_active());
}

/// An entity dropped from the selection mid-gesture is still restored on cancel
#[test]
fn cancel_after_deselect_restores_exactly() {
    let mut doc = document([entity(1, "A"), entity(2, "B"), entity(3, "C")]);
    let original = doc.scene.entities().to_vec();
    doc.selection.select_multiple([EntityId(1), EntityId(2), EntityId(3)]);

    doc.begin_manipulation(ManipulationMode::Translate);
    drag(&mut doc, 3, TransformSnapshot::position([4.0, 0.0, 0.0]));
    doc.selection.remove_entity(EntityId(1));
    drag(&mut doc, 3, TransformSnapshot::position([5.0, 0.0, 0.0]));
    assert_eq!(transform_of(&doc, 1).position, [4.0, 0.0, 0.0]);

    doc.cancel_manipulation();
    assert_eq!(doc.scene.entities(), original.as_slice());
    assert!(!doc.can_undo());
}

/// An entity dropped from the selection mid-gesture is recorded on commit
#[test]
fn commit_after_deselect_undoes_exactly() {
    let mut doc = document([entity(1, "A"), entity(2, "B"), entity(3, "C")]);
    let original = doc.scene.entities().to_vec();
    doc.selection.select_multiple([EntityId(1), EntityId(2), EntityId(3)]);

    doc.begin_manipulation(ManipulationMode::Translate);
    drag(&mut doc, 3, TransformSnapshot::position([4.0, 0.0, 0.0]));
    doc.selection.remove_entity(EntityId(1));
    drag(&mut doc, 3, TransformSnapshot::position([5.0, 0.0, 0.0]));
    assert!(doc.commit_manipulation());

    while doc.undo() {}
    assert_eq!(doc.scene.entities(), original.as_slice());
}

/// Deselecting the reference does not lose its own change
#[test]
fn deselected_reference_is_committed() {
    let mut doc = document([entity(1, "A"), entity(2, "B")]);
    doc.selection.select_multiple([EntityId(1), EntityId(2)]);

    doc.begin_manipulation(ManipulationMode::Translate);
    drag(&mut doc, 2, TransformSnapshot::position([1.0, 0.0, 0.0]));
    doc.selection.clear();
    drag(&mut doc, 2, TransformSnapshot::position([2.0, 0.0, 0.0]));
    assert!(doc.commit_manipulation());

    assert_eq!(transform_of(&doc, 1).position, [1.0, 0.0, 0.0]);
    assert_eq!(transform_of(&doc, 2).position, [2.0, 0.0, 0.0]);
    assert!(doc.undo());
    assert_eq!(transform_of(&doc, 1).position, [0.0; 3]);
    assert_eq!(transform_of(&doc, 2).position, [0.0; 3]);
}

/// The largest ids load and leave room for new entities
#[test]
fn max_ids_load_and_create() {
    let mut doc = document([
        entity(u32::MAX, "Max").with_part(EntityPart::new(PartId(u64::MAX), "Edge")),
    ]);

    let outcome = doc
        .execute(EditCommand::CreateEntity {
            name: "Next".into(),
            parent: None,
            transform: Transform::new(),
            parts: vec![],
        })
        .expect("create");
    assert_eq!(outcome, CommandOutcome::Created { ids: vec![EntityId(1)] });

    doc.execute(EditCommand::DeleteEntities { ids: vec![EntityId(u32::MAX)] }).expect("delete");
    assert!(doc.undo());
    assert_eq!(doc.scene.entity_ids(), vec![EntityId(u32::MAX), EntityId(1)]);
}

/// Frozen entities stay put unless preferences allow moving them
#[test]
fn frozen_entities_are_skipped() {
    let mut doc = document([entity(1, "Locked").frozen(true), entity(2, "Ref")]);
    doc.selection.select_multiple([EntityId(1), EntityId(2)]);

    doc.begin_manipulation(ManipulationMode::Translate);
    drag(&mut doc, 2, TransformSnapshot::position([1.0, 0.0, 0.0]));
    doc.commit_manipulation();
    assert_eq!(transform_of(&doc, 1).position, [0.0; 3]);

    doc.set_preferences(EditPreferences { move_frozen: true, ..EditPreferences::default() });
    doc.selection.select_multiple([EntityId(1), EntityId(2)]);
    doc.begin_manipulation(ManipulationMode::Translate);
    drag(&mut doc, 2, TransformSnapshot::position([2.0, 0.0, 0.0]));
    doc.commit_manipulation();
    assert_eq!(transform_of(&doc, 1).position, [1.0, 0.0, 0.0]);
}

/// History stays within the configured limit
#[test]
fn history_limit_drops_oldest() {
    let mut doc = EditDocument::with_preferences(EditPreferences {
        history_limit: 2,
        ..EditPreferences::default()
    });
    doc.load_scene([entity(1, "A")]);

    for x in 1..=4 {
        doc.execute(EditCommand::SetTransform {
            id: EntityId(1),
            transform: TransformSnapshot::position([x as f32, 0.0, 0.0]),
        })
        .expect("move");
    }
    assert_eq!(doc.history.undo_count(), 2);

    while doc.undo() {}
    assert_eq!(transform_of(&doc, 1).position, [2.0, 0.0, 0.0]);
}

/// Sub-part edits survive deleting and restoring their owner
#[test]
fn part_transform_after_owner_restored() {
    let mut doc = document([
        entity(1, "Cabinet").with_part(EntityPart::new(PartId(7), "Door")),
    ]);
    let open = Transform::new().with_rotation([0.0, 90.0, 0.0]);

    doc.execute(EditCommand::SetPartTransform { part: PartId(7), transform: open })
        .expect("open door");
    doc.execute(EditCommand::DeleteEntities { ids: vec![EntityId(1)] }).expect("delete");
    assert!(matches!(
        doc.execute(EditCommand::SetPartTransform { part: PartId(7), transform: open }),
        Err(CommandError::PartNotFound(PartId(7)))
    ));

    doc.undo();
    doc.undo();
    let door = doc.entity(EntityId(1)).and_then(|e| e.part(PartId(7))).map(|p| p.transform);
    assert_eq!(door, Some(Transform::new()));
}
