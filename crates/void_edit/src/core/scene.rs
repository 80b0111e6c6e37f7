//! Scene data model: entities, transforms and partial field sets.

use serde::{Deserialize, Serialize};

use super::{EntityId, PartId};

/// Transform component for scene entities.
///
/// Rotation is stored as Euler angles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub const fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    pub fn with_position(mut self, pos: [f32; 3]) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = [scale, scale, scale];
        self
    }

    /// Whether every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.position
            .iter()
            .chain(self.rotation.iter())
            .chain(self.scale.iter())
            .all(|v| v.is_finite())
    }
}

/// Copy of some or all of a transform's components at a point in time.
///
/// Absent components are left untouched when the snapshot is applied, so a
/// snapshot doubles as a minimal diff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
}

impl TransformSnapshot {
    /// Snapshot every component of `transform`.
    pub fn full(transform: &Transform) -> Self {
        Self {
            position: Some(transform.position),
            rotation: Some(transform.rotation),
            scale: Some(transform.scale),
        }
    }

    pub fn position(position: [f32; 3]) -> Self {
        Self { position: Some(position), ..Self::default() }
    }

    pub fn rotation(rotation: [f32; 3]) -> Self {
        Self { rotation: Some(rotation), ..Self::default() }
    }

    pub fn scale(scale: [f32; 3]) -> Self {
        Self { scale: Some(scale), ..Self::default() }
    }

    /// Build the (before, after) pair covering only the components that
    /// differ between the two transforms.
    pub fn diff(before: &Transform, after: &Transform) -> (Self, Self) {
        let mut old = Self::default();
        let mut new = Self::default();
        if before.position != after.position {
            old.position = Some(before.position);
            new.position = Some(after.position);
        }
        if before.rotation != after.rotation {
            old.rotation = Some(before.rotation);
            new.rotation = Some(after.rotation);
        }
        if before.scale != after.scale {
            old.scale = Some(before.scale);
            new.scale = Some(after.scale);
        }
        (old, new)
    }

    /// Overwrite the components present in this snapshot.
    pub fn apply_to(&self, transform: &mut Transform) {
        if let Some(position) = self.position {
            transform.position = position;
        }
        if let Some(rotation) = self.rotation {
            transform.rotation = rotation;
        }
        if let Some(scale) = self.scale {
            transform.scale = scale;
        }
    }

    /// `transform` with this snapshot applied on top.
    pub fn applied(&self, transform: &Transform) -> Transform {
        let mut out = *transform;
        self.apply_to(&mut out);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.scale.is_none()
    }
}

impl From<Transform> for TransformSnapshot {
    fn from(transform: Transform) -> Self {
        Self::full(&transform)
    }
}

/// A rigid sub-part of a composite entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityPart {
    pub id: PartId,
    pub name: String,
    pub transform: Transform,
}

impl EntityPart {
    pub fn new(id: PartId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            transform: Transform::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// A scene entity with all its editable properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneEntity {
    /// Unique identifier
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Parent entity (for hierarchy)
    #[serde(default)]
    pub parent: Option<EntityId>,
    /// Sort key among siblings
    #[serde(default)]
    pub order: i32,
    /// Local transform
    #[serde(default)]
    pub transform: Transform,
    /// Whether entity is visible
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Whether entity is frozen (excluded from group manipulation)
    #[serde(default)]
    pub frozen: bool,
    /// Rigid sub-parts of a composite entity
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<EntityPart>,
}

fn default_visible() -> bool {
    true
}

impl Default for SceneEntity {
    fn default() -> Self {
        Self {
            id: EntityId(0),
            name: "Entity".to_string(),
            parent: None,
            order: 0,
            transform: Transform::new(),
            visible: true,
            frozen: false,
            parts: Vec::new(),
        }
    }
}

impl SceneEntity {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: Option<EntityId>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_part(mut self, part: EntityPart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn frozen(mut self, frozen: bool) -> Self {
        self.frozen = frozen;
        self
    }

    pub fn part(&self, id: PartId) -> Option<&EntityPart> {
        self.parts.iter().find(|p| p.id == id)
    }

    pub fn part_mut(&mut self, id: PartId) -> Option<&mut EntityPart> {
        self.parts.iter_mut().find(|p| p.id == id)
    }
}

/// Partial set of non-transform entity fields.
///
/// Used as the before/after payload of field updates; `None` means the
/// field is not part of the change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityFields {
    pub name: Option<String>,
    pub visible: Option<bool>,
    pub frozen: Option<bool>,
    pub parent: Option<Option<EntityId>>,
}

impl EntityFields {
    pub fn name(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    pub fn visible(visible: bool) -> Self {
        Self { visible: Some(visible), ..Self::default() }
    }

    pub fn frozen(frozen: bool) -> Self {
        Self { frozen: Some(frozen), ..Self::default() }
    }

    /// Read the current values of `entity` for exactly the fields set in `like`.
    pub fn capture(entity: &SceneEntity, like: &EntityFields) -> Self {
        Self {
            name: like.name.as_ref().map(|_| entity.name.clone()),
            visible: like.visible.map(|_| entity.visible),
            frozen: like.frozen.map(|_| entity.frozen),
            parent: like.parent.map(|_| entity.parent),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.visible.is_none() && self.frozen.is_none() && self.parent.is_none()
    }
}

/// Partial update handed to a [`SceneStore`](super::SceneStore).
///
/// Only the fields that are set are written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityPatch {
    pub name: Option<String>,
    pub visible: Option<bool>,
    pub frozen: Option<bool>,
    pub parent: Option<Option<EntityId>>,
    pub order: Option<i32>,
    pub transform: TransformSnapshot,
    pub parts: Vec<(PartId, Transform)>,
}

impl EntityPatch {
    pub fn transform(snapshot: TransformSnapshot) -> Self {
        Self { transform: snapshot, ..Self::default() }
    }

    pub fn parent(parent: Option<EntityId>) -> Self {
        Self { parent: Some(parent), ..Self::default() }
    }

    pub fn part(part: PartId, transform: Transform) -> Self {
        Self { parts: vec![(part, transform)], ..Self::default() }
    }

    /// Write the set fields into `entity`. Parts the entity does not own are skipped.
    pub fn apply_to(&self, entity: &mut SceneEntity) {
        if let Some(name) = &self.name {
            entity.name = name.clone();
        }
        if let Some(visible) = self.visible {
            entity.visible = visible;
        }
        if let Some(frozen) = self.frozen {
            entity.frozen = frozen;
        }
        if let Some(parent) = self.parent {
            entity.parent = parent;
        }
        if let Some(order) = self.order {
            entity.order = order;
        }
        self.transform.apply_to(&mut entity.transform);
        for (part_id, transform) in &self.parts {
            match entity.part_mut(*part_id) {
                Some(part) => part.transform = *transform,
                None => log::debug!("{} has no {}, skipping", entity.id, part_id),
            }
        }
    }
}

impl From<&EntityFields> for EntityPatch {
    fn from(fields: &EntityFields) -> Self {
        Self {
            name: fields.name.clone(),
            visible: fields.visible,
            frozen: fields.frozen,
            parent: fields.parent,
            ..Self::default()
        }
    }
}
