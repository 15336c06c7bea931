use crate::{
    entity::registry::EntityId,
    foundation::core::{SizeSpec, Xy},
    transform::matrix::Matrix,
};

/// The nested structure a render pass produces.
///
/// Serializes to `null`, an entity integer, an array, or a branch object.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Spec {
    /// Contributes nothing.
    #[default]
    Empty,
    /// A terminal entity.
    Entity(EntityId),
    /// Independent siblings resolved against the same parent context.
    List(Vec<Spec>),
    /// A context change applied to `target`.
    Branch(Box<BranchSpec>),
}

impl Spec {
    /// Whether this spec contributes nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<EntityId> for Spec {
    fn from(value: EntityId) -> Self {
        Self::Entity(value)
    }
}

impl From<Vec<Spec>> for Spec {
    fn from(value: Vec<Spec>) -> Self {
        Self::List(value)
    }
}

impl From<BranchSpec> for Spec {
    fn from(value: BranchSpec) -> Self {
        Self::Branch(Box::new(value))
    }
}

/// Properties a branch applies on top of its parent context.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchSpec {
    /// What the properties apply to.
    pub target: Spec,
    /// Composed after the parent transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Matrix>,
    /// Multiplied into the parent opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Anchor point within the own box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Xy>,
    /// Attachment point within the parent box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Xy>,
    /// Own size; `None` dimensions inherit from the parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeSpec>,
}

impl BranchSpec {
    /// A branch around `target` that changes nothing yet.
    pub fn new(target: impl Into<Spec>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Sets the transform.
    pub fn with_transform(mut self, transform: Matrix) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Sets the opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Sets the origin.
    pub fn with_origin(mut self, origin: Xy) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Sets the align point.
    pub fn with_align(mut self, align: Xy) -> Self {
        self.align = Some(align);
        self
    }

    /// Sets the size.
    pub fn with_size(mut self, size: SizeSpec) -> Self {
        self.size = Some(size);
        self
    }
}

/// Absolute placement of one entity after resolution.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Accumulated transform, including alignment offsets.
    pub transform: Matrix,
    /// Product of all ancestor opacities.
    pub opacity: f64,
    /// Anchor point within the entity's own box.
    pub origin: Xy,
    /// Attachment point within the parent box.
    pub align: Xy,
    /// Size in effect, if any ancestor established one.
    pub size: Option<[f64; 2]>,
}

/// Parent context a spec is resolved against.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeContext {
    /// Accumulated transform.
    pub transform: Matrix,
    /// Accumulated opacity.
    pub opacity: f64,
    /// Origin not yet baked into the transform.
    pub origin: Option<Xy>,
    /// Align not yet baked into the transform.
    pub align: Option<Xy>,
    /// Size in effect.
    pub size: Option<[f64; 2]>,
}

impl Default for NodeContext {
    fn default() -> Self {
        Self {
            transform: Matrix::IDENTITY,
            opacity: 1.0,
            origin: None,
            align: None,
            size: None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/spec.rs"]
mod tests;
