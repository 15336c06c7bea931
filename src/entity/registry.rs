use std::{cell::RefCell, fmt, rc::Rc};

use crate::entity::target::VisualTarget;

/// Identifier of a registered visual target.
///
/// Ids grow monotonically and are never reused, even after the target is unregistered.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub usize);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shared handle to a registered target.
pub type TargetRef = Rc<RefCell<dyn VisualTarget>>;

/// Table of visual targets addressed by [`EntityId`].
#[derive(Default)]
pub struct EntityRegistry {
    slots: Vec<Option<TargetRef>>,
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("len", &self.slots.len())
            .field("live", &self.slots.iter().filter(|s| s.is_some()).count())
            .finish()
    }
}

impl EntityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `target` under the next id.
    pub fn register(&mut self, target: TargetRef) -> EntityId {
        let id = self.reserve();
        self.slots[id.0] = Some(target);
        id
    }

    /// Allocates the next id without a target; fill it later with [`set`](Self::set).
    pub fn reserve(&mut self) -> EntityId {
        self.slots.push(None);
        EntityId(self.slots.len() - 1)
    }

    /// The target registered under `id`, if any.
    pub fn get(&self, id: EntityId) -> Option<TargetRef> {
        self.slots.get(id.0).and_then(Clone::clone)
    }

    /// Replaces the target under an already allocated `id`. Returns `false` for unknown ids.
    pub fn set(&mut self, id: EntityId, target: TargetRef) -> bool {
        match self.slots.get_mut(id.0) {
            Some(slot) => {
                *slot = Some(target);
                true
            }
            None => false,
        }
    }

    /// Empties the slot for `id`; the id itself stays allocated.
    pub fn unregister(&mut self, id: EntityId) -> Option<TargetRef> {
        self.slots.get_mut(id.0).and_then(Option::take)
    }

    /// Number of ids handed out so far.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no id has been handed out yet.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/entity/registry.rs"]
mod tests;
