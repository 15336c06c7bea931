use std::collections::BTreeMap;

use crate::scene::spec::{Placement, Spec};

/// An opaque visual element handed out by an [`Allocator`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ElementHandle {
    /// Lowercased element kind, e.g. `"div"`.
    pub kind: String,
    /// Stable id of the element within its allocator.
    pub id: usize,
}

/// Hands out and recycles visual elements.
pub trait Allocator {
    /// Returns a free element of `kind`, creating one when the pool is empty.
    fn allocate(&mut self, kind: &str) -> ElementHandle;

    /// Returns `element` to the pool.
    fn deallocate(&mut self, element: ElementHandle);

    /// Number of elements currently handed out.
    fn node_count(&self) -> usize;
}

/// A pooled [`Allocator`] with one free list per element kind.
#[derive(Debug, Default)]
pub struct ElementAllocator {
    detached: BTreeMap<String, Vec<ElementHandle>>,
    created: usize,
    node_count: usize,
}

impl ElementAllocator {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of elements ever created.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Number of pooled elements of `kind` waiting for reuse.
    pub fn detached(&self, kind: &str) -> usize {
        self.detached
            .get(&kind.to_lowercase())
            .map_or(0, Vec::len)
    }
}

impl Allocator for ElementAllocator {
    fn allocate(&mut self, kind: &str) -> ElementHandle {
        let kind = kind.to_lowercase();
        let reused = self.detached.get_mut(&kind).and_then(Vec::pop);
        let element = reused.unwrap_or_else(|| {
            self.created += 1;
            ElementHandle {
                kind,
                id: self.created - 1,
            }
        });
        self.node_count += 1;
        element
    }

    fn deallocate(&mut self, element: ElementHandle) {
        self.detached
            .entry(element.kind.clone())
            .or_default()
            .push(element);
        self.node_count = self.node_count.saturating_sub(1);
    }

    fn node_count(&self) -> usize {
        self.node_count
    }
}

/// The commit/cleanup contract of a payload that participates in the scene graph.
pub trait VisualTarget {
    /// Applies a resolved placement.
    ///
    /// Implementations perform their one-time setup on the first commit. Returning a nested
    /// spec continues resolution beneath this target with the same parent context.
    fn commit(&mut self, placement: &Placement, allocator: &mut dyn Allocator) -> Option<Spec>;

    /// Releases the visual representation after the target vanished from a commit pass.
    fn cleanup(&mut self, allocator: &mut dyn Allocator);
}

#[cfg(test)]
#[path = "../../tests/unit/entity/target.rs"]
mod tests;
