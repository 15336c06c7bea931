//! Visual targets addressed by id, and the contract they implement to receive placements.

/// Id allocation and lookup.
pub mod registry;
/// A pooled element-backed payload.
pub mod surface;
/// Commit/cleanup contract and element allocation.
pub mod target;

pub use registry::{EntityId, EntityRegistry, TargetRef};
pub use surface::{Surface, SurfaceFrame};
pub use target::{Allocator, ElementAllocator, ElementHandle, VisualTarget};
