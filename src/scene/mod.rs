//! The scene graph: render tree, modifiers, spec resolution and the per-frame commit pass.

/// Top-level scene driving one commit pass per update.
pub mod context;
/// Property sources and the modifier payload.
pub mod modifier;
/// Render tree nodes and the commit/cleanup driver.
pub mod node;
/// Flattening nested specs into placements.
pub mod resolver;
/// Registries and clock shared by a scene.
pub mod runtime;
/// Nested spec, placement and context types.
pub mod spec;

pub use context::{Context, ContextParams};
pub use modifier::{Modifier, Source};
pub use node::{Payload, RenderNode, Renderable};
pub use resolver::resolve;
pub use runtime::Runtime;
pub use spec::{BranchSpec, NodeContext, Placement, Spec};
