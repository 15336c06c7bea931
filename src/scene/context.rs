use crate::{
    animation::{engine::Transition, transitionable::Transitionable},
    entity::{
        registry::EntityId,
        target::{Allocator, ElementAllocator},
    },
    foundation::{
        callback::Callback,
        core::{FromValue, Xy},
        error::TrellisResult,
    },
    scene::{
        node::RenderNode,
        runtime::Runtime,
        spec::{NodeContext, Placement},
    },
    transform::matrix::Matrix,
};

/// Per-frame overrides for the ambient context. Unset fields keep their previous value.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextParams {
    /// Root transform.
    pub transform: Option<Matrix>,
    /// Root opacity.
    pub opacity: Option<f64>,
    /// Root origin.
    pub origin: Option<Xy>,
    /// Root align point.
    pub align: Option<Xy>,
    /// Root size.
    pub size: Option<[f64; 2]>,
}

/// A top-level scene: one render tree, its ambient placement and an element pool.
pub struct Context {
    runtime: Runtime,
    node: RenderNode,
    node_context: NodeContext,
    allocator: Box<dyn Allocator>,
    perspective_state: Transitionable,
    perspective: Option<f64>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("node_context", &self.node_context)
            .field("perspective", &self.perspective)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// A context of `size` backed by a fresh [`ElementAllocator`].
    pub fn new(runtime: &Runtime, size: [f64; 2]) -> Self {
        Self::with_allocator(runtime, size, Box::new(ElementAllocator::new()))
    }

    /// A context of `size` backed by `allocator`.
    pub fn with_allocator(runtime: &Runtime, size: [f64; 2], allocator: Box<dyn Allocator>) -> Self {
        Self {
            runtime: runtime.clone(),
            node: RenderNode::new(),
            node_context: NodeContext {
                transform: Matrix::IDENTITY,
                opacity: 1.0,
                origin: Some([0.0, 0.0]),
                align: None,
                size: Some(size),
            },
            allocator,
            perspective_state: Transitionable::new(runtime, 0.0),
            perspective: None,
        }
    }

    /// The runtime this context resolves against.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Adds a child to the root node.
    pub fn add(&mut self, child: impl Into<RenderNode>) -> &mut RenderNode {
        self.node.add(child)
    }

    /// The root node.
    pub fn root(&mut self) -> &mut RenderNode {
        &mut self.node
    }

    /// The element pool.
    pub fn allocator(&self) -> &dyn Allocator {
        self.allocator.as_ref()
    }

    /// Current ambient size.
    pub fn size(&self) -> [f64; 2] {
        self.node_context.size.unwrap_or([0.0, 0.0])
    }

    /// Replaces the ambient size.
    pub fn set_size(&mut self, size: [f64; 2]) {
        self.node_context.size = Some(size);
    }

    /// Samples the perspective distance.
    pub fn perspective(&mut self) -> f64 {
        f64::from_value(&self.perspective_state.get(None)).unwrap_or(0.0)
    }

    /// Sets the perspective distance, optionally animated.
    pub fn set_perspective(
        &mut self,
        perspective: f64,
        transition: Option<Transition>,
        callback: Option<Callback>,
    ) -> TrellisResult<()> {
        self.perspective_state.set(perspective, transition, callback)
    }

    /// The perspective applied by the most recent [`update`](Self::update).
    pub fn applied_perspective(&self) -> Option<f64> {
        self.perspective
    }

    /// Merges `params` into the ambient context and runs one commit pass.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn update(&mut self, params: Option<&ContextParams>) {
        if let Some(params) = params {
            if let Some(transform) = params.transform {
                self.node_context.transform = transform;
            }
            if let Some(opacity) = params.opacity {
                self.node_context.opacity = opacity;
            }
            if let Some(origin) = params.origin {
                self.node_context.origin = Some(origin);
            }
            if let Some(align) = params.align {
                self.node_context.align = Some(align);
            }
            if let Some(size) = params.size {
                self.node_context.size = Some(size);
            }
        }

        let perspective = self.perspective();
        if self.perspective != Some(perspective) {
            tracing::debug!(perspective, "perspective changed");
            self.perspective = Some(perspective);
        }

        self.node
            .commit(&self.runtime, &self.node_context, self.allocator.as_mut());
    }

    /// Placements applied by the most recent commit pass, in id order.
    pub fn committed(&self) -> impl Iterator<Item = (EntityId, &Placement)> {
        self.node.committed()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/context.rs"]
mod tests;
