use std::{cell::RefCell, rc::Rc};

use crate::{
    entity::{
        registry::EntityId,
        target::{Allocator, ElementHandle, VisualTarget},
    },
    foundation::core::{SizeSpec, Xy},
    scene::{
        node::Renderable,
        runtime::Runtime,
        spec::{Placement, Spec},
    },
    transform::matrix::Matrix,
};

/// The last placement a [`Surface`] applied to its element.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SurfaceFrame {
    /// Element the placement was written to.
    pub element: ElementHandle,
    /// Placement transform shifted so that `origin` sits at the placement point.
    pub matrix: Matrix,
    /// Resolved opacity.
    pub opacity: f64,
    /// Resolved origin.
    pub origin: Xy,
    /// Final size after filling inherited dimensions.
    pub size: [f64; 2],
    /// Whether the element is shown.
    pub visible: bool,
}

/// A leaf payload backed by one pooled element.
#[derive(Debug)]
pub struct Surface {
    id: EntityId,
    kind: String,
    size: Option<SizeSpec>,
    content: String,
    element: Option<ElementHandle>,
    frame: Option<SurfaceFrame>,
    setups: usize,
    cleanups: usize,
}

impl Surface {
    /// Creates a `div` surface and registers it with `runtime`.
    pub fn create(runtime: &Runtime) -> Rc<RefCell<Self>> {
        Self::create_with(runtime, "div", None)
    }

    /// Creates a surface of element `kind` with an optional own size and registers it.
    pub fn create_with(
        runtime: &Runtime,
        kind: impl Into<String>,
        size: Option<SizeSpec>,
    ) -> Rc<RefCell<Self>> {
        let id = runtime.entities_mut().reserve();
        let surface = Rc::new(RefCell::new(Self {
            id,
            kind: kind.into(),
            size,
            content: String::new(),
            element: None,
            frame: None,
            setups: 0,
            cleanups: 0,
        }));
        runtime.entities_mut().set(id, surface.clone());
        surface
    }

    /// Registry id of this surface.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Element kind requested from the allocator.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Replaces the own size; `None` dimensions are inherited from the placement.
    pub fn set_size(&mut self, size: Option<SizeSpec>) {
        self.size = size;
    }

    /// Text content carried along with the element.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replaces the text content.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// The most recent committed frame, if any.
    pub fn frame(&self) -> Option<&SurfaceFrame> {
        self.frame.as_ref()
    }

    /// The element currently held, if the surface is deployed.
    pub fn element(&self) -> Option<&ElementHandle> {
        self.element.as_ref()
    }

    /// How many times the surface acquired an element.
    pub fn setups(&self) -> usize {
        self.setups
    }

    /// How many times the surface was cleaned up.
    pub fn cleanups(&self) -> usize {
        self.cleanups
    }

    fn setup(&mut self, allocator: &mut dyn Allocator) -> ElementHandle {
        let element = allocator.allocate(&self.kind);
        tracing::trace!(id = %self.id, element = element.id, "surface setup");
        self.setups += 1;
        self.element = Some(element.clone());
        element
    }

    fn resolve_size(&self, placement: &Placement) -> [f64; 2] {
        let inherited = placement.size.unwrap_or([0.0, 0.0]);
        let Some(own) = self.size else {
            return inherited;
        };
        [
            own[0].unwrap_or(inherited[0]),
            own[1].unwrap_or(inherited[1]),
        ]
    }
}

impl Renderable for Surface {
    fn render(&mut self) -> Spec {
        Spec::Entity(self.id)
    }

    fn size(&self) -> Option<SizeSpec> {
        self.size
    }
}

impl VisualTarget for Surface {
    fn commit(&mut self, placement: &Placement, allocator: &mut dyn Allocator) -> Option<Spec> {
        let element = match &self.element {
            Some(element) => element.clone(),
            None => self.setup(allocator),
        };
        let size = self.resolve_size(placement);
        let origin = placement.origin;
        let matrix = placement
            .transform
            .then_move([-size[0] * origin[0], -size[1] * origin[1], 0.0]);
        self.frame = Some(SurfaceFrame {
            element,
            matrix,
            opacity: placement.opacity,
            origin,
            size,
            visible: true,
        });
        None
    }

    fn cleanup(&mut self, allocator: &mut dyn Allocator) {
        self.cleanups += 1;
        if let Some(element) = self.element.take() {
            tracing::trace!(id = %self.id, element = element.id, "surface cleanup");
            allocator.deallocate(element);
        }
        if let Some(frame) = self.frame.as_mut() {
            frame.visible = false;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/entity/surface.rs"]
mod tests;
