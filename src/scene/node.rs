use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

use crate::{
    entity::{registry::EntityId, surface::Surface, target::Allocator},
    foundation::core::SizeSpec,
    scene::{
        modifier::Modifier,
        resolver::resolve,
        runtime::Runtime,
        spec::{NodeContext, Placement, Spec},
    },
};

/// Something that renders itself into a nested [`Spec`].
pub trait Renderable {
    /// Produces this frame's spec.
    fn render(&mut self) -> Spec;

    /// Own size, if the payload has one.
    fn size(&self) -> Option<SizeSpec> {
        None
    }
}

/// What a [`RenderNode`] wraps. The capability is fixed when the payload is set.
#[derive(Clone)]
pub enum Payload {
    /// Renders on its own; children are ignored.
    Renderable(Rc<RefCell<dyn Renderable>>),
    /// Wraps whatever its children render.
    Modifier(Rc<RefCell<Modifier>>),
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Renderable(_) => f.write_str("Renderable(..)"),
            Self::Modifier(m) => f.debug_tuple("Modifier").field(&m.as_ptr()).finish(),
        }
    }
}

impl From<Rc<RefCell<Surface>>> for Payload {
    fn from(value: Rc<RefCell<Surface>>) -> Self {
        Self::Renderable(value)
    }
}

impl From<Rc<RefCell<RenderNode>>> for Payload {
    fn from(value: Rc<RefCell<RenderNode>>) -> Self {
        Self::Renderable(value)
    }
}

impl From<Rc<RefCell<Modifier>>> for Payload {
    fn from(value: Rc<RefCell<Modifier>>) -> Self {
        Self::Modifier(value)
    }
}

impl From<Modifier> for Payload {
    fn from(value: Modifier) -> Self {
        Self::Modifier(Rc::new(RefCell::new(value)))
    }
}

/// A node of the render tree: an optional payload plus ordered children.
#[derive(Default)]
pub struct RenderNode {
    payload: Option<Payload>,
    children: Vec<RenderNode>,
    result_cache: BTreeMap<EntityId, Placement>,
    prev_results: BTreeMap<EntityId, Placement>,
    list_buffer: Vec<Spec>,
}

impl fmt::Debug for RenderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderNode")
            .field("payload", &self.payload)
            .field("children", &self.children)
            .field("committed", &self.result_cache.keys().collect::<Vec<_>>())
            .finish()
    }
}

macro_rules! node_from_payload {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for RenderNode {
                fn from(value: $source) -> Self {
                    let mut node = Self::default();
                    node.set(value);
                    node
                }
            }
        )*
    };
}

node_from_payload!(
    Payload,
    Rc<RefCell<Surface>>,
    Rc<RefCell<RenderNode>>,
    Rc<RefCell<Modifier>>,
    Modifier,
);

impl RenderNode {
    /// An empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// A node around an arbitrary shared renderable.
    pub fn renderable(payload: Rc<RefCell<dyn Renderable>>) -> Self {
        let mut node = Self::default();
        node.set(Payload::Renderable(payload));
        node
    }

    /// Appends a child and returns it for further chaining.
    pub fn add(&mut self, child: impl Into<RenderNode>) -> &mut RenderNode {
        self.children.push(child.into());
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Replaces the payload and drops all children.
    pub fn set(&mut self, payload: impl Into<Payload>) -> &mut Self {
        self.payload = Some(payload.into());
        self.children.clear();
        self
    }

    /// This node's payload, else the payload of its only child.
    pub fn get(&self) -> Option<Payload> {
        match (&self.payload, self.children.as_slice()) {
            (Some(payload), _) => Some(payload.clone()),
            (None, [only]) => only.get(),
            _ => None,
        }
    }

    /// Children in render order.
    pub fn children(&self) -> &[RenderNode] {
        &self.children
    }

    /// Renders the subtree into a nested spec.
    pub fn render(&mut self) -> Spec {
        if let Some(Payload::Renderable(payload)) = &self.payload {
            return payload.borrow_mut().render();
        }

        let result = match self.children.as_mut_slice() {
            [] => Spec::Empty,
            [only] => only.render(),
            many => {
                let mut list = std::mem::take(&mut self.list_buffer);
                list.clear();
                list.extend(many.iter_mut().map(RenderNode::render));
                Spec::List(list)
            }
        };

        match &self.payload {
            Some(Payload::Modifier(modifier)) => modifier.borrow_mut().modify(result),
            _ => result,
        }
    }

    /// The payload's size, else the only child's. Nodes with several children have none.
    pub fn size(&self) -> Option<SizeSpec> {
        let own = match &self.payload {
            Some(Payload::Renderable(payload)) => payload.borrow().size(),
            Some(Payload::Modifier(modifier)) => modifier.borrow_mut().size(),
            None => None,
        };
        own.or_else(|| match self.children.as_slice() {
            [only] => only.size(),
            _ => None,
        })
    }

    /// Runs one commit pass for the subtree rooted here.
    ///
    /// Every resolved entity is committed first, including entities reached through nested
    /// commits. Entities committed by the previous pass that this pass never reached are then
    /// cleaned up, so a cleaned entity receives no commit in the same pass.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn commit(&mut self, runtime: &Runtime, context: &NodeContext, allocator: &mut dyn Allocator) {
        let spec = self.render();
        let top = resolve(&spec, context);
        if let Spec::List(list) = spec {
            self.list_buffer = list;
        }

        self.prev_results = std::mem::take(&mut self.result_cache);
        let mut current = BTreeMap::new();
        apply_commit(runtime, top, context, allocator, &mut current);

        let mut cleaned = 0usize;
        for id in self.prev_results.keys() {
            if !current.contains_key(id) {
                cleanup_entity(runtime, *id, allocator);
                cleaned += 1;
            }
        }

        tracing::debug!(
            committed = current.len(),
            previous = self.prev_results.len(),
            cleaned,
            "commit pass finished"
        );
        self.result_cache = current;
    }

    /// Placements applied by the most recent commit pass, in id order.
    pub fn committed(&self) -> impl Iterator<Item = (EntityId, &Placement)> {
        self.result_cache
            .iter()
            .map(|(id, placement)| (*id, placement))
    }
}

impl Renderable for RenderNode {
    fn render(&mut self) -> Spec {
        RenderNode::render(self)
    }

    fn size(&self) -> Option<SizeSpec> {
        RenderNode::size(self)
    }
}

fn apply_commit(
    runtime: &Runtime,
    resolved: BTreeMap<EntityId, Placement>,
    context: &NodeContext,
    allocator: &mut dyn Allocator,
    cache: &mut BTreeMap<EntityId, Placement>,
) {
    for (id, placement) in resolved {
        if cache.contains_key(&id) {
            tracing::warn!(%id, "entity reached twice in one commit pass; skipping");
            continue;
        }
        let Some(target) = runtime.target(id) else {
            tracing::warn!(%id, "no visual target registered; skipping commit");
            continue;
        };

        let further = target.borrow_mut().commit(&placement, allocator);
        cache.insert(id, placement);
        if let Some(further) = further {
            let inner = resolve(&further, context);
            apply_commit(runtime, inner, context, allocator, cache);
        }
    }
}

fn cleanup_entity(runtime: &Runtime, id: EntityId, allocator: &mut dyn Allocator) {
    match runtime.target(id) {
        Some(target) => target.borrow_mut().cleanup(allocator),
        None => tracing::warn!(%id, "no visual target registered; skipping cleanup"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/node.rs"]
mod tests;
