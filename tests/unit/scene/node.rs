use super::*;
use crate::{
    entity::target::{ElementAllocator, VisualTarget},
    foundation::clock::ManualClock,
    scene::spec::BranchSpec,
};

#[derive(Default)]
struct Counter {
    commits: usize,
    cleanups: usize,
    last: Option<Placement>,
    nested: Option<Spec>,
}

impl VisualTarget for Counter {
    fn commit(&mut self, placement: &Placement, _allocator: &mut dyn Allocator) -> Option<Spec> {
        self.commits += 1;
        self.last = Some(placement.clone());
        self.nested.clone()
    }

    fn cleanup(&mut self, _allocator: &mut dyn Allocator) {
        self.cleanups += 1;
    }
}

struct Scripted(Spec);

impl Renderable for Scripted {
    fn render(&mut self) -> Spec {
        self.0.clone()
    }
}

fn runtime() -> Runtime {
    Runtime::with_clock(Rc::new(ManualClock::new(0.0)))
}

fn counter(rt: &Runtime) -> (EntityId, Rc<RefCell<Counter>>) {
    let target = Rc::new(RefCell::new(Counter::default()));
    let id = rt.register(target.clone());
    (id, target)
}

fn counts(target: &Rc<RefCell<Counter>>) -> (usize, usize) {
    let t = target.borrow();
    (t.commits, t.cleanups)
}

#[test]
fn render_shapes_follow_children() {
    let rt = runtime();
    let mut node = RenderNode::new();
    assert_eq!(node.render(), Spec::Empty);

    let a = Surface::create(&rt);
    let b = Surface::create(&rt);
    let (ida, idb) = (a.borrow().id(), b.borrow().id());
    node.add(a);
    assert_eq!(node.render(), Spec::Entity(ida));
    node.add(b);
    assert_eq!(
        node.render(),
        Spec::List(vec![Spec::Entity(ida), Spec::Entity(idb)])
    );
}

#[test]
fn modifier_wraps_its_children() {
    let rt = runtime();
    let surface = Surface::create(&rt);
    let id = surface.borrow().id();
    let mut modifier = Modifier::new(&rt);
    modifier.opacity_from(0.5);

    let mut node = RenderNode::from(modifier);
    node.add(surface);
    let Spec::Branch(branch) = node.render() else {
        panic!("modifier should render a branch");
    };
    assert_eq!(branch.target, Spec::Entity(id));
    assert_eq!(branch.opacity, Some(0.5));
}

#[test]
fn set_replaces_children_and_get_walks_single_children() {
    let rt = runtime();
    let surface = Surface::create(&rt);
    let mut node = RenderNode::new();
    node.add(RenderNode::new()).add(surface.clone());
    assert!(matches!(node.get(), Some(Payload::Renderable(_))));

    node.add(RenderNode::new());
    assert!(node.get().is_none());

    node.set(Modifier::new(&rt));
    assert!(node.children().is_empty());
    assert!(matches!(node.get(), Some(Payload::Modifier(_))));
}

#[test]
fn size_comes_from_payload_or_only_child() {
    let rt = runtime();
    let sized = Surface::create_with(&rt, "div", Some([Some(10.0), None]));
    let mut node = RenderNode::new();
    node.add(sized);
    assert_eq!(node.size(), Some([Some(10.0), None]));
    node.add(Surface::create(&rt));
    assert_eq!(node.size(), None);
}

#[test]
fn vanished_entity_is_cleaned_up_exactly_once() {
    let rt = runtime();
    let mut pool = ElementAllocator::new();
    let (id, target) = counter(&rt);
    let script = Rc::new(RefCell::new(Scripted(Spec::Entity(id))));
    let mut node = RenderNode::renderable(script.clone());
    let ctx = NodeContext::default();

    node.commit(&rt, &ctx, &mut pool);
    node.commit(&rt, &ctx, &mut pool);
    assert_eq!(counts(&target), (2, 0));

    script.borrow_mut().0 = Spec::Empty;
    node.commit(&rt, &ctx, &mut pool);
    assert_eq!(counts(&target), (2, 1));
    assert_eq!(node.committed().count(), 0);

    node.commit(&rt, &ctx, &mut pool);
    assert_eq!(counts(&target), (2, 1));
}

#[test]
fn replaced_entity_is_cleaned_without_a_commit() {
    let rt = runtime();
    let mut pool = ElementAllocator::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    struct Logged {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }
    impl VisualTarget for Logged {
        fn commit(&mut self, _p: &Placement, _a: &mut dyn Allocator) -> Option<Spec> {
            self.log.borrow_mut().push(format!("commit {}", self.name));
            None
        }
        fn cleanup(&mut self, _a: &mut dyn Allocator) {
            self.log.borrow_mut().push(format!("cleanup {}", self.name));
        }
    }

    let old = rt.register(Rc::new(RefCell::new(Logged {
        name: "old",
        log: log.clone(),
    })));
    let new = rt.register(Rc::new(RefCell::new(Logged {
        name: "new",
        log: log.clone(),
    })));
    let script = Rc::new(RefCell::new(Scripted(Spec::Entity(old))));
    let mut node = RenderNode::renderable(script.clone());
    node.commit(&rt, &NodeContext::default(), &mut pool);

    log.borrow_mut().clear();
    script.borrow_mut().0 = Spec::Entity(new);
    node.commit(&rt, &NodeContext::default(), &mut pool);
    assert_eq!(*log.borrow(), ["commit new", "cleanup old"]);
}

#[test]
fn placements_reach_targets() {
    let rt = runtime();
    let mut pool = ElementAllocator::new();
    let (id, target) = counter(&rt);
    let script = Rc::new(RefCell::new(Scripted(
        BranchSpec::new(id).with_opacity(0.5).into(),
    )));
    let mut node = RenderNode::renderable(script);
    node.commit(&rt, &NodeContext::default(), &mut pool);
    assert_eq!(target.borrow().last.as_ref().unwrap().opacity, 0.5);
    let committed: Vec<_> = node.committed().map(|(id, _)| id).collect();
    assert_eq!(committed, vec![id]);
}

#[test]
fn nested_specs_are_committed_and_cleaned() {
    let rt = runtime();
    let mut pool = ElementAllocator::new();
    let (child_id, child) = counter(&rt);
    let (parent_id, parent) = counter(&rt);
    parent.borrow_mut().nested = Some(Spec::Entity(child_id));

    let script = Rc::new(RefCell::new(Scripted(Spec::Entity(parent_id))));
    let mut node = RenderNode::renderable(script);
    node.commit(&rt, &NodeContext::default(), &mut pool);
    assert_eq!(counts(&child), (1, 0));
    assert_eq!(node.committed().count(), 2);

    parent.borrow_mut().nested = None;
    node.commit(&rt, &NodeContext::default(), &mut pool);
    assert_eq!(counts(&parent), (2, 0));
    assert_eq!(counts(&child), (1, 1));
}

#[test]
fn entity_moved_under_a_nested_commit_keeps_its_state() {
    let rt = runtime();
    let mut pool = ElementAllocator::new();
    let (parent_id, parent) = counter(&rt);
    let (child_id, child) = counter(&rt);
    let script = Rc::new(RefCell::new(Scripted(Spec::List(vec![
        Spec::Entity(parent_id),
        Spec::Entity(child_id),
    ]))));
    let mut node = RenderNode::renderable(script.clone());
    node.commit(&rt, &NodeContext::default(), &mut pool);
    assert_eq!(counts(&child), (1, 0));

    script.borrow_mut().0 = Spec::Entity(parent_id);
    parent.borrow_mut().nested = Some(Spec::Entity(child_id));
    node.commit(&rt, &NodeContext::default(), &mut pool);
    assert_eq!(counts(&parent), (2, 0));
    assert_eq!(counts(&child), (2, 0));
    assert_eq!(node.committed().count(), 2);

    parent.borrow_mut().nested = None;
    node.commit(&rt, &NodeContext::default(), &mut pool);
    assert_eq!(counts(&child), (2, 1));
}

#[test]
fn multi_child_renders_reuse_the_list_buffer() {
    let rt = runtime();
    let mut pool = ElementAllocator::new();
    let (a, _) = counter(&rt);
    let (b, _) = counter(&rt);
    let mut node = RenderNode::new();
    node.add(RenderNode::renderable(Rc::new(RefCell::new(Scripted(Spec::Entity(a))))));
    node.add(RenderNode::renderable(Rc::new(RefCell::new(Scripted(Spec::Entity(b))))));

    node.commit(&rt, &NodeContext::default(), &mut pool);
    let capacity = node.list_buffer.capacity();
    assert!(capacity >= 2);
    node.commit(&rt, &NodeContext::default(), &mut pool);
    assert_eq!(node.list_buffer.capacity(), capacity);
    assert_eq!(node.committed().count(), 2);
}

#[test]
fn cyclic_nested_specs_stop() {
    let rt = runtime();
    let mut pool = ElementAllocator::new();
    let (id, target) = counter(&rt);
    target.borrow_mut().nested = Some(Spec::Entity(id));
    let script = Rc::new(RefCell::new(Scripted(Spec::Entity(id))));
    let mut node = RenderNode::renderable(script);
    node.commit(&rt, &NodeContext::default(), &mut pool);
    assert_eq!(counts(&target), (1, 0));
}

#[test]
fn unknown_entities_are_skipped() {
    let rt = runtime();
    let mut pool = ElementAllocator::new();
    let script = Rc::new(RefCell::new(Scripted(Spec::Entity(EntityId(42)))));
    let mut node = RenderNode::renderable(script);
    node.commit(&rt, &NodeContext::default(), &mut pool);
    assert_eq!(node.committed().count(), 0);
}
