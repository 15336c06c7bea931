use std::rc::Rc;

use super::*;
use crate::{entity::target::ElementAllocator, foundation::clock::ManualClock};

fn runtime() -> Runtime {
    Runtime::with_clock(Rc::new(ManualClock::new(0.0)))
}

fn placement(size: Option<[f64; 2]>, origin: Xy) -> Placement {
    Placement {
        transform: Matrix::translate(10.0, 20.0, 0.0),
        opacity: 0.5,
        origin,
        align: [0.0, 0.0],
        size,
    }
}

#[test]
fn create_registers_with_the_runtime() {
    let rt = runtime();
    let surface = Surface::create(&rt);
    let id = surface.borrow().id();
    assert!(rt.target(id).is_some());
    assert_eq!(surface.borrow().kind(), "div");
    assert_eq!(surface.borrow_mut().render(), Spec::Entity(id));
}

#[test]
fn first_commit_sets_up_once() {
    let rt = runtime();
    let mut pool = ElementAllocator::new();
    let surface = Surface::create(&rt);
    let mut s = surface.borrow_mut();
    assert!(s.commit(&placement(Some([100.0, 50.0]), [0.0, 0.0]), &mut pool).is_none());
    s.commit(&placement(Some([100.0, 50.0]), [0.0, 0.0]), &mut pool);
    assert_eq!(s.setups(), 1);
    assert_eq!(pool.node_count(), 1);

    let frame = s.frame().unwrap();
    assert!(frame.visible);
    assert_eq!(frame.opacity, 0.5);
    assert_eq!(frame.size, [100.0, 50.0]);
    assert_eq!(frame.matrix, Matrix::translate(10.0, 20.0, 0.0));
}

#[test]
fn origin_shifts_the_element() {
    let rt = runtime();
    let mut pool = ElementAllocator::new();
    let surface = Surface::create(&rt);
    let mut s = surface.borrow_mut();
    s.commit(&placement(Some([100.0, 50.0]), [0.5, 0.5]), &mut pool);
    let frame = s.frame().unwrap();
    assert_eq!(frame.matrix, Matrix::translate(-40.0, -5.0, 0.0));
}

#[test]
fn own_size_overrides_inherited_dimensions() {
    let rt = runtime();
    let mut pool = ElementAllocator::new();
    let surface = Surface::create_with(&rt, "img", Some([Some(30.0), None]));
    let mut s = surface.borrow_mut();
    assert_eq!(s.size(), Some([Some(30.0), None]));
    s.commit(&placement(Some([100.0, 50.0]), [0.0, 0.0]), &mut pool);
    assert_eq!(s.frame().unwrap().size, [30.0, 50.0]);
    assert_eq!(s.element().unwrap().kind, "img");

    s.set_size(None);
    s.commit(&placement(None, [0.0, 0.0]), &mut pool);
    assert_eq!(s.frame().unwrap().size, [0.0, 0.0]);
}

#[test]
fn cleanup_returns_the_element_and_hides_the_frame() {
    let rt = runtime();
    let mut pool = ElementAllocator::new();
    let surface = Surface::create(&rt);
    let mut s = surface.borrow_mut();
    s.commit(&placement(None, [0.0, 0.0]), &mut pool);
    s.cleanup(&mut pool);
    assert_eq!(s.cleanups(), 1);
    assert!(s.element().is_none());
    assert!(!s.frame().unwrap().visible);
    assert_eq!(pool.node_count(), 0);
    assert_eq!(pool.detached("div"), 1);

    s.commit(&placement(None, [0.0, 0.0]), &mut pool);
    assert_eq!(s.setups(), 2);
    assert_eq!(pool.created(), 1);
}

#[test]
fn content_is_kept() {
    let rt = runtime();
    let surface = Surface::create(&rt);
    surface.borrow_mut().set_content("hello");
    assert_eq!(surface.borrow().content(), "hello");
}
