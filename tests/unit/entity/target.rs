use super::*;

#[test]
fn allocate_creates_then_reuses_per_kind() {
    let mut pool = ElementAllocator::new();
    let a = pool.allocate("div");
    let b = pool.allocate("DIV");
    assert_eq!(a.kind, "div");
    assert_eq!(b.kind, "div");
    assert_ne!(a.id, b.id);
    assert_eq!(pool.node_count(), 2);

    pool.deallocate(a.clone());
    assert_eq!(pool.node_count(), 1);
    assert_eq!(pool.detached("div"), 1);

    let c = pool.allocate("div");
    assert_eq!(c, a);
    assert_eq!(pool.created(), 2);
    assert_eq!(pool.detached("div"), 0);
}

#[test]
fn pools_are_separate_per_kind() {
    let mut pool = ElementAllocator::new();
    let span = pool.allocate("span");
    pool.deallocate(span);
    let div = pool.allocate("div");
    assert_eq!(div.kind, "div");
    assert_eq!(pool.created(), 2);
    assert_eq!(pool.detached("span"), 1);
}

#[test]
fn node_count_never_underflows() {
    let mut pool = ElementAllocator::new();
    pool.deallocate(ElementHandle {
        kind: "div".into(),
        id: 99,
    });
    assert_eq!(pool.node_count(), 0);
}
