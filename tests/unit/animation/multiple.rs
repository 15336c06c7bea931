use std::{cell::Cell, rc::Rc};

use super::*;
use crate::{animation::tween::TweenTransition, foundation::clock::ManualClock};

fn wrapper() -> MultipleTransition {
    let runtime = Runtime::with_clock(Rc::new(ManualClock::new(0.0)));
    MultipleTransition::new(&runtime, MethodEntry::of::<TweenTransition>())
}

#[test]
fn components_advance_in_lockstep() {
    let mut multi = wrapper();
    multi.reset(Value::from([0.0, 0.0, 0.0]), None);
    multi
        .set(
            Value::from([10.0, 20.0, 30.0]),
            &Transition::duration(100.0),
            None,
        )
        .unwrap();
    assert!(multi.is_active());
    assert_eq!(multi.get(Some(50.0)), Value::from([5.0, 10.0, 15.0]));
    assert_eq!(multi.get(Some(100.0)), Value::from([10.0, 20.0, 30.0]));
    assert!(!multi.is_active());
}

#[test]
fn callback_runs_once_after_every_component() {
    let mut multi = wrapper();
    let count = Rc::new(Cell::new(0));
    let hits = count.clone();
    multi.reset(Value::from([0.0, 0.0]), None);
    multi
        .set(
            Value::from([1.0, 1.0]),
            &Transition::duration(100.0),
            Some(Box::new(move || hits.set(hits.get() + 1))),
        )
        .unwrap();
    multi.get(Some(50.0));
    assert_eq!(count.get(), 0);
    multi.get(Some(100.0));
    assert_eq!(count.get(), 1);
}

#[test]
fn velocity_is_joined_per_component() {
    let mut multi = wrapper();
    multi.reset(Value::from([0.0, 0.0]), None);
    multi
        .set(Value::from([100.0, 0.0]), &Transition::duration(100.0), None)
        .unwrap();
    multi.get(Some(100.0));
    let v = multi.velocity().unwrap();
    assert!((v.component(0).unwrap() - 1.0).abs() < 1e-6);
    assert_eq!(v.component(1), Some(0.0));
}

#[test]
fn reset_resizes_the_instance_pool() {
    let mut multi = wrapper();
    multi.reset(Value::from([1.0, 2.0, 3.0, 4.0]), None);
    assert_eq!(multi.get(Some(0.0)).len(), 4);
    multi.reset(Value::from([1.0, 2.0]), None);
    assert_eq!(multi.get(Some(0.0)), Value::from([1.0, 2.0]));
}

#[test]
fn halt_stops_every_component() {
    let mut multi = wrapper();
    multi.reset(Value::from([0.0, 0.0]), None);
    multi
        .set(Value::from([10.0, 10.0]), &Transition::duration(100.0), None)
        .unwrap();
    multi.halt();
    assert!(!multi.is_active());
}

#[test]
fn non_numeric_components_stay_unset() {
    let mut multi = wrapper();
    multi.reset(Value::Vector([Some(0.0), None].into_iter().collect()), None);
    assert_eq!(multi.get(Some(0.0)).component(1), None);

    let end = Value::Vector([Some(10.0), None].into_iter().collect());
    multi
        .set(end.clone(), &Transition::duration(100.0), None)
        .unwrap();
    let mid = multi.get(Some(50.0));
    assert_eq!(mid.component(0), Some(5.0));
    assert_eq!(mid.len(), 2);
    assert_eq!(mid.component(1), None);
    assert_eq!(multi.get(Some(100.0)), end);
    assert_eq!(multi.velocity().unwrap().component(1), None);
}
