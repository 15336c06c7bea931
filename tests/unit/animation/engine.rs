use std::rc::Rc;

use super::*;
use crate::{animation::tween::TweenTransition, foundation::clock::ManualClock};

/// Jumps straight to the end; animates one component at a time.
struct Snap {
    value: Value,
}

impl TransitionEngine for Snap {
    fn reset(&mut self, state: Value, _velocity: Option<Value>) {
        self.value = state;
    }

    fn set(&mut self, end: Value, _t: &Transition, callback: Option<Callback>) -> TrellisResult<()> {
        self.value = end;
        if let Some(cb) = callback {
            cb();
        }
        Ok(())
    }

    fn get(&mut self, _timestamp: Option<f64>) -> Value {
        self.value.clone()
    }

    fn is_active(&self) -> bool {
        false
    }

    fn halt(&mut self) {}
}

impl EngineMethod for Snap {
    const MULTIPLICITY: Multiplicity = Multiplicity::Max(1);

    fn create(_runtime: &Runtime) -> Self {
        Self {
            value: Value::Scalar(0.0),
        }
    }
}

fn runtime() -> Runtime {
    Runtime::with_clock(Rc::new(ManualClock::new(0.0)))
}

#[test]
fn method_entries_compare_by_type() {
    assert_eq!(MethodEntry::of::<Snap>(), MethodEntry::of::<Snap>());
    assert_ne!(MethodEntry::of::<Snap>(), MethodEntry::of::<TweenTransition>());
    assert_eq!(MethodEntry::of::<Snap>().multiplicity(), Multiplicity::Max(1));
    assert_eq!(
        MethodEntry::of::<TweenTransition>().multiplicity(),
        Multiplicity::Unbounded
    );
}

#[test]
fn needs_split_only_for_long_vectors() {
    let snap = MethodEntry::of::<Snap>();
    assert!(!snap.needs_split(&Value::from(3.0)));
    assert!(!snap.needs_split(&Value::from([1.0])));
    assert!(snap.needs_split(&Value::from([1.0, 2.0])));
    assert!(!MethodEntry::of::<TweenTransition>().needs_split(&Value::from([1.0, 2.0, 3.0])));
}

#[test]
fn registering_same_type_twice_is_a_noop() {
    let mut reg = MethodRegistry::default();
    reg.register::<Snap>("snap").unwrap();
    reg.register::<Snap>("snap").unwrap();
    assert_eq!(reg.names().collect::<Vec<_>>(), vec!["snap"]);
}

#[test]
fn conflicting_registration_is_a_configuration_error() {
    let mut reg = MethodRegistry::default();
    reg.register::<Snap>("snap").unwrap();
    let err = reg.register::<TweenTransition>("snap").unwrap_err();
    assert!(matches!(err, TrellisError::Configuration(_)));
    assert_eq!(reg.get("snap").unwrap(), MethodEntry::of::<Snap>());
}

#[test]
fn unregistered_method_is_a_configuration_error() {
    let mut reg = MethodRegistry::default();
    reg.register::<Snap>("snap").unwrap();
    assert!(reg.unregister("snap"));
    assert!(!reg.unregister("snap"));
    assert!(matches!(reg.get("snap"), Err(TrellisError::Configuration(_))));
}

#[test]
fn instantiated_engine_is_usable() {
    let rt = runtime();
    let mut engine = MethodEntry::of::<Snap>().instantiate(&rt);
    engine.set(Value::from(4.0), &Transition::default(), None).unwrap();
    assert_eq!(engine.get(None), Value::from(4.0));
    assert!(engine.velocity().is_none());
}

#[test]
fn resolve_defaults_to_tween() {
    let rt = runtime();
    let (resolved, method) = Transition::duration(100.0).resolve(&rt).unwrap();
    assert_eq!(method, MethodEntry::of::<TweenTransition>());
    assert_eq!(resolved.duration, Some(100.0));
    assert!(resolved.curve.is_none());
}

#[test]
fn resolve_looks_up_named_curve_and_method() {
    let rt = runtime();
    rt.register_method::<Snap>("snap").unwrap();
    let (resolved, method) = Transition::duration(10.0)
        .with_curve("easeIn")
        .with_method("snap")
        .resolve(&rt)
        .unwrap();
    assert_eq!(method, MethodEntry::of::<Snap>());
    let Some(CurveRef::Custom(curve)) = resolved.curve else {
        panic!("curve should resolve to a concrete function");
    };
    assert_eq!(curve(0.5), Ease::InQuad.apply(0.5));
}

#[test]
fn resolve_reports_unknown_names() {
    let rt = runtime();
    let curve_err = Transition::default().with_curve("wobble").resolve(&rt).unwrap_err();
    assert!(matches!(curve_err, TrellisError::Configuration(_)));
    let method_err = Transition::default().with_method("physics").resolve(&rt).unwrap_err();
    assert!(matches!(method_err, TrellisError::Configuration(_)));
}

#[test]
fn with_engine_skips_the_registry() {
    let rt = runtime();
    let (_, method) = Transition::default().with_engine::<Snap>().resolve(&rt).unwrap();
    assert_eq!(method, MethodEntry::of::<Snap>());
}
