//! Time-driven state: curves, interpolation engines and the queued state machines built on them.

/// Built-in curves and the curve registry.
pub mod ease;
/// The engine contract, transition descriptors and the method registry.
pub mod engine;
/// Per-component fan-out for engines with bounded multiplicity.
pub mod multiple;
/// Queued matrix animation through decomposed components.
pub mod transform_state;
/// Queued scalar/vector animation.
pub mod transitionable;
/// The default curve-and-duration engine.
pub mod tween;

pub use ease::{Curve, CurveRegistry, Ease, custom_curve};
pub use engine::{
    CurveRef, EngineMethod, MethodEntry, MethodRef, MethodRegistry, Multiplicity, Transition,
    TransitionEngine,
};
pub use multiple::MultipleTransition;
pub use transform_state::TransitionableTransform;
pub use transitionable::Transitionable;
pub use tween::{TweenOptions, TweenTransition};
