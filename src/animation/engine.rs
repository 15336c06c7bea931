use std::{any::TypeId, collections::BTreeMap, fmt};

use crate::{
    animation::ease::{Curve, CurveRegistry, Ease},
    foundation::{
        callback::Callback,
        core::Value,
        error::{TrellisError, TrellisResult},
    },
    scene::runtime::Runtime,
};

/// A pluggable interpolation engine driven by a [`Transitionable`](super::Transitionable).
///
/// Engines are sampled, never ticked: `get` advances the engine to the given timestamp (or
/// the runtime clock) and returns the current value.
pub trait TransitionEngine {
    /// Jumps to `state` with an optional starting velocity, cancelling any motion.
    fn reset(&mut self, state: Value, velocity: Option<Value>);

    /// Starts moving toward `end`; `callback` runs when the end is reached.
    fn set(
        &mut self,
        end: Value,
        transition: &Transition,
        callback: Option<Callback>,
    ) -> TrellisResult<()>;

    /// Advances to `timestamp` (ms) and returns the current value.
    fn get(&mut self, timestamp: Option<f64>) -> Value;

    /// Current velocity in units per millisecond, when the engine tracks one.
    fn velocity(&self) -> Option<Value> {
        None
    }

    /// Whether the engine is still moving.
    fn is_active(&self) -> bool;

    /// Stops in place at the current value.
    fn halt(&mut self);
}

/// How many components an engine can animate at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Multiplicity {
    /// Any value shape.
    Unbounded,
    /// Values longer than this are split across one engine per component.
    Max(usize),
}

/// An engine type that can be registered as a named method.
pub trait EngineMethod: TransitionEngine + Sized + 'static {
    /// Largest value this engine animates as a whole.
    const MULTIPLICITY: Multiplicity = Multiplicity::Unbounded;

    /// Creates an engine bound to `runtime`.
    fn create(runtime: &Runtime) -> Self;
}

fn create_boxed<E: EngineMethod>(runtime: &Runtime) -> Box<dyn TransitionEngine> {
    Box::new(E::create(runtime))
}

/// A registered engine type.
#[derive(Clone, Copy)]
pub struct MethodEntry {
    type_id: TypeId,
    type_name: &'static str,
    multiplicity: Multiplicity,
    create: fn(&Runtime) -> Box<dyn TransitionEngine>,
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry")
            .field("type_name", &self.type_name)
            .field("multiplicity", &self.multiplicity)
            .finish()
    }
}

impl PartialEq for MethodEntry {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl MethodEntry {
    /// Entry for engine type `E`.
    pub fn of<E: EngineMethod>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
            multiplicity: E::MULTIPLICITY,
            create: create_boxed::<E>,
        }
    }

    /// Creates a fresh engine instance.
    pub fn instantiate(&self, runtime: &Runtime) -> Box<dyn TransitionEngine> {
        (self.create)(runtime)
    }

    /// The engine's declared multiplicity.
    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    /// Whether `value` must be split across per-component engines.
    pub fn needs_split(&self, value: &Value) -> bool {
        match self.multiplicity {
            Multiplicity::Unbounded => false,
            Multiplicity::Max(n) => value.is_vector() && value.len() > n,
        }
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Named engine types available to transition descriptors.
#[derive(Clone, Debug, Default)]
pub struct MethodRegistry {
    methods: BTreeMap<String, MethodEntry>,
}

impl MethodRegistry {
    /// Registers engine type `E` under `name`.
    ///
    /// Registering the same type twice is a no-op; a different type under a taken name is a
    /// configuration error.
    pub fn register<E: EngineMethod>(&mut self, name: impl Into<String>) -> TrellisResult<()> {
        let name = name.into();
        let entry = MethodEntry::of::<E>();
        match self.methods.get(&name) {
            Some(existing) if *existing == entry => Ok(()),
            Some(existing) => Err(TrellisError::configuration(format!(
                "method '{name}' is already registered to {}",
                existing.type_name()
            ))),
            None => {
                tracing::debug!(%name, engine = entry.type_name(), "registered transition method");
                self.methods.insert(name, entry);
                Ok(())
            }
        }
    }

    /// Removes `name`; returns whether it was present.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.methods.remove(name).is_some()
    }

    /// Looks up `name`.
    pub fn get(&self, name: &str) -> TrellisResult<MethodEntry> {
        self.methods
            .get(name)
            .copied()
            .ok_or_else(|| TrellisError::configuration(format!("method '{name}' is not registered")))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

/// Curve selection for a transition.
#[derive(Clone)]
pub enum CurveRef {
    /// A name looked up in the runtime's [`CurveRegistry`].
    Named(String),
    /// A built-in curve.
    Ease(Ease),
    /// A caller-supplied function.
    Custom(Curve),
}

impl fmt::Debug for CurveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Ease(ease) => f.debug_tuple("Ease").field(ease).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl CurveRef {
    /// Resolves to a concrete curve.
    pub fn resolve(&self, curves: &CurveRegistry) -> TrellisResult<Curve> {
        match self {
            Self::Named(name) => curves.get(name),
            Self::Ease(ease) => Ok(ease.curve()),
            Self::Custom(curve) => Ok(curve.clone()),
        }
    }
}

impl From<Ease> for CurveRef {
    fn from(value: Ease) -> Self {
        Self::Ease(value)
    }
}

impl From<&str> for CurveRef {
    fn from(value: &str) -> Self {
        Self::Named(value.to_owned())
    }
}

impl From<String> for CurveRef {
    fn from(value: String) -> Self {
        Self::Named(value)
    }
}

impl From<Curve> for CurveRef {
    fn from(value: Curve) -> Self {
        Self::Custom(value)
    }
}

/// Engine selection for a transition.
#[derive(Clone, Debug)]
pub enum MethodRef {
    /// A name looked up in the runtime's [`MethodRegistry`].
    Named(String),
    /// A concrete engine type.
    Engine(MethodEntry),
}

/// Describes how to move toward a new value.
///
/// Every field is optional; unset fields fall back to the engine's defaults.
#[derive(Clone, Debug, Default)]
pub struct Transition {
    /// Duration in milliseconds.
    pub duration: Option<f64>,
    /// Shaping curve.
    pub curve: Option<CurveRef>,
    /// Units per millisecond; when positive, overrides `duration`.
    pub speed: Option<f64>,
    /// Engine to use instead of the default tween.
    pub method: Option<MethodRef>,
}

impl Transition {
    /// A transition lasting `ms` milliseconds.
    pub fn duration(ms: f64) -> Self {
        Self {
            duration: Some(ms),
            ..Self::default()
        }
    }

    /// A transition moving at `units_per_ms`.
    pub fn speed(units_per_ms: f64) -> Self {
        Self {
            speed: Some(units_per_ms),
            ..Self::default()
        }
    }

    /// Sets the curve.
    pub fn with_curve(mut self, curve: impl Into<CurveRef>) -> Self {
        self.curve = Some(curve.into());
        self
    }

    /// Selects a registered method by name.
    pub fn with_method(mut self, name: impl Into<String>) -> Self {
        self.method = Some(MethodRef::Named(name.into()));
        self
    }

    /// Selects engine type `E` directly.
    pub fn with_engine<E: EngineMethod>(mut self) -> Self {
        self.method = Some(MethodRef::Engine(MethodEntry::of::<E>()));
        self
    }

    /// Resolves named curve and method references against `runtime`.
    ///
    /// The returned transition only holds concrete curves; the method entry is returned
    /// separately (the default tween when none is named).
    pub(crate) fn resolve(&self, runtime: &Runtime) -> TrellisResult<(Self, MethodEntry)> {
        let curve = match &self.curve {
            Some(curve) => Some(CurveRef::Custom(curve.resolve(&runtime.curves())?)),
            None => None,
        };
        let method = match &self.method {
            Some(MethodRef::Named(name)) => runtime.methods().get(name)?,
            Some(MethodRef::Engine(entry)) => *entry,
            None => MethodEntry::of::<crate::animation::tween::TweenTransition>(),
        };
        Ok((
            Self {
                duration: self.duration,
                curve,
                speed: self.speed,
                method: Some(MethodRef::Engine(method)),
            },
            method,
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/engine.rs"]
mod tests;
