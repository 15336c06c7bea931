use std::{
    cell::{Cell, Ref, RefCell, RefMut},
    fmt,
    rc::Rc,
};

use crate::{
    animation::{
        ease::{Curve, CurveRegistry},
        engine::{EngineMethod, MethodEntry, MethodRegistry},
        tween::TweenOptions,
    },
    entity::registry::{EntityId, EntityRegistry, TargetRef},
    foundation::{
        clock::{Clock, SystemClock},
        error::TrellisResult,
    },
};

struct Inner {
    entities: RefCell<EntityRegistry>,
    curves: RefCell<CurveRegistry>,
    methods: RefCell<MethodRegistry>,
    tween_defaults: Cell<TweenOptions>,
    clock: Rc<dyn Clock>,
}

/// Shared registries and the clock every scene object is bound to.
///
/// Cloning is cheap and yields a handle to the same runtime. Separate runtimes are fully
/// isolated from one another.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<Inner>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("entities", &*self.inner.entities.borrow())
            .field("curves", &*self.inner.curves.borrow())
            .field("now", &self.now())
            .finish_non_exhaustive()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// A runtime driven by the monotonic system clock.
    pub fn new() -> Self {
        Self::with_clock(Rc::new(SystemClock::new()))
    }

    /// A runtime driven by `clock`.
    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self {
            inner: Rc::new(Inner {
                entities: RefCell::new(EntityRegistry::new()),
                curves: RefCell::new(CurveRegistry::with_defaults()),
                methods: RefCell::new(MethodRegistry::default()),
                tween_defaults: Cell::new(TweenOptions::default()),
                clock,
            }),
        }
    }

    /// Current time in milliseconds.
    pub fn now(&self) -> f64 {
        self.inner.clock.now()
    }

    /// Shared view of the entity registry.
    pub fn entities(&self) -> Ref<'_, EntityRegistry> {
        self.inner.entities.borrow()
    }

    /// Mutable view of the entity registry.
    pub fn entities_mut(&self) -> RefMut<'_, EntityRegistry> {
        self.inner.entities.borrow_mut()
    }

    /// Registers `target` and returns its id.
    pub fn register(&self, target: TargetRef) -> EntityId {
        self.entities_mut().register(target)
    }

    /// Looks up the target registered under `id`.
    pub fn target(&self, id: EntityId) -> Option<TargetRef> {
        self.entities().get(id)
    }

    /// Empties the slot for `id`.
    pub fn unregister(&self, id: EntityId) -> Option<TargetRef> {
        self.entities_mut().unregister(id)
    }

    /// Shared view of the curve registry.
    pub fn curves(&self) -> Ref<'_, CurveRegistry> {
        self.inner.curves.borrow()
    }

    /// Registers a named curve; `false` when the name holds a different curve.
    pub fn register_curve(&self, name: impl Into<String>, curve: Curve) -> bool {
        self.inner.curves.borrow_mut().register(name, curve)
    }

    /// Removes a named curve.
    pub fn unregister_curve(&self, name: &str) -> bool {
        self.inner.curves.borrow_mut().unregister(name)
    }

    /// Looks up a named curve.
    pub fn curve(&self, name: &str) -> TrellisResult<Curve> {
        self.curves().get(name)
    }

    /// Shared view of the method registry.
    pub fn methods(&self) -> Ref<'_, MethodRegistry> {
        self.inner.methods.borrow()
    }

    /// Registers engine type `E` as a named transition method.
    pub fn register_method<E: EngineMethod>(&self, name: impl Into<String>) -> TrellisResult<()> {
        self.inner.methods.borrow_mut().register::<E>(name)
    }

    /// Removes a named method.
    pub fn unregister_method(&self, name: &str) -> bool {
        self.inner.methods.borrow_mut().unregister(name)
    }

    /// Looks up a named method.
    pub fn method(&self, name: &str) -> TrellisResult<MethodEntry> {
        self.methods().get(name)
    }

    /// Defaults for tweens created from now on.
    pub fn tween_defaults(&self) -> TweenOptions {
        self.inner.tween_defaults.get()
    }

    /// Replaces the tween defaults.
    pub fn set_tween_defaults(&self, options: TweenOptions) {
        self.inner.tween_defaults.set(options);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/runtime.rs"]
mod tests;
