use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    animation::{
        engine::Transition, transform_state::TransitionableTransform,
        transitionable::Transitionable,
    },
    foundation::{
        callback::Callback,
        core::{FromValue, SizeSpec, Value, Xy},
        error::TrellisResult,
    },
    scene::{
        runtime::Runtime,
        spec::{BranchSpec, Spec},
    },
    transform::matrix::Matrix,
};

/// Where a modifier property comes from.
pub enum Source<T> {
    /// A fixed value.
    Constant(T),
    /// Sampled once per render.
    Dynamic(Box<dyn FnMut() -> T>),
}

impl<T: fmt::Debug> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl<T> From<T> for Source<T> {
    fn from(value: T) -> Self {
        Self::Constant(value)
    }
}

impl<T: 'static> Source<T> {
    /// A source sampled from `f`.
    pub fn from_fn(f: impl FnMut() -> T + 'static) -> Self {
        Self::Dynamic(Box::new(f))
    }
}

impl<T: FromValue + Default + Clone + 'static> Source<T> {
    /// A source that samples a shared [`Transitionable`].
    ///
    /// Samples of the wrong shape repeat the last good value.
    pub fn from_transitionable(state: Rc<RefCell<Transitionable>>) -> Self {
        let mut last = T::default();
        Self::from_fn(move || {
            let value = state.borrow_mut().get(None);
            match T::from_value(&value) {
                Some(v) => last = v,
                None => tracing::warn!(?value, "transitionable sample has the wrong shape"),
            }
            last.clone()
        })
    }
}

impl Source<Matrix> {
    /// A source that samples a shared [`TransitionableTransform`].
    pub fn from_transform(state: Rc<RefCell<TransitionableTransform>>) -> Self {
        Self::from_fn(move || state.borrow_mut().get(None))
    }
}

#[derive(Default)]
struct Getters {
    transform: Option<Box<dyn FnMut() -> Matrix>>,
    opacity: Option<Box<dyn FnMut() -> f64>>,
    origin: Option<Box<dyn FnMut() -> Xy>>,
    align: Option<Box<dyn FnMut() -> Xy>>,
    size: Option<Box<dyn FnMut() -> SizeSpec>>,
}

#[derive(Default)]
struct OwnedStates {
    transform: Option<Rc<RefCell<TransitionableTransform>>>,
    opacity: Option<Rc<RefCell<Transitionable>>>,
    origin: Option<Rc<RefCell<Transitionable>>>,
    align: Option<Rc<RefCell<Transitionable>>>,
    size: Option<Rc<RefCell<Transitionable>>>,
}

#[derive(Clone, Debug, PartialEq)]
struct Output {
    transform: Matrix,
    opacity: f64,
    origin: Option<Xy>,
    align: Option<Xy>,
    size: Option<SizeSpec>,
}

fn assign<T>(getter: &mut Option<Box<dyn FnMut() -> T>>, slot: &mut T, source: Source<T>) {
    match source {
        Source::Constant(v) => {
            *getter = None;
            *slot = v;
        }
        Source::Dynamic(f) => *getter = Some(f),
    }
}

fn sample<T>(getter: &mut Option<Box<dyn FnMut() -> T>>) -> Option<T> {
    getter.as_mut().map(|f| f())
}

/// A branch payload that applies transform, opacity, origin, align and size to its children.
///
/// Each property is either a constant or a sampled source. The `set_*` methods with a
/// transition create an owned state machine the first time and bind the property to it.
///
/// # Panics
///
/// Completion callbacks run while the modifier is borrowed, so a callback passed to a
/// `set_*` method must not borrow the same shared modifier again.
pub struct Modifier {
    runtime: Runtime,
    getters: Getters,
    states: OwnedStates,
    output: Output,
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modifier")
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

impl Modifier {
    /// A modifier that changes nothing: identity transform, full opacity.
    pub fn new(runtime: &Runtime) -> Self {
        Self {
            runtime: runtime.clone(),
            getters: Getters::default(),
            states: OwnedStates::default(),
            output: Output {
                transform: Matrix::IDENTITY,
                opacity: 1.0,
                origin: None,
                align: None,
                size: None,
            },
        }
    }

    /// Wraps this modifier for sharing between a node and the code animating it.
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Sources the transform.
    pub fn transform_from(&mut self, source: impl Into<Source<Matrix>>) -> &mut Self {
        assign(
            &mut self.getters.transform,
            &mut self.output.transform,
            source.into(),
        );
        self
    }

    /// Sources the opacity.
    pub fn opacity_from(&mut self, source: impl Into<Source<f64>>) -> &mut Self {
        assign(
            &mut self.getters.opacity,
            &mut self.output.opacity,
            source.into(),
        );
        self
    }

    /// Sources the origin.
    pub fn origin_from(&mut self, source: impl Into<Source<Xy>>) -> &mut Self {
        match source.into() {
            Source::Constant(v) => {
                self.getters.origin = None;
                self.output.origin = Some(v);
            }
            Source::Dynamic(f) => self.getters.origin = Some(f),
        }
        self
    }

    /// Sources the align point.
    pub fn align_from(&mut self, source: impl Into<Source<Xy>>) -> &mut Self {
        match source.into() {
            Source::Constant(v) => {
                self.getters.align = None;
                self.output.align = Some(v);
            }
            Source::Dynamic(f) => self.getters.align = Some(f),
        }
        self
    }

    /// Sources the size.
    pub fn size_from(&mut self, source: impl Into<Source<SizeSpec>>) -> &mut Self {
        match source.into() {
            Source::Constant(v) => {
                self.getters.size = None;
                self.output.size = Some(v);
            }
            Source::Dynamic(f) => self.getters.size = Some(f),
        }
        self
    }

    /// Stops applying a size.
    pub fn clear_size(&mut self) -> &mut Self {
        self.getters.size = None;
        self.output.size = None;
        self
    }

    /// Sets the transform, animating when `transition` is given or an animation is bound.
    pub fn set_transform(
        &mut self,
        transform: Matrix,
        transition: Option<Transition>,
        callback: Option<Callback>,
    ) -> TrellisResult<&mut Self> {
        if transition.is_none() && self.states.transform.is_none() {
            self.transform_from(transform);
            run(callback);
            return Ok(self);
        }
        let state = match &self.states.transform {
            Some(state) => state.clone(),
            None => {
                let state = Rc::new(RefCell::new(TransitionableTransform::new(
                    &self.runtime,
                    self.output.transform,
                )));
                self.states.transform = Some(state.clone());
                state
            }
        };
        if self.getters.transform.is_none() {
            self.transform_from(Source::from_transform(state.clone()));
        }
        state.borrow_mut().set(transform, transition, callback)?;
        Ok(self)
    }

    /// Sets the opacity, animating when `transition` is given or an animation is bound.
    pub fn set_opacity(
        &mut self,
        opacity: f64,
        transition: Option<Transition>,
        callback: Option<Callback>,
    ) -> TrellisResult<&mut Self> {
        if transition.is_none() && self.states.opacity.is_none() {
            self.opacity_from(opacity);
            run(callback);
            return Ok(self);
        }
        let start = Value::from(self.output.opacity);
        let state = owned_state(&self.runtime, &mut self.states.opacity, start);
        if self.getters.opacity.is_none() {
            self.opacity_from(Source::<f64>::from_transitionable(state.clone()));
        }
        state.borrow_mut().set(opacity, transition, callback)?;
        Ok(self)
    }

    /// Sets the origin, animating when `transition` is given or an animation is bound.
    pub fn set_origin(
        &mut self,
        origin: Xy,
        transition: Option<Transition>,
        callback: Option<Callback>,
    ) -> TrellisResult<&mut Self> {
        if transition.is_none() && self.states.origin.is_none() {
            self.origin_from(origin);
            run(callback);
            return Ok(self);
        }
        let start = Value::from(self.output.origin.unwrap_or([0.0, 0.0]));
        let state = owned_state(&self.runtime, &mut self.states.origin, start);
        if self.getters.origin.is_none() {
            self.origin_from(Source::<Xy>::from_transitionable(state.clone()));
        }
        state.borrow_mut().set(origin, transition, callback)?;
        Ok(self)
    }

    /// Sets the align point, animating when `transition` is given or an animation is bound.
    pub fn set_align(
        &mut self,
        align: Xy,
        transition: Option<Transition>,
        callback: Option<Callback>,
    ) -> TrellisResult<&mut Self> {
        if transition.is_none() && self.states.align.is_none() {
            self.align_from(align);
            run(callback);
            return Ok(self);
        }
        let start = Value::from(self.output.align.unwrap_or([0.0, 0.0]));
        let state = owned_state(&self.runtime, &mut self.states.align, start);
        if self.getters.align.is_none() {
            self.align_from(Source::<Xy>::from_transitionable(state.clone()));
        }
        state.borrow_mut().set(align, transition, callback)?;
        Ok(self)
    }

    /// Sets the size, animating when `transition` is given or an animation is bound.
    ///
    /// `None` dimensions stay inherited and are not animated.
    pub fn set_size(
        &mut self,
        size: SizeSpec,
        transition: Option<Transition>,
        callback: Option<Callback>,
    ) -> TrellisResult<&mut Self> {
        if transition.is_none() && self.states.size.is_none() {
            self.size_from(size);
            run(callback);
            return Ok(self);
        }
        let current = self.output.size.unwrap_or([Some(0.0), Some(0.0)]);
        let start = Value::from(mask_size(current.map(|d| d.or(Some(0.0))), &size));
        let state = owned_state(&self.runtime, &mut self.states.size, start);
        if self.getters.size.is_none() {
            self.size_from(masked_size_source(state.clone()));
        }
        state.borrow_mut().set(size, transition, callback)?;
        Ok(self)
    }

    /// Current transform.
    pub fn transform(&mut self) -> Matrix {
        sample(&mut self.getters.transform).unwrap_or(self.output.transform)
    }

    /// The transform this modifier rests at once its animation finishes.
    pub fn final_transform(&self) -> Matrix {
        match &self.states.transform {
            Some(state) => state.borrow().final_transform(),
            None => self.output.transform,
        }
    }

    /// Current opacity.
    pub fn opacity(&mut self) -> f64 {
        sample(&mut self.getters.opacity).unwrap_or(self.output.opacity)
    }

    /// Current origin, if set.
    pub fn origin(&mut self) -> Option<Xy> {
        sample(&mut self.getters.origin).or(self.output.origin)
    }

    /// Current align point, if set.
    pub fn align(&mut self) -> Option<Xy> {
        sample(&mut self.getters.align).or(self.output.align)
    }

    /// Current size, if set.
    pub fn size(&mut self) -> Option<SizeSpec> {
        sample(&mut self.getters.size).or(self.output.size)
    }

    /// Stops every owned animation and freezes each property at its current value.
    pub fn halt(&mut self) {
        if let Some(state) = &self.states.transform {
            state.borrow_mut().halt();
        }
        for state in [
            &self.states.opacity,
            &self.states.origin,
            &self.states.align,
            &self.states.size,
        ]
        .into_iter()
        .flatten()
        {
            state.borrow_mut().halt();
        }
        self.update();
        self.getters = Getters::default();
    }

    /// Wraps `target` in a branch carrying this frame's property values.
    pub fn modify(&mut self, target: Spec) -> Spec {
        self.update();
        Spec::Branch(Box::new(BranchSpec {
            target,
            transform: Some(self.output.transform),
            opacity: Some(self.output.opacity),
            origin: self.output.origin,
            align: self.output.align,
            size: self.output.size,
        }))
    }

    fn update(&mut self) {
        if let Some(v) = sample(&mut self.getters.transform) {
            self.output.transform = v;
        }
        if let Some(v) = sample(&mut self.getters.opacity) {
            self.output.opacity = v;
        }
        if let Some(v) = sample(&mut self.getters.origin) {
            self.output.origin = Some(v);
        }
        if let Some(v) = sample(&mut self.getters.align) {
            self.output.align = Some(v);
        }
        if let Some(v) = sample(&mut self.getters.size) {
            self.output.size = Some(v);
        }
    }
}

fn mask_size(mut size: SizeSpec, shape: &SizeSpec) -> SizeSpec {
    for (dim, keep) in size.iter_mut().zip(shape) {
        if keep.is_none() {
            *dim = None;
        }
    }
    size
}

// Dimensions the resting target leaves unset report `None` for the whole animation.
fn masked_size_source(state: Rc<RefCell<Transitionable>>) -> Source<SizeSpec> {
    let mut last: SizeSpec = [None, None];
    Source::from_fn(move || {
        let mut state = state.borrow_mut();
        let value = state.get(None);
        match SizeSpec::from_value(&value) {
            Some(v) => last = v,
            None => tracing::warn!(?value, "size sample has the wrong shape"),
        }
        let shape = state.target();
        mask_size(last, &[shape.component(0), shape.component(1)])
    })
}

fn owned_state(
    runtime: &Runtime,
    slot: &mut Option<Rc<RefCell<Transitionable>>>,
    start: Value,
) -> Rc<RefCell<Transitionable>> {
    slot.get_or_insert_with(|| Rc::new(RefCell::new(Transitionable::new(runtime, start))))
        .clone()
}

fn run(callback: Option<Callback>) {
    if let Some(cb) = callback {
        cb();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/modifier.rs"]
mod tests;
