use std::{any::TypeId, collections::VecDeque, rc::Rc};

use crate::{
    animation::{
        ease::Curve,
        engine::{MethodEntry, Transition, TransitionEngine},
        multiple::MultipleTransition,
    },
    foundation::{callback::Callback, core::Value, error::TrellisResult},
    scene::runtime::Runtime,
};

struct Action {
    end: Value,
    transition: Transition,
    method: MethodEntry,
    callback: Option<Callback>,
}

/// A value that moves through a queue of transitions.
///
/// The state machine is polled: [`get`](Self::get) advances the current engine and, once it
/// settles, runs the finished action's callback and starts the next queued action.
///
/// Callbacks run while the machine is mutably borrowed, so they must not call back into the
/// same `Transitionable`.
pub struct Transitionable {
    runtime: Runtime,
    state: Value,
    velocity: Option<Value>,
    queue: VecDeque<Action>,
    current_end: Option<Value>,
    callback: Option<Callback>,
    engine: Option<Box<dyn TransitionEngine>>,
    engine_key: Option<(TypeId, bool)>,
}

impl std::fmt::Debug for Transitionable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transitionable")
            .field("state", &self.state)
            .field("current_end", &self.current_end)
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl Transitionable {
    /// Creates a machine resting at `start`.
    pub fn new(runtime: &Runtime, start: impl Into<Value>) -> Self {
        Self {
            runtime: runtime.clone(),
            state: start.into(),
            velocity: None,
            queue: VecDeque::new(),
            current_end: None,
            callback: None,
            engine: None,
            engine_key: None,
        }
    }

    /// Moves to `end`.
    ///
    /// Without a transition the value jumps immediately: the queue is cancelled, the in-flight
    /// callback runs, then `callback` runs. With a transition the action is queued behind
    /// any pending ones. Unknown curve or method names are rejected before anything is queued.
    ///
    /// # Panics
    ///
    /// Callbacks run while `self` is borrowed. A callback that reaches back into this same
    /// machine through a shared `RefCell` panics with a double borrow.
    pub fn set(
        &mut self,
        end: impl Into<Value>,
        transition: Option<Transition>,
        callback: Option<Callback>,
    ) -> TrellisResult<()> {
        let end = end.into();
        let Some(transition) = transition else {
            let pending = self.callback.take();
            self.reset(end, None);
            if let Some(cb) = pending {
                cb();
            }
            if let Some(cb) = callback {
                cb();
            }
            return Ok(());
        };

        let (transition, method) = transition.resolve(&self.runtime)?;
        self.queue.push_back(Action {
            end,
            transition,
            method,
            callback,
        });
        if self.current_end.is_none() {
            self.load_next();
        }
        Ok(())
    }

    /// Jumps to `state` and forgets every pending action and callback.
    pub fn reset(&mut self, state: impl Into<Value>, velocity: Option<Value>) {
        self.state = state.into();
        self.velocity = velocity;
        self.queue.clear();
        self.current_end = None;
        self.callback = None;
        self.engine = None;
        self.engine_key = None;
    }

    /// Queues a hold at the resting value for `duration` ms.
    pub fn delay(&mut self, duration: f64, callback: Option<Callback>) -> TrellisResult<()> {
        let hold: Curve = Rc::new(|_| 0.0);
        let resting = self.target();
        self.set(resting, Some(Transition::duration(duration).with_curve(hold)), callback)
    }

    /// Samples the value at `timestamp` (or the runtime clock).
    ///
    /// # Panics
    ///
    /// Completion callbacks fire from here; the same re-entrancy rule as [`set`](Self::set)
    /// applies.
    pub fn get(&mut self, timestamp: Option<f64>) -> Value {
        let settled = match self.engine.as_mut() {
            Some(engine) => {
                self.state = engine.get(timestamp);
                if let Some(v) = engine.velocity() {
                    self.velocity = Some(v);
                }
                !engine.is_active()
            }
            None => return self.state.clone(),
        };
        if settled && self.current_end.is_some() {
            self.load_next();
        }
        self.state.clone()
    }

    /// Last sampled velocity, when the engine reports one.
    pub fn velocity(&self) -> Option<Value> {
        self.velocity.clone()
    }

    /// Whether an action is in progress.
    pub fn is_active(&self) -> bool {
        self.current_end.is_some()
    }

    /// Stops at the current value, dropping pending actions and their callbacks.
    pub fn halt(&mut self) {
        let here = self.get(None);
        self.reset(here, None);
    }

    /// The value this machine rests at once every queued action has run.
    pub fn target(&self) -> Value {
        self.queue
            .back()
            .map(|action| &action.end)
            .or(self.current_end.as_ref())
            .unwrap_or(&self.state)
            .clone()
    }

    fn load_next(&mut self) {
        if let Some(cb) = self.callback.take() {
            cb();
        }

        let Some(action) = self.queue.pop_front() else {
            let state = self.state.clone();
            self.reset(state, None);
            return;
        };

        let split = action.method.needs_split(&action.end);
        let key = (action.method.type_id(), split);
        let engine: Box<dyn TransitionEngine> = match self.engine.take() {
            Some(engine) if self.engine_key == Some(key) => engine,
            _ => {
                self.engine_key = Some(key);
                if split {
                    Box::new(MultipleTransition::new(&self.runtime, action.method))
                        as Box<dyn TransitionEngine>
                } else {
                    action.method.instantiate(&self.runtime)
                }
            }
        };
        let engine = self.engine.insert(engine);

        engine.reset(self.state.clone(), self.velocity.clone());
        if let Err(err) = engine.set(action.end.clone(), &action.transition, None) {
            tracing::warn!(%err, "transition could not start; jumping to its end value");
            engine.reset(action.end.clone(), None);
        }
        tracing::trace!(end = ?action.end, "transition started");
        self.current_end = Some(action.end);
        self.callback = action.callback;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/transitionable.rs"]
mod tests;
