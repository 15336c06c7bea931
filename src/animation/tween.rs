use crate::{
    animation::{
        ease::{Curve, Ease},
        engine::{EngineMethod, Transition, TransitionEngine},
    },
    foundation::{callback::Callback, core::Value, error::TrellisResult},
    scene::runtime::Runtime,
};

/// Step used for the finite-difference velocity estimate.
const VELOCITY_EPS: f64 = 1e-7;

/// Defaults applied to transitions that leave fields unset.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TweenOptions {
    /// Curve used when a transition names none.
    pub curve: Ease,
    /// Duration in milliseconds.
    pub duration: f64,
    /// Units per millisecond; `0` means "use the duration".
    pub speed: f64,
}

impl Default for TweenOptions {
    fn default() -> Self {
        Self {
            curve: Ease::Linear,
            duration: 500.0,
            speed: 0.0,
        }
    }
}

/// Interpolates from a start value to an end value along a curve over a fixed duration.
pub struct TweenTransition {
    runtime: Runtime,
    options: TweenOptions,
    state: Value,
    velocity: Value,
    start_value: Value,
    start_velocity: Value,
    end_value: Value,
    start_time: f64,
    update_time: Option<f64>,
    duration: f64,
    curve: Curve,
    active: bool,
    callback: Option<Callback>,
}

impl std::fmt::Debug for TweenTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenTransition")
            .field("state", &self.state)
            .field("end_value", &self.end_value)
            .field("start_time", &self.start_time)
            .field("duration", &self.duration)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl TweenTransition {
    /// Creates a resting tween at `0` using the runtime's default options.
    pub fn new(runtime: &Runtime) -> Self {
        Self::with_options(runtime, runtime.tween_defaults())
    }

    /// Creates a resting tween at `0` with explicit options.
    pub fn with_options(runtime: &Runtime, options: TweenOptions) -> Self {
        Self {
            runtime: runtime.clone(),
            options,
            state: Value::default(),
            velocity: Value::default(),
            start_value: Value::default(),
            start_velocity: Value::default(),
            end_value: Value::default(),
            start_time: 0.0,
            update_time: None,
            duration: 0.0,
            curve: options.curve.curve(),
            active: false,
            callback: None,
        }
    }

    /// Replaces the defaults used by later `set` calls.
    pub fn set_options(&mut self, options: TweenOptions) {
        self.options = options;
    }

    /// Current defaults.
    pub fn options(&self) -> TweenOptions {
        self.options
    }

    /// Advances the tween to `timestamp` (or the runtime clock).
    ///
    /// Repeated or earlier timestamps are ignored. The completion callback runs during the
    /// update that reaches the end.
    pub fn update(&mut self, timestamp: Option<f64>) {
        if !self.active {
            if let Some(cb) = self.callback.take() {
                cb();
            }
            return;
        }

        let now = timestamp.unwrap_or_else(|| self.runtime.now());
        if self.update_time.is_some_and(|last| last >= now) {
            return;
        }
        self.update_time = Some(now);

        let elapsed = now - self.start_time;
        if elapsed >= self.duration {
            self.state = self.end_value.clone();
            self.velocity = self.velocity_at(1.0);
            self.active = false;
            if let Some(cb) = self.callback.take() {
                cb();
            }
        } else if elapsed < 0.0 {
            self.state = self.start_value.clone();
            self.velocity = self.start_velocity.clone();
        } else {
            let t = elapsed / self.duration;
            self.state = Value::lerp(&self.start_value, &self.end_value, (self.curve)(t));
            self.velocity = self.velocity_at(t);
        }
    }

    fn velocity_at(&self, t: f64) -> Value {
        if self.duration <= 0.0 {
            return self.state.zeroed();
        }
        let rate = ((self.curve)(t) - (self.curve)(t - VELOCITY_EPS)) / VELOCITY_EPS;
        Value::rate_of_change(&self.state, &self.start_value, rate, self.duration)
    }
}

impl TransitionEngine for TweenTransition {
    fn reset(&mut self, state: Value, velocity: Option<Value>) {
        if let Some(cb) = self.callback.take() {
            cb();
        }
        self.velocity = velocity.unwrap_or_else(|| state.zeroed());
        self.start_velocity = self.velocity.clone();
        self.start_value = state.clone();
        self.end_value = state.clone();
        self.state = state;
        self.start_time = 0.0;
        self.duration = 0.0;
        self.update_time = None;
        self.active = false;
    }

    fn set(
        &mut self,
        end: Value,
        transition: &Transition,
        callback: Option<Callback>,
    ) -> TrellisResult<()> {
        let curve = match &transition.curve {
            Some(curve) => curve.resolve(&self.runtime.curves())?,
            None => self.options.curve.curve(),
        };
        let speed = transition.speed.unwrap_or(self.options.speed);

        self.start_value = self.get(None);
        self.start_velocity = self.velocity.clone();
        self.duration = if speed > 0.0 {
            self.start_value.distance(&end) / speed
        } else {
            transition.duration.unwrap_or(self.options.duration)
        };
        self.curve = curve;
        self.end_value = end;
        self.start_time = self.runtime.now();
        self.update_time = None;
        self.active = true;
        self.callback = callback;
        Ok(())
    }

    fn get(&mut self, timestamp: Option<f64>) -> Value {
        self.update(timestamp);
        self.state.clone()
    }

    fn velocity(&self) -> Option<Value> {
        Some(self.velocity.clone())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn halt(&mut self) {
        let here = self.get(None);
        self.reset(here, None);
    }
}

impl EngineMethod for TweenTransition {
    fn create(runtime: &Runtime) -> Self {
        Self::new(runtime)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
