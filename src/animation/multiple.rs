use crate::{
    animation::engine::{MethodEntry, Transition, TransitionEngine},
    foundation::{
        callback::{Callback, after},
        core::Value,
        error::TrellisResult,
    },
    scene::runtime::Runtime,
};

/// Animates a vector by running one engine per component.
///
/// Used when a value is longer than the chosen engine's [`Multiplicity`](super::Multiplicity).
pub struct MultipleTransition {
    runtime: Runtime,
    method: MethodEntry,
    instances: Vec<Box<dyn TransitionEngine>>,
    // Components that are non-numeric in the latest reset or target.
    unset: Vec<bool>,
    state: Value,
}

impl std::fmt::Debug for MultipleTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipleTransition")
            .field("method", &self.method)
            .field("instances", &self.instances.len())
            .field("state", &self.state)
            .finish()
    }
}

impl MultipleTransition {
    /// Creates an empty wrapper around engines of type `method`.
    pub fn new(runtime: &Runtime, method: MethodEntry) -> Self {
        Self {
            runtime: runtime.clone(),
            method,
            instances: Vec::new(),
            unset: Vec::new(),
            state: Value::Vector(Default::default()),
        }
    }

    fn ensure_instances(&mut self, count: usize) {
        self.instances.truncate(count);
        while self.instances.len() < count {
            self.instances.push(self.method.instantiate(&self.runtime));
        }
    }

    fn join(&self, parts: &[Value]) -> Value {
        Value::Vector(
            parts
                .iter()
                .enumerate()
                .map(|(i, part)| match self.unset.get(i) {
                    Some(true) => None,
                    _ => part.component(0),
                })
                .collect(),
        )
    }
}

fn unset_components(value: &Value) -> Vec<bool> {
    match value {
        Value::Scalar(_) => vec![false],
        Value::Vector(v) => v.iter().map(Option::is_none).collect(),
    }
}

impl TransitionEngine for MultipleTransition {
    fn reset(&mut self, state: Value, velocity: Option<Value>) {
        let parts = state.split();
        self.unset = unset_components(&state);
        let velocities = velocity.map(|v| v.split());
        self.ensure_instances(parts.len());
        for (i, (engine, part)) in self.instances.iter_mut().zip(parts).enumerate() {
            let v = velocities.as_ref().and_then(|vs| vs.get(i).cloned());
            engine.reset(part, v);
        }
        self.state = state;
    }

    fn set(
        &mut self,
        end: Value,
        transition: &Transition,
        callback: Option<Callback>,
    ) -> TrellisResult<()> {
        let parts = end.split();
        self.unset = unset_components(&end);
        self.ensure_instances(parts.len());
        let mut callbacks = callback
            .map(|cb| after(parts.len(), cb))
            .unwrap_or_default()
            .into_iter();
        for (engine, part) in self.instances.iter_mut().zip(parts) {
            engine.set(part, transition, callbacks.next())?;
        }
        Ok(())
    }

    fn get(&mut self, timestamp: Option<f64>) -> Value {
        let parts: Vec<Value> = self
            .instances
            .iter_mut()
            .map(|engine| engine.get(timestamp))
            .collect();
        self.state = self.join(&parts);
        self.state.clone()
    }

    fn velocity(&self) -> Option<Value> {
        let parts = self
            .instances
            .iter()
            .map(|engine| engine.velocity())
            .collect::<Option<Vec<_>>>()?;
        Some(self.join(&parts))
    }

    fn is_active(&self) -> bool {
        self.instances.iter().any(|engine| engine.is_active())
    }

    fn halt(&mut self) {
        for engine in &mut self.instances {
            engine.halt();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/multiple.rs"]
mod tests;
