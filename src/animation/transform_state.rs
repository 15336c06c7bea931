use crate::{
    animation::{engine::Transition, transitionable::Transitionable},
    foundation::{
        callback::{Callback, after},
        core::Value,
        error::TrellisResult,
    },
    scene::runtime::Runtime,
    transform::{decompose::Decomposition, matrix::Matrix},
};

/// A matrix that animates through its decomposed components.
///
/// Translate, rotate, skew and scale each run their own [`Transitionable`]; the matrix is
/// rebuilt from them while any is moving.
#[derive(Debug)]
pub struct TransitionableTransform {
    translate: Transitionable,
    rotate: Transitionable,
    skew: Transitionable,
    scale: Transitionable,
    final_transform: Matrix,
}

impl TransitionableTransform {
    /// Creates a machine resting at `transform`.
    pub fn new(runtime: &Runtime, transform: Matrix) -> Self {
        let parts = transform.interpret();
        Self {
            translate: Transitionable::new(runtime, parts.translate),
            rotate: Transitionable::new(runtime, parts.rotate),
            skew: Transitionable::new(runtime, parts.skew),
            scale: Transitionable::new(runtime, parts.scale),
            final_transform: transform,
        }
    }

    /// Moves every component toward the decomposition of `transform`.
    ///
    /// `callback` runs once all four components have arrived.
    pub fn set(
        &mut self,
        transform: Matrix,
        transition: Option<Transition>,
        callback: Option<Callback>,
    ) -> TrellisResult<()> {
        let parts = transform.interpret();
        let mut callbacks = callback
            .map(|cb| after(4, cb))
            .unwrap_or_default()
            .into_iter();
        self.translate
            .set(parts.translate, transition.clone(), callbacks.next())?;
        self.rotate
            .set(parts.rotate, transition.clone(), callbacks.next())?;
        self.skew
            .set(parts.skew, transition.clone(), callbacks.next())?;
        self.scale.set(parts.scale, transition, callbacks.next())?;
        self.final_transform = transform;
        Ok(())
    }

    /// Animates the translation only.
    pub fn set_translate(
        &mut self,
        translate: [f64; 3],
        transition: Option<Transition>,
        callback: Option<Callback>,
    ) -> TrellisResult<()> {
        self.translate.set(translate, transition, callback)?;
        self.final_transform = self.resting();
        Ok(())
    }

    /// Animates the rotation only.
    pub fn set_rotate(
        &mut self,
        rotate: [f64; 3],
        transition: Option<Transition>,
        callback: Option<Callback>,
    ) -> TrellisResult<()> {
        self.rotate.set(rotate, transition, callback)?;
        self.final_transform = self.resting();
        Ok(())
    }

    /// Animates the skew only.
    pub fn set_skew(
        &mut self,
        skew: [f64; 3],
        transition: Option<Transition>,
        callback: Option<Callback>,
    ) -> TrellisResult<()> {
        self.skew.set(skew, transition, callback)?;
        self.final_transform = self.resting();
        Ok(())
    }

    /// Animates the scale only.
    pub fn set_scale(
        &mut self,
        scale: [f64; 3],
        transition: Option<Transition>,
        callback: Option<Callback>,
    ) -> TrellisResult<()> {
        self.scale.set(scale, transition, callback)?;
        self.final_transform = self.resting();
        Ok(())
    }

    /// Samples the matrix at `timestamp` (or the runtime clock).
    pub fn get(&mut self, timestamp: Option<f64>) -> Matrix {
        if self.is_active() {
            Matrix::build(&Decomposition {
                translate: vec3(&self.translate.get(timestamp), [0.0; 3]),
                rotate: vec3(&self.rotate.get(timestamp), [0.0; 3]),
                skew: vec3(&self.skew.get(timestamp), [0.0; 3]),
                scale: vec3(&self.scale.get(timestamp), [1.0; 3]),
            })
        } else {
            self.final_transform
        }
    }

    /// The matrix this machine rests at once every component has arrived.
    pub fn final_transform(&self) -> Matrix {
        self.final_transform
    }

    /// Whether any component is moving.
    pub fn is_active(&self) -> bool {
        self.translate.is_active()
            || self.rotate.is_active()
            || self.skew.is_active()
            || self.scale.is_active()
    }

    /// Stops every component where it is.
    pub fn halt(&mut self) {
        self.final_transform = self.get(None);
        self.translate.halt();
        self.rotate.halt();
        self.skew.halt();
        self.scale.halt();
    }

    fn resting(&self) -> Matrix {
        Matrix::build(&Decomposition {
            translate: vec3(&self.translate.target(), [0.0; 3]),
            rotate: vec3(&self.rotate.target(), [0.0; 3]),
            skew: vec3(&self.skew.target(), [0.0; 3]),
            scale: vec3(&self.scale.target(), [1.0; 3]),
        })
    }
}

fn vec3(value: &Value, fallback: [f64; 3]) -> [f64; 3] {
    value.to_vec3_or(fallback)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/transform_state.rs"]
mod tests;
