use std::{collections::BTreeMap, fmt, rc::Rc};

use crate::foundation::error::{TrellisError, TrellisResult};

/// A shaping function from progress `t ∈ [0, 1]` to a blend factor.
pub type Curve = Rc<dyn Fn(f64) -> f64>;

/// Built-in curves, registered by default under their serde names.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Ease {
    /// `t`.
    #[default]
    #[serde(rename = "linear")]
    Linear,
    /// `t²`.
    #[serde(rename = "easeIn")]
    InQuad,
    /// `t(2 - t)`.
    #[serde(rename = "easeOut")]
    OutQuad,
    /// Quadratic in, then quadratic out.
    #[serde(rename = "easeInOut")]
    InOutQuad,
    /// `t(3 - 2t)`: overshoots slightly before settling.
    #[serde(rename = "easeOutBounce")]
    OutBounce,
    /// Damped sine oscillation around the linear ramp.
    #[serde(rename = "spring")]
    Spring,
}

impl Ease {
    /// Every built-in curve.
    pub const ALL: [Self; 6] = [
        Self::Linear,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::OutBounce,
        Self::Spring,
    ];

    /// Registry name of this curve.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::InQuad => "easeIn",
            Self::OutQuad => "easeOut",
            Self::InOutQuad => "easeInOut",
            Self::OutBounce => "easeOutBounce",
            Self::Spring => "spring",
        }
    }

    /// Evaluates the curve. `t` is not clamped so that finite differences near the ends
    /// see the true slope.
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => t * (2.0 - t),
            Self::InOutQuad => {
                if t <= 0.5 {
                    2.0 * t * t
                } else {
                    -2.0 * t * t + 4.0 * t - 1.0
                }
            }
            Self::OutBounce => t * (3.0 - 2.0 * t),
            Self::Spring => (1.0 - t) * (6.0 * std::f64::consts::PI * t).sin() + t,
        }
    }

    /// This curve as a shareable [`Curve`].
    pub fn curve(self) -> Curve {
        Rc::new(move |t| self.apply(t))
    }
}

/// Cubic curve from 0 to 1 with start slope `v1` and end slope `v2`.
pub fn custom_curve(v1: f64, v2: f64) -> Curve {
    Rc::new(move |t| v1 * t + (-2.0 * v1 - v2 + 3.0) * t * t + (v1 + v2 - 2.0) * t * t * t)
}

/// Named curves available to transition descriptors.
#[derive(Clone)]
pub struct CurveRegistry {
    curves: BTreeMap<String, Curve>,
}

impl fmt::Debug for CurveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.curves.keys()).finish()
    }
}

impl Default for CurveRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl CurveRegistry {
    /// A registry with no curves at all.
    pub fn empty() -> Self {
        Self {
            curves: BTreeMap::new(),
        }
    }

    /// A registry holding every [`Ease`] under its name.
    pub fn with_defaults() -> Self {
        let mut out = Self::empty();
        for ease in Ease::ALL {
            out.register(ease.name(), ease.curve());
        }
        out
    }

    /// Registers `curve` under `name`.
    ///
    /// Returns `false` when the name already holds a different curve; registering the same
    /// curve again is accepted.
    pub fn register(&mut self, name: impl Into<String>, curve: Curve) -> bool {
        let name = name.into();
        match self.curves.get(&name) {
            Some(existing) => Rc::ptr_eq(existing, &curve),
            None => {
                self.curves.insert(name, curve);
                true
            }
        }
    }

    /// Removes `name`; returns whether it was present.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.curves.remove(name).is_some()
    }

    /// Looks up `name`.
    pub fn get(&self, name: &str) -> TrellisResult<Curve> {
        self.curves
            .get(name)
            .cloned()
            .ok_or_else(|| TrellisError::configuration(format!("curve '{name}' is not registered")))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.curves.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.curves.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
