use smallvec::SmallVec;

pub use kurbo::Affine;

/// A 2D proportion or offset, e.g. an origin or align point in `[0, 1]²`.
pub type Xy = [f64; 2];

/// A requested size where `None` means "inherit this dimension from the parent".
pub type SizeSpec = [Option<f64>; 2];

/// Components of a vector [`Value`]. `None` marks a non-numeric component.
pub type Components = SmallVec<[Option<f64>; 4]>;

/// Animatable state: a scalar or a fixed-length vector.
///
/// Vector components may be `None`; interpolation leaves those untouched so that partially
/// numeric values (for example a size with one inherited dimension) can still animate.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A single number.
    Scalar(f64),
    /// A fixed-length vector.
    Vector(Components),
}

impl Default for Value {
    fn default() -> Self {
        Self::Scalar(0.0)
    }
}

impl Value {
    /// Number of components (a scalar counts as one).
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Vector(v) => v.len(),
        }
    }

    /// Whether this is an empty vector.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Vector(v) if v.is_empty())
    }

    /// Whether this value is a vector (regardless of length).
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector(_))
    }

    /// The scalar payload, if this is a scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Vector(_) => None,
        }
    }

    /// The `i`-th component; a scalar only has component 0.
    pub fn component(&self, i: usize) -> Option<f64> {
        match self {
            Self::Scalar(v) => (i == 0).then_some(*v),
            Self::Vector(v) => v.get(i).copied().flatten(),
        }
    }

    /// A value of the same shape with every component set to zero.
    pub fn zeroed(&self) -> Self {
        match self {
            Self::Scalar(_) => Self::Scalar(0.0),
            Self::Vector(v) => Self::Vector(v.iter().map(|_| Some(0.0)).collect()),
        }
    }

    /// Splits a vector into per-component scalars (`None` becomes `0.0`).
    pub fn split(&self) -> Vec<Self> {
        match self {
            Self::Scalar(v) => vec![Self::Scalar(*v)],
            Self::Vector(v) => v.iter().map(|c| Self::Scalar(c.unwrap_or(0.0))).collect(),
        }
    }

    /// Joins per-component scalars back into a vector.
    pub fn join(parts: &[Self]) -> Self {
        Self::Vector(parts.iter().map(|p| p.component(0)).collect())
    }

    /// Euclidean distance over the numeric components both values share.
    pub fn distance(&self, other: &Self) -> f64 {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => (b - a).abs(),
            _ => {
                let n = self.len().max(other.len());
                let sum: f64 = (0..n)
                    .filter_map(|i| Some(other.component(i)? - self.component(i)?))
                    .map(|d| d * d)
                    .sum();
                sum.sqrt()
            }
        }
    }

    /// Component-wise `(1 - t) * start + t * end`.
    ///
    /// Non-numeric components, and shape mismatches, keep the start value.
    pub fn lerp(start: &Self, end: &Self, t: f64) -> Self {
        fn mix(a: f64, b: f64, t: f64) -> f64 {
            (1.0 - t) * a + t * b
        }

        match (start, end) {
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(mix(*a, *b, t)),
            (Self::Vector(a), Self::Vector(b)) => Self::Vector(
                a.iter()
                    .enumerate()
                    .map(|(i, sa)| match (sa, b.get(i).copied().flatten()) {
                        (Some(sa), Some(eb)) => Some(mix(*sa, eb, t)),
                        (sa, _) => *sa,
                    })
                    .collect(),
            ),
            _ => start.clone(),
        }
    }

    /// Per-component `rate * (current - start) / duration`; non-numeric components get `0`.
    pub fn rate_of_change(current: &Self, start: &Self, rate: f64, duration: f64) -> Self {
        match (current, start) {
            (Self::Scalar(c), Self::Scalar(s)) => Self::Scalar(rate * (c - s) / duration),
            _ => Self::Vector(
                (0..current.len())
                    .map(|i| match (current.component(i), start.component(i)) {
                        (Some(c), Some(s)) => Some(rate * (c - s) / duration),
                        _ => Some(0.0),
                    })
                    .collect(),
            ),
        }
    }

    /// First three components, with missing ones taken from `fallback`.
    pub fn to_vec3_or(&self, fallback: [f64; 3]) -> [f64; 3] {
        let mut out = fallback;
        for (i, slot) in out.iter_mut().enumerate() {
            if let Some(c) = self.component(i) {
                *slot = c;
            }
        }
        out
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(v: [f64; N]) -> Self {
        Self::Vector(v.iter().map(|c| Some(*c)).collect())
    }
}

impl<const N: usize> From<[Option<f64>; N]> for Value {
    fn from(v: [Option<f64>; N]) -> Self {
        Self::Vector(v.iter().copied().collect())
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(v.into_iter().map(Some).collect())
    }
}

/// Conversion from an animated [`Value`] back into a concrete property type.
pub trait FromValue: Sized {
    /// Returns `None` when the value has the wrong shape.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Scalar(v) => Some(*v),
            Value::Vector(v) if v.len() == 1 => v[0],
            Value::Vector(_) => None,
        }
    }
}

impl FromValue for Xy {
    fn from_value(value: &Value) -> Option<Self> {
        Some([value.component(0)?, value.component(1)?])
    }
}

impl FromValue for [f64; 3] {
    fn from_value(value: &Value) -> Option<Self> {
        Some([value.component(0)?, value.component(1)?, value.component(2)?])
    }
}

impl FromValue for SizeSpec {
    fn from_value(value: &Value) -> Option<Self> {
        (value.len() >= 2).then(|| [value.component(0), value.component(1)])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
