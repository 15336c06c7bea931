/// Convenience result type used across trellis.
pub type TrellisResult<T> = Result<T, TrellisError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Numeric degeneracy (inverting a singular matrix, decomposing a collapsed one) is not part
/// of this taxonomy: those operations return non-finite or neutral values instead.
#[derive(thiserror::Error, Debug)]
pub enum TrellisError {
    /// Registry misuse: an unregistered curve or method name, or a conflicting registration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid user-provided data (scene documents, CLI input).
    #[error("validation error: {0}")]
    Validation(String),

    /// A scene document refers to something that does not exist.
    #[error("scene error: {0}")]
    Scene(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrellisError {
    /// Build a [`TrellisError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`TrellisError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TrellisError::Scene`] value.
    pub fn scene(msg: impl Into<String>) -> Self {
        Self::Scene(msg.into())
    }

    /// Build a [`TrellisError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for TrellisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
