/// Convenience result type used across the crate.
pub type StippleResult<T> = Result<T, StippleError>;

/// Top-level error type.
///
/// Only [`StippleError::Decode`] is expected to escape the engine at runtime; the remaining
/// variants come from configuration and surface setup.
#[derive(thiserror::Error, Debug)]
pub enum StippleError {
    /// Invalid user input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// The source image could not be read or decoded.
    #[error("image decode error: {0}")]
    Decode(String),

    /// A drawing surface rejected an operation.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StippleError {
    /// Build a [`StippleError::Validation`] error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StippleError::Decode`] error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`StippleError::Render`] error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
