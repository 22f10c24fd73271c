/// Convenience result type used across the renderer.
pub type StarfieldResult<T> = Result<T, StarfieldError>;

/// Recoverable error taxonomy.
///
/// Internal invariant violations (mismatched image dimensions, undersized disc extraction) are
/// not represented here; they panic, because they can only be reached through configuration
/// that [`crate::StarfieldConfig::validate`] should have rejected.
#[derive(thiserror::Error, Debug)]
pub enum StarfieldError {
    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failures while driving a range render (worker pool, channel plumbing).
    #[error("render error: {0}")]
    Render(String),

    /// Failures inside a frame sink (file creation, encoder process).
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StarfieldError {
    /// Build a [`StarfieldError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StarfieldError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StarfieldError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
