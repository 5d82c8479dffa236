/// Convenience result type used across Gradii.
pub type GradiiResult<T> = Result<T, GradiiError>;

/// Top-level error taxonomy used by the compositing pipeline and its boundaries.
#[derive(thiserror::Error, Debug)]
pub enum GradiiError {
    /// Invalid user-provided settings or upload rejected at the boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image or data URL could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Faults inside the render pipeline (buffer size mismatch, surface limits).
    #[error("render error: {0}")]
    Render(String),

    /// Encoding or delivering the exported image failed.
    #[error("export error: {0}")]
    Export(String),

    /// Errors when serializing or deserializing settings.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GradiiError {
    /// Build a [`GradiiError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GradiiError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`GradiiError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`GradiiError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`GradiiError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
