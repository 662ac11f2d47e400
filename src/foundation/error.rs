/// Result alias used across the crate.
pub type CaptionResult<T> = Result<T, CaptionError>;

/// Error taxonomy for captioning operations.
///
/// Every variant is recoverable: callers report it (the session posts an error notice) and keep
/// their previous state.
#[derive(thiserror::Error, Debug)]
pub enum CaptionError {
    /// Rejected input: oversized or non-image upload, missing image, out-of-range style field.
    #[error("validation error: {0}")]
    Validation(String),

    /// Image bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Persisted state could not be read or written.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Surface could not be encoded to an output format.
    #[error("encode error: {0}")]
    Encode(String),

    /// Rasterization failed (surface too large, scratch buffer mismatch).
    #[error("render error: {0}")]
    Render(String),

    /// Anything else, with context attached by `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaptionError {
    /// Build a [`CaptionError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CaptionError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`CaptionError::Persistence`].
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Build a [`CaptionError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`CaptionError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}
