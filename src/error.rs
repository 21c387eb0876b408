use thiserror::Error;

/// Result type alias for operations that may fail with [`TraceError`].
pub type TraceResult<T> = std::result::Result<T, TraceError>;

/// Error types that can occur while setting up or feeding the tracer.
///
/// The tracing stages themselves never fail: degenerate input produces an
/// empty graphic instead. Errors only come from option validation and from
/// loading images.
#[derive(Debug, Error)]
pub enum TraceError {
    /// A tracing option is outside its accepted range.
    #[error("Invalid tracing option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
    /// Image loading or decoding error.
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
    /// File system I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TraceError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}
