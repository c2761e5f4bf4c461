//! I/O error types
//!
//! Provides a unified error type for all image I/O operations.
//! Each codec maps its underlying library errors into `IoError`
//! variants so that callers only need to handle one error type.

use thiserror::Error;

/// Error type for image I/O operations.
///
/// Wraps codec decoding/encoding errors as well as standard I/O and
/// core-library errors.
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported, not enabled via features, or has
    /// no registered provider
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The image data is structurally invalid
    #[error("invalid image data: {0}")]
    InvalidData(String),

    /// A codec returned an error while decoding
    #[error("decode error: {0}")]
    DecodeError(String),

    /// A codec returned an error while encoding
    #[error("encode error: {0}")]
    EncodeError(String),

    /// An error from the conversion core
    #[error("core error: {0}")]
    Core(#[from] ijio_core::Error),
}

impl IoError {
    /// Check if the error means "this image cannot be represented", as
    /// opposed to a failing file system or a corrupt stream.
    pub fn is_format_error(&self) -> bool {
        match self {
            IoError::UnsupportedFormat(_) => true,
            IoError::Core(e) => e.is_format_error(),
            _ => false,
        }
    }
}

/// Convenience alias for I/O results.
pub type IoResult<T> = Result<T, IoError>;
