//! Error types for ijio-core
//!
//! One error type covers the host image model, the raster model and the
//! conversions between them. Variants fall into three families:
//!
//! - format errors: the input cannot be interpreted (unknown sample type,
//!   ambiguous color model, non-zero buffer offset, unsupported layout)
//! - internal consistency errors: a computed size disagrees with itself,
//!   which points at a logic bug rather than bad input
//! - argument errors: dimensions, indices and parameters out of range

use thiserror::Error;

/// ijio-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Width or height is zero
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// A pixel array does not hold exactly `width * height` elements
    #[error("buffer length mismatch: expected {expected} elements, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    /// Element type the interpreter cannot turn into a processor
    #[error("unsupported sample type: {0}")]
    UnsupportedSampleType(String),

    /// Processor kind with no raster counterpart
    #[error("unsupported processor type: {0}")]
    UnsupportedProcessor(String),

    /// Raster layout or decoded image kind that cannot be represented
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Multi-band or multi-bank raster handed over without a color model
    #[error("ambiguous raster: {bands} band(s) in {banks} bank(s) and no color model")]
    AmbiguousColorModel { bands: usize, banks: usize },

    /// Data buffer does not start at element zero
    #[error("unsupported data buffer offset: {0}")]
    NonZeroOffset(usize),

    /// Internal size or layout invariant broken
    #[error("internal consistency error: {0}")]
    Consistency(String),

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Operation not defined for this object
    #[error("operation not supported: {0}")]
    NotSupported(String),
}

impl Error {
    /// True for errors caused by input that cannot be interpreted.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedSampleType(_)
                | Error::UnsupportedProcessor(_)
                | Error::UnsupportedFormat(_)
                | Error::AmbiguousColorModel { .. }
                | Error::NonZeroOffset(_)
        )
    }
}

/// Result type alias for ijio-core operations
pub type Result<T> = std::result::Result<T, Error>;
