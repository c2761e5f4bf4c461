//! ijio - ImageJ-style images to and from codec rasters
//!
//! Converts between pixel processors (8-bit, 16-bit, float, RGB and
//! binary planes with calibration) and the raster/color-model shape codec
//! libraries use, and reads and writes image files through pluggable
//! codec providers.
//!
//! # Example
//!
//! ```
//! use ijio::{ByteProcessor, Processor, to_image, to_raster_image};
//!
//! let bp = ByteProcessor::from_pixels(2, 1, vec![10, 200]).unwrap();
//! let raster = to_raster_image(&Processor::from(bp), false).unwrap();
//! let image = to_image("copy", raster).unwrap();
//! assert_eq!(image.processor().value(1, 0), Some(200.0));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use ijio_core::*;

// Re-export the codec bridge as a module to avoid name conflicts
pub use ijio_io as io;
