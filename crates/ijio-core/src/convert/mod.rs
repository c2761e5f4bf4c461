//! Conversions between processors and raster images
//!
//! # Directions
//!
//! - [`into_raster_image`] / [`to_raster_image`]: processor to raster
//!   image, moving or copying the pixel array
//! - [`to_image`]: decoded raster image back to an [`Image`](crate::Image)
//! - [`interpret`]: one bank of raw samples to a processor, shared by the
//!   reverse direction
//!
//! Both directions dispatch through the [`mapping`] table, one row per
//! processor kind.
//!
//! # See also
//!
//! - [`crate::color_model::FloatDoubleColorModel`] for how float planes display

mod forward;
mod interpret;
mod mapping;
mod reverse;

pub use forward::{into_raster_image, pack_bits, slice_to_raster_image, to_raster_image};
pub use interpret::interpret;
pub use mapping::{ForwardFn, KINDS, Mapping, ReverseFn, mapping, reverse_for};
pub use reverse::to_image;
