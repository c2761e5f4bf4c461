//! Processor kind to raster shape table
//!
//! Every [`ProcessorKind`] has exactly one entry carrying the raster shape
//! it produces and the functions for both directions. Adding a kind
//! without both directions fails to compile.

use crate::error::Result;
use crate::image::Image;
use crate::processor::{Processor, ProcessorKind};
use crate::raster::{RasterImage, RasterShape, SampleType};

use super::forward::{binary_to_raster, byte_to_raster, float_to_raster, rgb_to_raster, short_to_raster};
use super::reverse::{multi_band_to_image, single_band_to_image, sub_byte_to_image};

/// Processor to raster image, taking `prefer_binary`.
pub type ForwardFn = fn(Processor, bool) -> Result<RasterImage>;

/// Raster image to titled image.
pub type ReverseFn = fn(&str, RasterImage) -> Result<Image>;

/// One row of the table.
#[derive(Debug, Clone, Copy)]
pub struct Mapping {
    /// Processor kind
    pub kind: ProcessorKind,
    /// Shape the forward function produces
    pub shape: RasterShape,
    /// Processor to raster image
    pub forward: ForwardFn,
    /// Raster image back to an image holding a processor of `kind`
    pub reverse: ReverseFn,
}

/// Kinds present in the table.
pub const KINDS: [ProcessorKind; 5] = ProcessorKind::ALL;

/// Table row for a processor kind.
pub fn mapping(kind: ProcessorKind) -> Mapping {
    let (shape, forward, reverse): (RasterShape, ForwardFn, ReverseFn) = match kind {
        ProcessorKind::Byte => (
            RasterShape::SingleBand(SampleType::Byte),
            byte_to_raster,
            single_band_to_image,
        ),
        ProcessorKind::Short => (
            RasterShape::SingleBand(SampleType::UShort),
            short_to_raster,
            single_band_to_image,
        ),
        ProcessorKind::Float => (
            RasterShape::SingleBand(SampleType::Float),
            float_to_raster,
            single_band_to_image,
        ),
        ProcessorKind::Rgb => (
            RasterShape::MultiBand {
                bands: 3,
                sample_type: SampleType::Byte,
            },
            rgb_to_raster,
            multi_band_to_image,
        ),
        ProcessorKind::Binary => (RasterShape::SubByte(1), binary_to_raster, sub_byte_to_image),
    };
    Mapping {
        kind,
        shape,
        forward,
        reverse,
    }
}

/// Reverse function for any raster shape, including shapes no processor
/// kind produces (RGB48, signed 16-bit, 2/4-bit, int and double samples).
pub fn reverse_for(shape: RasterShape) -> ReverseFn {
    match shape {
        RasterShape::SingleBand(_) => single_band_to_image,
        RasterShape::SubByte(_) => sub_byte_to_image,
        RasterShape::MultiBand { .. } => multi_band_to_image,
    }
}
