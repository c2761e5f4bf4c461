//! Forward conversion: processor to raster image

use crate::color_model::{ColorModel, ComponentColorModel, FloatDoubleColorModel};
use crate::error::{Error, Result};
use crate::image::Image;
use crate::palette::Palette;
use crate::processor::{FloatProcessor, Processor, ProcessorKind, unpack_rgb};
use crate::raster::{DataBuffer, Raster, RasterImage, SampleModel};

use super::mapping::mapping;

/// Convert a processor, copying its pixels.
pub fn to_raster_image(processor: &Processor, prefer_binary: bool) -> Result<RasterImage> {
    into_raster_image(processor.clone(), prefer_binary)
}

/// Convert a processor, moving its pixel array into the raster where the
/// layouts agree.
///
/// With `prefer_binary`, an 8-bit processor holding only 0 and 255 is
/// packed to one bit per pixel like a binary processor.
pub fn into_raster_image(processor: Processor, prefer_binary: bool) -> Result<RasterImage> {
    (mapping(processor.kind()).forward)(processor, prefer_binary)
}

/// Convert slice `index` (0-based) of an image's stack.
///
/// The image, including its current slice, is left untouched.
pub fn slice_to_raster_image(image: &Image, index: usize, prefer_binary: bool) -> Result<RasterImage> {
    let processor = image
        .stack()
        .processor(index)
        .ok_or(Error::IndexOutOfBounds {
            index,
            len: image.stack_size(),
        })?;
    to_raster_image(processor, prefer_binary)
}

/// Pack byte pixels to 1 bit per pixel, MSB first, rows padded to bytes.
///
/// A pixel is set when its byte is non-zero.
///
/// # Errors
///
/// Returns [`Error::InvalidDimension`] when either side is zero.
pub fn pack_bits(width: u32, height: u32, pixels: &[u8]) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension { width, height });
    }
    let w = width as usize;
    let stride = w.div_ceil(8);
    let mut packed = vec![0u8; stride * height as usize];
    for (row_in, row_out) in pixels.chunks_exact(w).zip(packed.chunks_exact_mut(stride)) {
        for (x, _) in row_in.iter().enumerate().filter(|(_, v)| **v != 0) {
            row_out[x / 8] |= 0x80 >> (x % 8);
        }
    }
    let expected = SampleModel::MultiPixelPacked { bits: 1 }.required_len(width, height);
    if packed.len() != expected {
        return Err(Error::Consistency(format!(
            "packed {} bytes for a {width}x{height} binary image, expected {expected}",
            packed.len()
        )));
    }
    Ok(packed)
}

fn mismatch(expected: ProcessorKind, got: &Processor) -> Error {
    Error::UnsupportedProcessor(format!(
        "{} processor routed to the {} conversion",
        got.kind().name(),
        expected.name()
    ))
}

fn packed_binary(width: u32, height: u32, pixels: &[u8], inverted: bool) -> Result<RasterImage> {
    let packed = pack_bits(width, height, pixels)?;
    let raster = Raster::packed(width, height, 1, packed)?;
    Ok(RasterImage::new(
        raster,
        Some(ColorModel::Indexed(Palette::binary(inverted))),
    ))
}

pub(crate) fn byte_to_raster(processor: Processor, prefer_binary: bool) -> Result<RasterImage> {
    let bp = match processor {
        Processor::Byte(bp) => bp,
        other => return Err(mismatch(ProcessorKind::Byte, &other)),
    };
    let (w, h) = (bp.width(), bp.height());
    if prefer_binary && bp.is_binary() {
        let inverted = bp.palette().is_some_and(Palette::is_inverted_gray_ramp);
        return packed_binary(w, h, bp.pixels(), inverted);
    }
    let palette = bp.palette().cloned().unwrap_or_else(Palette::gray_ramp);
    let raster = Raster::single_band(w, h, DataBuffer::byte(bp.into_pixels()))?;
    Ok(RasterImage::new(raster, Some(ColorModel::Indexed(palette))))
}

pub(crate) fn binary_to_raster(processor: Processor, _prefer_binary: bool) -> Result<RasterImage> {
    let bp = match processor {
        Processor::Binary(bp) => bp,
        other => return Err(mismatch(ProcessorKind::Binary, &other)),
    };
    packed_binary(bp.width(), bp.height(), bp.pixels(), bp.is_inverted())
}

pub(crate) fn short_to_raster(processor: Processor, _prefer_binary: bool) -> Result<RasterImage> {
    let sp = match processor {
        Processor::Short(sp) => sp,
        other => return Err(mismatch(ProcessorKind::Short, &other)),
    };
    let (w, h) = (sp.width(), sp.height());
    let raster = Raster::single_band(w, h, DataBuffer::ushort(sp.into_pixels()))?;
    Ok(RasterImage::new(
        raster,
        Some(ColorModel::Component(ComponentColorModel::gray(16))),
    ))
}

pub(crate) fn float_to_raster(processor: Processor, _prefer_binary: bool) -> Result<RasterImage> {
    let fp = match processor {
        Processor::Float(fp) => fp,
        other => return Err(mismatch(ProcessorKind::Float, &other)),
    };
    let cm = float_color_model(&fp);
    let (w, h) = (fp.width(), fp.height());
    let raster = Raster::single_band(w, h, DataBuffer::float(fp.into_pixels()))?;
    Ok(RasterImage::new(raster, Some(ColorModel::FloatDouble(cm))))
}

/// The processor's own model, or a gray one stretched over its display
/// range (pixel range when no display range is set).
fn float_color_model(fp: &FloatProcessor) -> FloatDoubleColorModel {
    if let Some(cm) = fp.color_model() {
        return cm.clone();
    }
    let mut cm = FloatDoubleColorModel::gray_float();
    let (black, white) = fp.display_range().unwrap_or_else(|| {
        let (lo, hi) = fp.find_min_and_max();
        (lo as f64, hi as f64)
    });
    if cm.set_black_white(black, white).is_err() {
        tracing::debug!(black, white, "degenerate display range, keeping unit stretch");
    }
    cm
}

pub(crate) fn rgb_to_raster(processor: Processor, _prefer_binary: bool) -> Result<RasterImage> {
    let cp = match processor {
        Processor::Rgb(cp) => cp,
        other => return Err(mismatch(ProcessorKind::Rgb, &other)),
    };
    let data: Vec<u8> = cp
        .pixels()
        .iter()
        .flat_map(|&p| {
            let (r, g, b) = unpack_rgb(p);
            [r, g, b]
        })
        .collect();
    let raster = Raster::interleaved(cp.width(), cp.height(), 3, DataBuffer::byte(data))?;
    Ok(RasterImage::new(
        raster,
        Some(ColorModel::Component(ComponentColorModel::srgb(8))),
    ))
}
