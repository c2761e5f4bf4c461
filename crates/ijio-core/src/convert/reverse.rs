//! Reverse conversion: raster image to image

use crate::color_model::ColorModel;
use crate::error::{Error, Result};
use crate::image::{ChannelMode, Image, ImageStack};
use crate::processor::{BinaryProcessor, ByteProcessor, ColorProcessor, Processor, ShortProcessor};
use crate::raster::{RasterImage, RasterShape, SampleType};

use super::interpret::interpret;
use super::mapping::reverse_for;

/// Convert a decoded raster image into an image.
///
/// | shape                         | result                                   |
/// |-------------------------------|------------------------------------------|
/// | 3 bands of unsigned 16-bit    | 3-slice 16-bit composite (RGB48)         |
/// | other multi-band              | RGB through the color model              |
/// | 1-bit, no or b/w palette      | binary                                   |
/// | 1/2/4-bit otherwise           | 8-bit, palette indices or scaled gray    |
/// | single band, 8 bits or more   | interpreter, palette kept if indexed     |
///
/// # Errors
///
/// Returns [`Error::AmbiguousColorModel`] for a multi-band or multi-bank
/// raster without a color model, and the interpreter's errors for
/// unsupported sample types.
pub fn to_image(title: &str, raster_image: RasterImage) -> Result<Image> {
    check_ambiguous(&raster_image)?;
    (reverse_for(raster_image.shape()))(title, raster_image)
}

fn check_ambiguous(ri: &RasterImage) -> Result<()> {
    let raster = ri.raster();
    if (raster.num_bands() > 1 || raster.num_banks() > 1) && ri.color_model().is_none() {
        return Err(Error::AmbiguousColorModel {
            bands: raster.num_bands(),
            banks: raster.num_banks(),
        });
    }
    Ok(())
}

pub(crate) fn multi_band_to_image(title: &str, ri: RasterImage) -> Result<Image> {
    check_ambiguous(&ri)?;
    if let RasterShape::MultiBand {
        bands: 3,
        sample_type: SampleType::UShort,
    } = ri.shape()
    {
        return rgb48_to_image(title, &ri);
    }

    let (w, h) = (ri.width(), ri.height());
    let mut pixels = Vec::with_capacity(w as usize * h as usize);
    for y in 0..h {
        for x in 0..w {
            pixels.push(ri.rgb(x, y)?);
        }
    }
    Ok(Image::from_processor(
        title,
        ColorProcessor::from_pixels(w, h, pixels)?.into(),
    ))
}

/// Split a 3-band 16-bit raster into three gray planes shown as a
/// composite.
fn rgb48_to_image(title: &str, ri: &RasterImage) -> Result<Image> {
    let raster = ri.raster();
    let (w, h) = (raster.width(), raster.height());
    let mut planes = vec![Vec::with_capacity(w as usize * h as usize); 3];
    for y in 0..h {
        for x in 0..w {
            for (band, plane) in planes.iter_mut().enumerate() {
                let v = raster.sample(x, y, band).unwrap_or(0.0);
                plane.push(v as u16);
            }
        }
    }

    let mut stack = ImageStack::new(w, h)?;
    for (plane, label) in planes.into_iter().zip(["Red", "Green", "Blue"]) {
        let mut sp = ShortProcessor::from_pixels(w, h, plane)?;
        sp.reset_display_range();
        stack.push(sp.into(), Some(label.to_string()))?;
    }
    let mut image = Image::from_stack(title, stack)?;
    image.set_dimensions(3, 1, 1)?;
    image.set_mode(Some(ChannelMode::Composite));
    tracing::debug!(width = w, height = h, "RGB48 raster split into a 3-channel composite");
    Ok(image)
}

pub(crate) fn sub_byte_to_image(title: &str, ri: RasterImage) -> Result<Image> {
    let RasterShape::SubByte(bits) = ri.shape() else {
        return Err(Error::UnsupportedFormat(format!(
            "expected a packed raster, got {:?}",
            ri.shape()
        )));
    };
    let raster = ri.raster();
    let (w, h) = (raster.width(), raster.height());
    let mut samples = Vec::with_capacity(w as usize * h as usize);
    for y in 0..h {
        for x in 0..w {
            samples.push(raster.sample(x, y, 0).unwrap_or(0.0) as u8);
        }
    }

    let palette = match ri.color_model() {
        None | Some(ColorModel::Component(_)) => None,
        Some(ColorModel::Indexed(p)) => Some(p),
        Some(ColorModel::FloatDouble(_)) => {
            return Err(Error::UnsupportedFormat(format!(
                "{bits}-bit samples with a float/double color model"
            )));
        }
    };

    let processor: Processor = match (bits, palette) {
        (1, p) if p.is_none_or(|p| p.is_binary()) => {
            let inverted = p.is_some_and(|p| p.is_inverted_binary());
            samples.iter_mut().for_each(|v| *v = if *v != 0 { 255 } else { 0 });
            BinaryProcessor::from_pixels(w, h, samples)?
                .with_inverted(inverted)
                .into()
        }
        (1 | 2 | 4, Some(p)) => ByteProcessor::from_pixels(w, h, samples)?
            .with_palette(Some(p.clone()))
            .into(),
        (2 | 4, None) => {
            let max = (1u32 << bits) - 1;
            samples
                .iter_mut()
                .for_each(|v| *v = (*v as u32 * 255 / max) as u8);
            ByteProcessor::from_pixels(w, h, samples)?.into()
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!(
                "{bits}-bit packed samples"
            )));
        }
    };
    Ok(Image::from_processor(title, processor))
}

pub(crate) fn single_band_to_image(title: &str, ri: RasterImage) -> Result<Image> {
    let (raster, color_model) = ri.into_parts();
    let (w, h) = (raster.width(), raster.height());
    let sample_type = raster.sample_type();
    let color_model = color_model.filter(ColorModel::is_indexed);
    let has_color_model = color_model.is_some();

    let processor = interpret(w, h, raster.into_data_buffer(), color_model)?;
    let mut image = Image::from_processor(title, processor);
    if sample_type == SampleType::Short {
        image.calibration_mut().set_signed16();
    } else if !has_color_model {
        image.processor_mut().reset_display_range();
    }
    Ok(image)
}
