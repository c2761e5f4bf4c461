//! Codec-neutral page layouts
//!
//! Encoders do not look at rasters directly. A page is first sorted into
//! one of a few layouts every codec knows how to write, borrowing the
//! raster's samples where the layout matches.

use std::borrow::Cow;

use ijio_core::{
    BufferData, ColorModel, ColorSpace, Palette, Raster, RasterImage, RasterShape, SampleModel,
    unpack_rgb,
};

use crate::{IoError, IoResult};

/// A page ready for an encoder.
#[derive(Debug)]
pub(crate) enum PageData<'a> {
    /// 1-bit samples, one byte (0 or 1) per pixel; `inverted` when
    /// sample 0 displays white
    Bilevel { samples: Vec<u8>, inverted: bool },
    /// 8-bit gray
    Gray8(Cow<'a, [u8]>),
    /// 8-bit indices into a palette
    Indexed8 {
        indices: Cow<'a, [u8]>,
        palette: &'a Palette,
    },
    /// 16-bit gray
    Gray16(Cow<'a, [u16]>),
    /// 32-bit float gray
    Float32(Cow<'a, [f32]>),
    /// Interleaved 8-bit RGB
    Rgb8(Cow<'a, [u8]>),
    /// Interleaved 16-bit RGB
    Rgb16(Cow<'a, [u16]>),
}

/// Sort a raster image into an encoder layout.
///
/// # Errors
///
/// Fails for undefined samples, short banks, and multi-band rasters
/// without a color model.
pub(crate) fn classify(ri: &RasterImage) -> IoResult<PageData<'_>> {
    let raster = ri.raster();
    let n = raster.width() as usize * raster.height() as usize;
    let palette = ri.color_model().and_then(ColorModel::palette);
    let buffer = raster.data_buffer();
    let offset = buffer.offset();

    match ri.shape() {
        RasterShape::SubByte(bits) => {
            let samples = unpack(raster);
            if bits == 1 && palette.is_none_or(Palette::is_binary) {
                return Ok(PageData::Bilevel {
                    samples,
                    inverted: palette.is_some_and(Palette::is_inverted_binary),
                });
            }
            Ok(match palette {
                Some(palette) => PageData::Indexed8 {
                    indices: Cow::Owned(samples),
                    palette,
                },
                None => {
                    let max = (1u32 << bits) - 1;
                    PageData::Gray8(Cow::Owned(
                        samples.iter().map(|&v| (v as u32 * 255 / max) as u8).collect(),
                    ))
                }
            })
        }
        RasterShape::SingleBand(_) => Ok(match buffer.data() {
            BufferData::Byte(banks) => {
                let data = bank0(banks, offset, n)?;
                match palette {
                    Some(palette) if !palette.is_gray_ramp() => PageData::Indexed8 {
                        indices: Cow::Borrowed(data),
                        palette,
                    },
                    _ => PageData::Gray8(Cow::Borrowed(data)),
                }
            }
            BufferData::UShort(banks) => PageData::Gray16(Cow::Borrowed(bank0(banks, offset, n)?)),
            BufferData::Short(banks) => PageData::Gray16(Cow::Owned(
                bank0(banks, offset, n)?
                    .iter()
                    .map(|&v| (v as u16).wrapping_add(32768))
                    .collect(),
            )),
            BufferData::Int(banks) => PageData::Float32(Cow::Owned(
                bank0(banks, offset, n)?.iter().map(|&v| v as f32).collect(),
            )),
            BufferData::Float(banks) => PageData::Float32(Cow::Borrowed(bank0(banks, offset, n)?)),
            BufferData::Double(banks) => PageData::Float32(Cow::Owned(
                bank0(banks, offset, n)?.iter().map(|&v| v as f32).collect(),
            )),
            BufferData::Undefined(_) => {
                return Err(IoError::UnsupportedFormat(
                    "raster with undefined sample type".to_string(),
                ));
            }
        }),
        RasterShape::MultiBand { bands: 3, .. }
            if is_plain_rgb(ri) && raster.sample_model() == (SampleModel::PixelInterleaved { bands: 3 }) =>
        {
            match buffer.data() {
                BufferData::Byte(banks) => Ok(PageData::Rgb8(Cow::Borrowed(bank0(banks, offset, 3 * n)?))),
                BufferData::UShort(banks) => Ok(PageData::Rgb16(Cow::Borrowed(bank0(banks, offset, 3 * n)?))),
                _ => Ok(PageData::Rgb8(Cow::Owned(expand_rgb(ri)?))),
            }
        }
        RasterShape::MultiBand { .. } => Ok(PageData::Rgb8(Cow::Owned(expand_rgb(ri)?))),
    }
}

fn is_plain_rgb(ri: &RasterImage) -> bool {
    matches!(
        ri.color_model(),
        Some(ColorModel::Component(c)) if c.space() == ColorSpace::Srgb && !c.has_alpha()
    )
}

fn bank0<T>(banks: &[Vec<T>], offset: usize, len: usize) -> IoResult<&[T]> {
    banks
        .first()
        .and_then(|b| b.get(offset..offset + len))
        .ok_or_else(|| IoError::InvalidData("raster bank shorter than its sample model".to_string()))
}

/// One byte per sample of a packed raster.
fn unpack(raster: &Raster) -> Vec<u8> {
    let (w, h) = (raster.width(), raster.height());
    let mut out = Vec::with_capacity(w as usize * h as usize);
    for y in 0..h {
        for x in 0..w {
            out.push(raster.sample(x, y, 0).unwrap_or(0.0) as u8);
        }
    }
    out
}

/// Interleaved RGB through the raster's color model.
fn expand_rgb(ri: &RasterImage) -> IoResult<Vec<u8>> {
    let (w, h) = (ri.width(), ri.height());
    let mut out = Vec::with_capacity(3 * w as usize * h as usize);
    for y in 0..h {
        for x in 0..w {
            let (r, g, b) = unpack_rgb(ri.rgb(x, y)?);
            out.extend_from_slice(&[r, g, b]);
        }
    }
    Ok(out)
}

/// Displayed gray of bilevel samples: 255 for white, 0 for black.
pub(crate) fn bilevel_gray(samples: &[u8], inverted: bool) -> Vec<u8> {
    samples
        .iter()
        .map(|&s| if (s != 0) != inverted { 255 } else { 0 })
        .collect()
}

/// Interleaved RGB of palette indices; missing entries are black.
pub(crate) fn expand_palette(indices: &[u8], palette: &Palette) -> Vec<u8> {
    indices
        .iter()
        .flat_map(|&i| {
            let (r, g, b) = palette.get_rgb(i as usize).unwrap_or((0, 0, 0));
            [r, g, b]
        })
        .collect()
}

/// Gray of palette indices through the red channel of a gray palette.
pub(crate) fn palette_gray(indices: &[u8], palette: &Palette) -> Vec<u8> {
    indices
        .iter()
        .map(|&i| palette.get_rgb(i as usize).map_or(0, |(r, _, _)| r))
        .collect()
}

/// Stretch samples linearly over their finite min/max to 0..=255.
///
/// NaN maps to 0; a constant image maps to 0.
pub(crate) fn scale_to_u8<T: Copy + Into<f64>>(values: &[T]) -> Vec<u8> {
    let (min, max) = values
        .iter()
        .map(|&v| v.into())
        .filter(|v: &f64| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let range = max - min;
    values
        .iter()
        .map(|&v| {
            let v: f64 = v.into();
            if !(range > 0.0) || v.is_nan() {
                0
            } else {
                ((v - min) / range * 255.0).round().clamp(0.0, 255.0) as u8
            }
        })
        .collect()
}

/// Truncate decoder output to the expected sample count.
pub(crate) fn fit<T>(mut data: Vec<T>, len: usize) -> IoResult<Vec<T>> {
    if data.len() < len {
        return Err(IoError::InvalidData(format!(
            "decoded {} samples, expected {}",
            data.len(),
            len
        )));
    }
    data.truncate(len);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ijio_core::{ComponentColorModel, DataBuffer};

    #[test]
    fn test_byte_borrows() {
        let raster = Raster::single_band(2, 1, DataBuffer::byte(vec![3, 4])).unwrap();
        let ri = RasterImage::new(raster, Some(ColorModel::Indexed(Palette::gray_ramp())));
        let PageData::Gray8(Cow::Borrowed(data)) = classify(&ri).unwrap() else {
            panic!("expected borrowed gray");
        };
        assert_eq!(data, &[3, 4]);
    }

    #[test]
    fn test_packed_binary_inverted() {
        let raster = Raster::packed(3, 1, 1, vec![0b1010_0000]).unwrap();
        let ri = RasterImage::new(raster, Some(ColorModel::Indexed(Palette::binary(true))));
        let PageData::Bilevel { samples, inverted } = classify(&ri).unwrap() else {
            panic!("expected bilevel");
        };
        assert_eq!(samples, vec![1, 0, 1]);
        assert!(inverted);
        assert_eq!(bilevel_gray(&samples, inverted), vec![0, 255, 0]);
    }

    #[test]
    fn test_rgb_interleaved_and_generic() {
        let raster = Raster::interleaved(1, 1, 3, DataBuffer::byte(vec![1, 2, 3])).unwrap();
        let ri = RasterImage::new(raster, Some(ColorModel::Component(ComponentColorModel::srgb(8))));
        assert!(matches!(classify(&ri).unwrap(), PageData::Rgb8(Cow::Borrowed(&[1, 2, 3]))));

        let raster = Raster::interleaved(1, 1, 2, DataBuffer::byte(vec![9, 255])).unwrap();
        let cm = ComponentColorModel::new(ColorSpace::Gray, true, false, 8);
        let ri = RasterImage::new(raster, Some(ColorModel::Component(cm)));
        let PageData::Rgb8(data) = classify(&ri).unwrap() else {
            panic!("expected rgb");
        };
        assert_eq!(&*data, &[9, 9, 9]);
    }

    #[test]
    fn test_scale_to_u8() {
        assert_eq!(scale_to_u8(&[1.0f32, f32::NAN, 3.0, 2.0]), vec![0, 0, 255, 128]);
        assert_eq!(scale_to_u8(&[7u16, 7]), vec![0, 0]);
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit(vec![1, 2, 3], 2).unwrap(), vec![1, 2]);
        assert!(fit(vec![1], 2).is_err());
    }
}
