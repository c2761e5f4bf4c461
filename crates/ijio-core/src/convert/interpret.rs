//! Sample-buffer interpreter
//!
//! Turns one bank of raw samples into the processor of the matching kind.
//! Byte and unsigned 16-bit banks move into the processor as they are;
//! the other element types are converted into a fresh or reused array.

use crate::color_model::ColorModel;
use crate::error::{Error, Result};
use crate::processor::{ByteProcessor, FloatProcessor, Processor, ShortProcessor};
use crate::raster::{BufferData, DataBuffer};

/// Build a processor from a single-bank buffer.
///
/// The buffer is consumed. Signed 16-bit samples are shifted by `+32768`
/// (modulo 65536) into a new unsigned array.
/// 32-bit int samples become float magnitudes and doubles are narrowed
/// to `f32`.
///
/// An indexed color model becomes the palette of a byte processor; a
/// float/double model is attached to a float processor. Other models are
/// ignored.
///
/// # Errors
///
/// - [`Error::NonZeroOffset`] when the buffer has an offset
/// - [`Error::UnsupportedSampleType`] for undefined elements
/// - [`Error::InvalidParameter`] when the buffer has more than one bank
/// - [`Error::BufferLength`] when the bank is not `width * height` long
pub fn interpret(
    width: u32,
    height: u32,
    buffer: DataBuffer,
    color_model: Option<ColorModel>,
) -> Result<Processor> {
    if buffer.offset() != 0 {
        return Err(Error::NonZeroOffset(buffer.offset()));
    }
    if buffer.num_banks() != 1 {
        return Err(Error::InvalidParameter(format!(
            "interpreter reads a single bank, buffer has {}",
            buffer.num_banks()
        )));
    }

    let processor = match buffer.into_data() {
        BufferData::Byte(banks) => {
            let palette = match color_model {
                Some(ColorModel::Indexed(p)) if !p.is_gray_ramp() => Some(p),
                _ => None,
            };
            ByteProcessor::from_pixels(width, height, single(banks))?
                .with_palette(palette)
                .into()
        }
        BufferData::UShort(banks) => ShortProcessor::from_pixels(width, height, single(banks))?.into(),
        BufferData::Short(banks) => {
            let biased = single(banks)
                .into_iter()
                .map(|v| (v as u16).wrapping_add(32768))
                .collect();
            ShortProcessor::from_pixels(width, height, biased)?.into()
        }
        BufferData::Int(banks) => {
            let pixels = single(banks).into_iter().map(|v| v as f32).collect();
            FloatProcessor::from_pixels(width, height, pixels)?.into()
        }
        BufferData::Float(banks) => {
            let mut fp = FloatProcessor::from_pixels(width, height, single(banks))?;
            if let Some(ColorModel::FloatDouble(cm)) = color_model {
                fp.set_color_model(Some(cm));
            }
            fp.into()
        }
        BufferData::Double(banks) => {
            let pixels = single(banks).into_iter().map(|v| v as f32).collect();
            FloatProcessor::from_pixels(width, height, pixels)?.into()
        }
        BufferData::Undefined(_) => {
            return Err(Error::UnsupportedSampleType(
                "data buffer element type is undefined".to_string(),
            ));
        }
    };
    Ok(processor)
}

fn single<T>(mut banks: Vec<Vec<T>>) -> Vec<T> {
    banks.pop().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_model::FloatDoubleColorModel;
    use crate::palette::Palette;

    #[test]
    fn test_byte_moves_without_copy() {
        let data = vec![7u8; 6];
        let ptr = data.as_ptr();
        let Processor::Byte(bp) = interpret(3, 2, DataBuffer::byte(data), None).unwrap() else {
            panic!("expected byte processor");
        };
        assert_eq!(bp.pixels().as_ptr(), ptr);
        assert!(bp.palette().is_none());
    }

    #[test]
    fn test_signed_short_bias() {
        let p = interpret(3, 1, DataBuffer::short(vec![-32768, 0, 32767]), None).unwrap();
        let Processor::Short(sp) = p else {
            panic!("expected short processor");
        };
        assert_eq!(sp.pixels(), &[0, 32768, 65535]);
    }

    #[test]
    fn test_int_as_float_magnitude() {
        let p = interpret(2, 1, DataBuffer::int(vec![-5, 1 << 20]), None).unwrap();
        let Processor::Float(fp) = p else {
            panic!("expected float processor");
        };
        assert_eq!(fp.pixels(), &[-5.0, 1048576.0]);
    }

    #[test]
    fn test_float_keeps_color_model() {
        let cm = FloatDoubleColorModel::gray_float();
        let p = interpret(
            1,
            1,
            DataBuffer::float(vec![0.5]),
            Some(ColorModel::FloatDouble(cm.clone())),
        )
        .unwrap();
        let Processor::Float(fp) = p else {
            panic!("expected float processor");
        };
        assert_eq!(fp.color_model(), Some(&cm));
    }

    #[test]
    fn test_indexed_palette_attached() {
        let pal = Palette::from_rgb_planes(&[255, 0], &[0, 255], &[0, 0]).unwrap();
        let p = interpret(2, 1, DataBuffer::byte(vec![0, 1]), Some(ColorModel::Indexed(pal.clone()))).unwrap();
        let Processor::Byte(bp) = p else {
            panic!("expected byte processor");
        };
        assert_eq!(bp.palette(), Some(&pal));
    }

    #[test]
    fn test_rejects_offset_and_undefined() {
        let offset = DataBuffer::byte(vec![0; 5]).with_offset(1);
        assert!(matches!(interpret(2, 2, offset, None), Err(Error::NonZeroOffset(1))));

        let undefined = DataBuffer::new(BufferData::Undefined(vec![4]));
        let err = interpret(2, 2, undefined, None).unwrap_err();
        assert!(err.is_format_error());
    }
}
