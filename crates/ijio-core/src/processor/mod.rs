//! Pixel processors - the host image planes
//!
//! A processor is one image plane backed by a flat, row-major array of a
//! single primitive element type. There is no row padding: the pixel at
//! `(x, y)` lives at index `y * width + x`, and the array always holds
//! exactly `width * height` elements.
//!
//! # Variants
//!
//! | variant               | element | meaning                              |
//! |-----------------------|---------|--------------------------------------|
//! | [`ByteProcessor`]     | `u8`    | 8-bit gray or palette indices        |
//! | [`ShortProcessor`]    | `u16`   | 16-bit unsigned gray                 |
//! | [`FloatProcessor`]    | `f32`   | 32-bit float gray                    |
//! | [`ColorProcessor`]    | `u32`   | packed `0xAARRGGBB` RGB              |
//! | [`BinaryProcessor`]   | `u8`    | two-level image, values 0 and 255    |
//!
//! [`Processor`] is the tagged union over the five; code dispatches on it by
//! `match`, never by inspecting concrete types.

mod binary;
mod color;
mod gray;
mod statistics;

pub use binary::BinaryProcessor;
pub use color::{ColorProcessor, pack_rgb, unpack_rgb};
pub use gray::{ByteProcessor, FloatProcessor, ShortProcessor};

use crate::error::{Error, Result};

/// Kind of a [`Processor`], without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorKind {
    /// 8-bit gray or indexed color
    Byte,
    /// 16-bit gray
    Short,
    /// 32-bit float gray
    Float,
    /// 24-bit RGB packed into 32-bit ints
    Rgb,
    /// 1-bit binary stored one byte per pixel
    Binary,
}

impl ProcessorKind {
    /// All kinds, in declaration order.
    pub const ALL: [ProcessorKind; 5] = [
        ProcessorKind::Byte,
        ProcessorKind::Short,
        ProcessorKind::Float,
        ProcessorKind::Rgb,
        ProcessorKind::Binary,
    ];

    /// Bits per pixel as the host reports them.
    pub fn bit_depth(self) -> u32 {
        match self {
            ProcessorKind::Byte => 8,
            ProcessorKind::Short => 16,
            ProcessorKind::Float => 32,
            ProcessorKind::Rgb => 24,
            ProcessorKind::Binary => 1,
        }
    }

    /// Short human-readable name
    pub fn name(self) -> &'static str {
        match self {
            ProcessorKind::Byte => "8-bit",
            ProcessorKind::Short => "16-bit",
            ProcessorKind::Float => "32-bit float",
            ProcessorKind::Rgb => "RGB",
            ProcessorKind::Binary => "binary",
        }
    }
}

/// One image plane of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Processor {
    /// 8-bit gray or indexed color
    Byte(ByteProcessor),
    /// 16-bit gray
    Short(ShortProcessor),
    /// 32-bit float gray
    Float(FloatProcessor),
    /// Packed RGB
    Rgb(ColorProcessor),
    /// Binary, 0 and 255 only
    Binary(BinaryProcessor),
}

impl Processor {
    /// Kind tag of this processor.
    pub fn kind(&self) -> ProcessorKind {
        match self {
            Processor::Byte(_) => ProcessorKind::Byte,
            Processor::Short(_) => ProcessorKind::Short,
            Processor::Float(_) => ProcessorKind::Float,
            Processor::Rgb(_) => ProcessorKind::Rgb,
            Processor::Binary(_) => ProcessorKind::Binary,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        match self {
            Processor::Byte(p) => p.width(),
            Processor::Short(p) => p.width(),
            Processor::Float(p) => p.width(),
            Processor::Rgb(p) => p.width(),
            Processor::Binary(p) => p.width(),
        }
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        match self {
            Processor::Byte(p) => p.height(),
            Processor::Short(p) => p.height(),
            Processor::Float(p) => p.height(),
            Processor::Rgb(p) => p.height(),
            Processor::Binary(p) => p.height(),
        }
    }

    /// Bits per pixel.
    pub fn bit_depth(&self) -> u32 {
        self.kind().bit_depth()
    }

    /// Independent copy of this processor and its pixel array.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// Numeric pixel value at `(x, y)`, or `None` outside the image.
    ///
    /// RGB pixels report their packed `0xRRGGBB` value.
    pub fn value(&self, x: u32, y: u32) -> Option<f64> {
        match self {
            Processor::Byte(p) => p.get(x, y).map(f64::from),
            Processor::Short(p) => p.get(x, y).map(f64::from),
            Processor::Float(p) => p.get(x, y).map(f64::from),
            Processor::Rgb(p) => p.get(x, y).map(|v| f64::from(v & 0x00ff_ffff)),
            Processor::Binary(p) => p.get(x, y).map(f64::from),
        }
    }
}

impl From<ByteProcessor> for Processor {
    fn from(p: ByteProcessor) -> Self {
        Processor::Byte(p)
    }
}

impl From<ShortProcessor> for Processor {
    fn from(p: ShortProcessor) -> Self {
        Processor::Short(p)
    }
}

impl From<FloatProcessor> for Processor {
    fn from(p: FloatProcessor) -> Self {
        Processor::Float(p)
    }
}

impl From<ColorProcessor> for Processor {
    fn from(p: ColorProcessor) -> Self {
        Processor::Rgb(p)
    }
}

impl From<BinaryProcessor> for Processor {
    fn from(p: BinaryProcessor) -> Self {
        Processor::Binary(p)
    }
}

/// Check dimensions and that a pixel array holds `width * height` elements.
pub(crate) fn check_plane(width: u32, height: u32, len: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension { width, height });
    }
    let expected = width as usize * height as usize;
    if len != expected {
        return Err(Error::BufferLength {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Shared accessors for the flat-array processors.
macro_rules! impl_plane {
    ($name:ident, $elem:ty) => {
        impl $name {
            /// Width in pixels.
            #[inline]
            pub fn width(&self) -> u32 {
                self.width
            }

            /// Height in pixels.
            #[inline]
            pub fn height(&self) -> u32 {
                self.height
            }

            /// Pixel array, row-major.
            #[inline]
            pub fn pixels(&self) -> &[$elem] {
                &self.pixels
            }

            /// Mutable pixel array, row-major.
            #[inline]
            pub fn pixels_mut(&mut self) -> &mut [$elem] {
                &mut self.pixels
            }

            /// Give up the processor and keep its pixel array.
            #[inline]
            pub fn into_pixels(self) -> Vec<$elem> {
                self.pixels
            }

            /// Pixel at `(x, y)`, or `None` outside the image.
            #[inline]
            pub fn get(&self, x: u32, y: u32) -> Option<$elem> {
                if x >= self.width || y >= self.height {
                    return None;
                }
                Some(self.pixels[y as usize * self.width as usize + x as usize])
            }

            /// Set the pixel at `(x, y)`.
            ///
            /// # Errors
            ///
            /// Returns [`Error::IndexOutOfBounds`](crate::Error::IndexOutOfBounds)
            /// outside the image.
            pub fn set(&mut self, x: u32, y: u32, value: $elem) -> crate::Result<()> {
                if x >= self.width || y >= self.height {
                    let (index, len) = if x >= self.width {
                        (x as usize, self.width as usize)
                    } else {
                        (y as usize, self.height as usize)
                    };
                    return Err(crate::Error::IndexOutOfBounds { index, len });
                }
                self.pixels[y as usize * self.width as usize + x as usize] = value;
                Ok(())
            }
        }
    };
}

pub(crate) use impl_plane;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_depth() {
        let byte = Processor::from(ByteProcessor::new(4, 3).unwrap());
        assert_eq!(byte.kind(), ProcessorKind::Byte);
        assert_eq!(byte.bit_depth(), 8);
        assert_eq!((byte.width(), byte.height()), (4, 3));

        let rgb = Processor::from(ColorProcessor::new(2, 2).unwrap());
        assert_eq!(rgb.bit_depth(), 24);
        assert_eq!(ProcessorKind::Binary.bit_depth(), 1);
    }

    #[test]
    fn test_check_plane() {
        assert!(check_plane(3, 2, 6).is_ok());
        assert!(matches!(
            check_plane(3, 2, 5),
            Err(Error::BufferLength {
                expected: 6,
                actual: 5
            })
        ));
        assert!(matches!(
            check_plane(0, 2, 0),
            Err(Error::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_value_and_duplicate() {
        let mut p = ShortProcessor::new(2, 2).unwrap();
        p.set(1, 1, 4000).unwrap();
        let proc = Processor::from(p);
        let copy = proc.duplicate();
        assert_eq!(copy.value(1, 1), Some(4000.0));
        assert_eq!(copy.value(2, 0), None);
        assert_eq!(proc, copy);
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut p = ByteProcessor::new(2, 2).unwrap();
        assert!(p.set(2, 0, 1).is_err());
        assert!(p.set(0, 5, 1).is_err());
    }
}
