//! Gray processors: 8-bit, 16-bit and 32-bit float planes

use super::{check_plane, impl_plane};
use crate::color_model::FloatDoubleColorModel;
use crate::error::Result;
use crate::palette::Palette;

/// 8-bit gray or indexed-color plane.
///
/// With a palette the pixel values are palette indices; without one they
/// display as a linear gray ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct ByteProcessor {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    palette: Option<Palette>,
}

impl_plane!(ByteProcessor, u8);

impl ByteProcessor {
    /// Create a zero-filled plane.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::from_pixels(width, height, vec![0; width as usize * height as usize])
    }

    /// Wrap an existing pixel array without copying it.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        check_plane(width, height, pixels.len())?;
        Ok(Self {
            width,
            height,
            pixels,
            palette: None,
        })
    }

    /// Palette, if the plane displays through one.
    #[inline]
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Replace the palette.
    pub fn set_palette(&mut self, palette: Option<Palette>) {
        self.palette = palette;
    }

    /// Builder form of [`ByteProcessor::set_palette`].
    pub fn with_palette(mut self, palette: Option<Palette>) -> Self {
        self.palette = palette;
        self
    }

    /// Check if every pixel is either 0 or 255.
    pub fn is_binary(&self) -> bool {
        self.pixels.iter().all(|&v| v == 0 || v == 255)
    }
}

/// 16-bit unsigned gray plane.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortProcessor {
    width: u32,
    height: u32,
    pixels: Vec<u16>,
    display_range: Option<(f64, f64)>,
}

impl_plane!(ShortProcessor, u16);

impl ShortProcessor {
    /// Create a zero-filled plane.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::from_pixels(width, height, vec![0; width as usize * height as usize])
    }

    /// Wrap an existing pixel array without copying it.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u16>) -> Result<Self> {
        check_plane(width, height, pixels.len())?;
        Ok(Self {
            width,
            height,
            pixels,
            display_range: None,
        })
    }

    /// Display range `(min, max)`, if one has been set.
    #[inline]
    pub fn display_range(&self) -> Option<(f64, f64)> {
        self.display_range
    }

    /// Set the display range.
    pub fn set_display_range(&mut self, min: f64, max: f64) {
        self.display_range = Some((min, max));
    }
}

/// 32-bit float gray plane.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatProcessor {
    width: u32,
    height: u32,
    pixels: Vec<f32>,
    display_range: Option<(f64, f64)>,
    color_model: Option<FloatDoubleColorModel>,
}

impl_plane!(FloatProcessor, f32);

impl FloatProcessor {
    /// Create a zero-filled plane.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::from_pixels(width, height, vec![0.0; width as usize * height as usize])
    }

    /// Wrap an existing pixel array without copying it.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<f32>) -> Result<Self> {
        check_plane(width, height, pixels.len())?;
        Ok(Self {
            width,
            height,
            pixels,
            display_range: None,
            color_model: None,
        })
    }

    /// Display range `(min, max)`, if one has been set.
    #[inline]
    pub fn display_range(&self) -> Option<(f64, f64)> {
        self.display_range
    }

    /// Set the display range.
    pub fn set_display_range(&mut self, min: f64, max: f64) {
        self.display_range = Some((min, max));
    }

    /// Float color model used for display, if attached.
    #[inline]
    pub fn color_model(&self) -> Option<&FloatDoubleColorModel> {
        self.color_model.as_ref()
    }

    /// Attach or remove the float color model.
    pub fn set_color_model(&mut self, color_model: Option<FloatDoubleColorModel>) {
        self.color_model = color_model;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_from_pixels_shares_allocation() {
        let data = vec![1u8, 2, 3, 4, 5, 6];
        let ptr = data.as_ptr();
        let bp = ByteProcessor::from_pixels(3, 2, data).unwrap();
        assert_eq!(bp.pixels().as_ptr(), ptr);
        assert_eq!(bp.get(2, 1), Some(6));
    }

    #[test]
    fn test_byte_is_binary() {
        let bp = ByteProcessor::from_pixels(2, 2, vec![0, 255, 255, 0]).unwrap();
        assert!(bp.is_binary());
        let bp = ByteProcessor::from_pixels(2, 2, vec![0, 254, 255, 0]).unwrap();
        assert!(!bp.is_binary());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(ShortProcessor::from_pixels(2, 2, vec![0; 3]).is_err());
        assert!(FloatProcessor::from_pixels(2, 2, vec![0.0; 5]).is_err());
    }

    #[test]
    fn test_display_range() {
        let mut sp = ShortProcessor::new(1, 1).unwrap();
        assert_eq!(sp.display_range(), None);
        sp.set_display_range(10.0, 20.0);
        assert_eq!(sp.display_range(), Some((10.0, 20.0)));
    }
}
