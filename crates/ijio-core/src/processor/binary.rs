//! Binary plane
//!
//! A two-level image kept one byte per pixel. Foreground pixels are 255,
//! background pixels 0. The `inverted` flag records a lookup table that
//! shows 0 as white, which is how files storing "1 = black" come in.

use super::{check_plane, impl_plane};
use crate::error::{Error, Result};

/// Binary plane, every pixel 0 or 255.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryProcessor {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    inverted: bool,
}

impl_plane!(BinaryProcessor, u8);

impl BinaryProcessor {
    /// Create an all-background plane.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::from_pixels(width, height, vec![0; width as usize * height as usize])
    }

    /// Wrap an existing pixel array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if any pixel is not 0 or 255.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        check_plane(width, height, pixels.len())?;
        if let Some(pos) = pixels.iter().position(|&v| v != 0 && v != 255) {
            return Err(Error::InvalidParameter(format!(
                "binary pixel {} has value {}; only 0 and 255 are allowed",
                pos, pixels[pos]
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            inverted: false,
        })
    }

    /// Whether 0 displays as white.
    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Set whether 0 displays as white.
    pub fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    /// Builder form of [`BinaryProcessor::set_inverted`].
    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// Number of foreground (255) pixels.
    pub fn foreground_count(&self) -> usize {
        self.pixels.iter().filter(|&&v| v != 0).count()
    }
}
