//! Palette - Indexed color model
//!
//! A palette maps the sample values of 1, 2, 4 and 8 bit images to
//! RGBA colors. Byte processors carry one when they display through a
//! lookup table, and packed binary rasters always carry a two-entry one.

use crate::error::{Error, Result};

/// RGBA palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaletteColor {
    /// Red component
    pub red: u8,
    /// Green component
    pub green: u8,
    /// Blue component
    pub blue: u8,
    /// Alpha component
    pub alpha: u8,
}

impl PaletteColor {
    /// Create a new RGBA color
    pub fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Create an opaque RGB color
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red, green, blue, 255)
    }

    /// Create an opaque gray color
    pub fn gray(value: u8) -> Self {
        Self::rgb(value, value, value)
    }

    /// Pack as `0xAARRGGBB`.
    pub fn argb(self) -> u32 {
        ((self.alpha as u32) << 24)
            | ((self.red as u32) << 16)
            | ((self.green as u32) << 8)
            | self.blue as u32
    }

    fn is_gray(self) -> bool {
        self.red == self.green && self.green == self.blue
    }
}

/// Indexed color model for 1, 2, 4 and 8 bit samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<PaletteColor>,
    bits: u32,
}

impl Palette {
    /// Create an empty palette for the given sample size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `bits` is 1, 2, 4 or 8.
    pub fn new(bits: u32) -> Result<Self> {
        if !matches!(bits, 1 | 2 | 4 | 8) {
            return Err(Error::InvalidParameter(format!(
                "palette sample size must be 1, 2, 4 or 8 bits; got {bits}"
            )));
        }
        Ok(Self {
            colors: Vec::with_capacity(1 << bits),
            bits,
        })
    }

    /// 256-entry grayscale ramp, entry `i` is `(i, i, i)`.
    pub fn gray_ramp() -> Self {
        Self {
            colors: (0..=255u8).map(PaletteColor::gray).collect(),
            bits: 8,
        }
    }

    /// 256-entry inverted ramp, entry `i` is `(255 - i, 255 - i, 255 - i)`.
    pub fn inverted_gray_ramp() -> Self {
        Self {
            colors: (0..=255u8).map(|i| PaletteColor::gray(255 - i)).collect(),
            bits: 8,
        }
    }

    /// Two-entry palette for packed binary rasters.
    ///
    /// Index 0 is black and index 1 white, swapped when `inverted`.
    pub fn binary(inverted: bool) -> Self {
        let (zero, one) = if inverted { (255, 0) } else { (0, 255) };
        Self {
            colors: vec![PaletteColor::gray(zero), PaletteColor::gray(one)],
            bits: 1,
        }
    }

    /// Build a palette from separate red, green and blue planes.
    ///
    /// The sample size is the smallest of 1, 2, 4, 8 bits that indexes
    /// every entry.
    pub fn from_rgb_planes(reds: &[u8], greens: &[u8], blues: &[u8]) -> Result<Self> {
        let len = reds.len();
        if greens.len() != len || blues.len() != len {
            return Err(Error::InvalidParameter(format!(
                "palette planes differ in length: {}/{}/{}",
                len,
                greens.len(),
                blues.len()
            )));
        }
        if len == 0 || len > 256 {
            return Err(Error::InvalidParameter(format!(
                "palette must hold 1..=256 entries; got {len}"
            )));
        }
        let bits = match len {
            0..=2 => 1,
            3..=4 => 2,
            5..=16 => 4,
            _ => 8,
        };
        let colors = reds
            .iter()
            .zip(greens)
            .zip(blues)
            .map(|((&r, &g), &b)| PaletteColor::rgb(r, g, b))
            .collect();
        Ok(Self { colors, bits })
    }

    /// Sample size in bits this palette indexes.
    #[inline]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Maximum number of entries for the sample size.
    #[inline]
    pub fn max_entries(&self) -> usize {
        1 << self.bits
    }

    /// Get a color by index
    pub fn get(&self, index: usize) -> Option<&PaletteColor> {
        self.colors.get(index)
    }

    /// Get RGB values at index
    pub fn get_rgb(&self, index: usize) -> Option<(u8, u8, u8)> {
        self.colors.get(index).map(|c| (c.red, c.green, c.blue))
    }

    /// Append an opaque RGB color, returning its index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] when the palette is full.
    pub fn add_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<usize> {
        if self.colors.len() >= self.max_entries() {
            return Err(Error::IndexOutOfBounds {
                index: self.colors.len(),
                len: self.max_entries(),
            });
        }
        self.colors.push(PaletteColor::rgb(r, g, b));
        Ok(self.colors.len() - 1)
    }

    /// Packed `0xAARRGGBB` color for a sample value.
    ///
    /// Indices past the last entry map to opaque black.
    pub fn rgb(&self, index: usize) -> u32 {
        self.colors
            .get(index)
            .map_or(0xff00_0000, |c| c.argb())
    }

    /// All entries as a slice
    pub fn colors(&self) -> &[PaletteColor] {
        &self.colors
    }

    /// Red plane
    pub fn reds(&self) -> Vec<u8> {
        self.colors.iter().map(|c| c.red).collect()
    }

    /// Green plane
    pub fn greens(&self) -> Vec<u8> {
        self.colors.iter().map(|c| c.green).collect()
    }

    /// Blue plane
    pub fn blues(&self) -> Vec<u8> {
        self.colors.iter().map(|c| c.blue).collect()
    }

    /// Check if every entry is a shade of gray
    pub fn is_grayscale(&self) -> bool {
        self.colors.iter().all(|c| c.is_gray())
    }

    /// Check if this is exactly the 256-entry ramp from [`Palette::gray_ramp`].
    pub fn is_gray_ramp(&self) -> bool {
        self.colors.len() == 256
            && self
                .colors
                .iter()
                .enumerate()
                .all(|(i, c)| c.is_gray() && c.red as usize == i)
    }

    /// Check if this is the 256-entry ramp from [`Palette::inverted_gray_ramp`].
    pub fn is_inverted_gray_ramp(&self) -> bool {
        self.colors.len() == 256
            && self
                .colors
                .iter()
                .enumerate()
                .all(|(i, c)| c.is_gray() && c.red as usize == 255 - i)
    }

    /// Check if this is a two-entry black/white palette, in either order.
    pub fn is_binary(&self) -> bool {
        self.colors.len() == 2
            && self.is_grayscale()
            && matches!(
                (self.colors[0].red, self.colors[1].red),
                (0, 255) | (255, 0)
            )
    }

    /// Check if this is a binary palette whose index 0 is white.
    pub fn is_inverted_binary(&self) -> bool {
        self.is_binary() && self.colors[0].red == 255
    }
}
