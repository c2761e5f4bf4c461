//! Color models - from raw samples to displayable colors
//!
//! | model                        | samples                 | used for                    |
//! |------------------------------|-------------------------|-----------------------------|
//! | [`ColorModel::Indexed`]      | one index per pixel     | 8-bit indexed and sub-byte  |
//! | [`ColorModel::Component`]    | integer components      | gray 8/16-bit, RGB, RGBA    |
//! | [`ColorModel::FloatDouble`]  | float or double         | 32-bit float gray planes    |
//!
//! Every model answers [`ColorModel::rgb`] with a packed `0xAARRGGBB`
//! value.

mod float_double;

pub use float_double::{Channel, FloatDoubleColorModel, RgbLut};

use crate::error::{Error, Result};
use crate::palette::Palette;

/// Color space of the non-alpha components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Single gray component
    Gray,
    /// Gamma-encoded sRGB
    Srgb,
    /// Linear-light RGB with sRGB primaries
    LinearRgb,
}

impl ColorSpace {
    /// Number of color components (alpha excluded).
    pub fn num_components(self) -> usize {
        match self {
            ColorSpace::Gray => 1,
            ColorSpace::Srgb | ColorSpace::LinearRgb => 3,
        }
    }

    /// Convert normalized components to normalized sRGB.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when `components` is shorter
    /// than [`ColorSpace::num_components`].
    pub fn to_srgb(self, components: &[f64]) -> Result<[f64; 3]> {
        check_components(components, self.num_components())?;
        Ok(match self {
            ColorSpace::Gray => {
                let v = components[0];
                [v, v, v]
            }
            ColorSpace::Srgb => [components[0], components[1], components[2]],
            ColorSpace::LinearRgb => [
                linear_to_srgb(components[0]),
                linear_to_srgb(components[1]),
                linear_to_srgb(components[2]),
            ],
        })
    }

    /// Convert normalized sRGB to normalized components of this space.
    pub fn from_srgb(self, rgb: [f64; 3]) -> Vec<f64> {
        match self {
            ColorSpace::Gray => vec![0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]],
            ColorSpace::Srgb => rgb.to_vec(),
            ColorSpace::LinearRgb => rgb.iter().map(|&v| srgb_to_linear(v)).collect(),
        }
    }
}

fn linear_to_srgb(v: f64) -> f64 {
    if v <= 0.003_130_8 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn srgb_to_linear(v: f64) -> f64 {
    if v <= 0.040_45 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// How a color model handles transparency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transparency {
    /// Every pixel fully opaque
    #[default]
    Opaque,
    /// Pixels are either opaque or fully transparent
    Bitmask,
    /// Arbitrary alpha
    Translucent,
}

/// Integer component color model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentColorModel {
    space: ColorSpace,
    has_alpha: bool,
    premultiplied: bool,
    bits: u32,
}

impl ComponentColorModel {
    /// Create a component model with `bits` per component.
    pub fn new(space: ColorSpace, has_alpha: bool, premultiplied: bool, bits: u32) -> Self {
        Self {
            space,
            has_alpha,
            premultiplied,
            bits,
        }
    }

    /// Opaque gray with `bits` per sample.
    pub fn gray(bits: u32) -> Self {
        Self::new(ColorSpace::Gray, false, false, bits)
    }

    /// Opaque sRGB with `bits` per component.
    pub fn srgb(bits: u32) -> Self {
        Self::new(ColorSpace::Srgb, false, false, bits)
    }

    /// Color space
    pub fn space(&self) -> ColorSpace {
        self.space
    }

    /// Whether an alpha component follows the color components.
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Whether color components are stored multiplied by alpha.
    pub fn is_premultiplied(&self) -> bool {
        self.premultiplied
    }

    /// Bits per component
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Components per pixel, alpha included.
    pub fn num_components(&self) -> usize {
        self.space.num_components() + usize::from(self.has_alpha)
    }

    fn max_value(&self) -> f64 {
        ((1u64 << self.bits.min(32)) - 1) as f64
    }

    fn rgb(&self, samples: &[f64]) -> Result<u32> {
        check_components(samples, self.num_components())?;
        let max = self.max_value();
        let n = self.space.num_components();
        let alpha = if self.has_alpha {
            samples[n] / max
        } else {
            1.0
        };
        let mut normalized: Vec<f64> = samples[..n].iter().map(|&v| v / max).collect();
        if self.premultiplied {
            for v in &mut normalized {
                *v = if alpha == 0.0 { 0.0 } else { *v / alpha };
            }
        }
        let [r, g, b] = self.space.to_srgb(&normalized)?;
        Ok(pack_argb(unit_to_byte(alpha), unit_to_byte(r), unit_to_byte(g), unit_to_byte(b)))
    }
}

/// Interpretation of raster samples as colors.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorModel {
    /// Palette lookup on a single index sample
    Indexed(Palette),
    /// Integer components
    Component(ComponentColorModel),
    /// Float or double components
    FloatDouble(FloatDoubleColorModel),
}

impl ColorModel {
    /// Components per pixel the model reads.
    pub fn num_components(&self) -> usize {
        match self {
            ColorModel::Indexed(_) => 1,
            ColorModel::Component(cm) => cm.num_components(),
            ColorModel::FloatDouble(cm) => cm.num_components(),
        }
    }

    /// Check if this is a palette model.
    pub fn is_indexed(&self) -> bool {
        matches!(self, ColorModel::Indexed(_))
    }

    /// Palette of an indexed model.
    pub fn palette(&self) -> Option<&Palette> {
        match self {
            ColorModel::Indexed(p) => Some(p),
            _ => None,
        }
    }

    /// Packed `0xAARRGGBB` for one pixel's samples.
    pub fn rgb(&self, samples: &[f64]) -> Result<u32> {
        match self {
            ColorModel::Indexed(palette) => {
                check_components(samples, 1)?;
                let index = if samples[0].is_nan() || samples[0] < 0.0 {
                    0
                } else {
                    samples[0] as usize
                };
                Ok(palette.rgb(index))
            }
            ColorModel::Component(cm) => cm.rgb(samples),
            ColorModel::FloatDouble(cm) => cm.argb(samples),
        }
    }
}

pub(crate) fn check_components(samples: &[f64], needed: usize) -> Result<()> {
    if samples.len() < needed {
        return Err(Error::InvalidParameter(format!(
            "color model needs {needed} component(s), got {}",
            samples.len()
        )));
    }
    Ok(())
}

/// Scale a normalized value to a byte; NaN maps to 0.
pub(crate) fn unit_to_byte(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

pub(crate) fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_gray16() {
        let cm = ColorModel::Component(ComponentColorModel::gray(16));
        assert_eq!(cm.rgb(&[65535.0]).unwrap(), 0xffff_ffff);
        assert_eq!(cm.rgb(&[0.0]).unwrap(), 0xff00_0000);
        assert!(cm.rgb(&[]).is_err());
    }

    #[test]
    fn test_component_rgba_premultiplied() {
        let cm = ComponentColorModel::new(ColorSpace::Srgb, true, true, 8);
        let argb = ColorModel::Component(cm)
            .rgb(&[50.0, 0.0, 0.0, 127.5])
            .unwrap();
        assert_eq!(argb >> 24, 128);
        assert_eq!((argb >> 16) & 0xff, 100);
    }

    #[test]
    fn test_indexed_lookup() {
        let cm = ColorModel::Indexed(Palette::binary(true));
        assert_eq!(cm.rgb(&[0.0]).unwrap(), 0xffff_ffff);
        assert!(cm.is_indexed());
        assert!(cm.palette().is_some());
    }

    #[test]
    fn test_linear_rgb_roundtrip() {
        let lin = ColorSpace::LinearRgb.from_srgb([0.5, 0.2, 0.9]);
        let back = ColorSpace::LinearRgb.to_srgb(&lin).unwrap();
        for (a, b) in back.iter().zip([0.5, 0.2, 0.9]) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_to_srgb_short_slice() {
        assert!(matches!(
            ColorSpace::Srgb.to_srgb(&[0.1, 0.2]),
            Err(Error::InvalidParameter(_))
        ));
        assert!(ColorSpace::Gray.to_srgb(&[]).is_err());
        assert_eq!(ColorSpace::Gray.to_srgb(&[0.25]).unwrap(), [0.25; 3]);
    }

    #[test]
    fn test_unit_to_byte() {
        assert_eq!(unit_to_byte(f64::NAN), 0);
        assert_eq!(unit_to_byte(-3.0), 0);
        assert_eq!(unit_to_byte(7.0), 255);
        assert_eq!(unit_to_byte(1.0), 255);
    }
}
