//! Color model for float and double samples
//!
//! Samples are stretched linearly between a black and a white point,
//! scaled to `0..=255`, clamped (NaN becomes 0) and then optionally passed
//! through a 256-entry RGB lookup table.

use super::{ColorSpace, Transparency, check_components, pack_argb, unit_to_byte};
use crate::error::{Error, Result};
use crate::raster::{Raster, SampleType};

/// 256-entry display lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbLut {
    /// Red output per input level
    pub reds: [u8; 256],
    /// Green output per input level
    pub greens: [u8; 256],
    /// Blue output per input level
    pub blues: [u8; 256],
}

impl RgbLut {
    /// Identity gray table.
    pub fn gray() -> Self {
        let mut ramp = [0u8; 256];
        for (i, v) in ramp.iter_mut().enumerate() {
            *v = i as u8;
        }
        Self {
            reds: ramp,
            greens: ramp,
            blues: ramp,
        }
    }

    /// Build from three table slices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless every slice has 256 entries.
    pub fn from_slices(reds: &[u8], greens: &[u8], blues: &[u8]) -> Result<Self> {
        let table = |s: &[u8]| -> Result<[u8; 256]> {
            s.try_into().map_err(|_| {
                Error::InvalidParameter(format!("lookup table needs 256 entries, got {}", s.len()))
            })
        };
        Ok(Self {
            reds: table(reds)?,
            greens: table(greens)?,
            blues: table(blues)?,
        })
    }
}

/// One output channel of a color model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red
    Red,
    /// Green
    Green,
    /// Blue
    Blue,
    /// Alpha
    Alpha,
}

/// Color model over float or double samples.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatDoubleColorModel {
    space: ColorSpace,
    has_alpha: bool,
    premultiplied: bool,
    transparency: Transparency,
    sample_type: SampleType,
    black: f64,
    white: f64,
    lut: Option<RgbLut>,
}

impl FloatDoubleColorModel {
    /// Create a model with black point 0 and white point 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSampleType`] unless `sample_type` is
    /// [`SampleType::Float`] or [`SampleType::Double`].
    pub fn new(
        space: ColorSpace,
        has_alpha: bool,
        premultiplied: bool,
        transparency: Transparency,
        sample_type: SampleType,
    ) -> Result<Self> {
        if !sample_type.is_floating() {
            return Err(Error::UnsupportedSampleType(format!(
                "float/double color model cannot hold {sample_type:?} samples"
            )));
        }
        Ok(Self {
            space,
            has_alpha,
            premultiplied,
            transparency,
            sample_type,
            black: 0.0,
            white: 1.0,
            lut: None,
        })
    }

    /// Opaque gray model over `f32` samples.
    pub fn gray_float() -> Self {
        Self {
            space: ColorSpace::Gray,
            has_alpha: false,
            premultiplied: false,
            transparency: Transparency::Opaque,
            sample_type: SampleType::Float,
            black: 0.0,
            white: 1.0,
            lut: None,
        }
    }

    /// Color space
    pub fn space(&self) -> ColorSpace {
        self.space
    }

    /// Whether an alpha sample follows the color samples.
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Whether color samples are stored multiplied by alpha.
    pub fn is_premultiplied(&self) -> bool {
        self.premultiplied
    }

    /// Transparency mode
    pub fn transparency(&self) -> Transparency {
        self.transparency
    }

    /// Element type of the samples.
    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    /// Samples per pixel, alpha included.
    pub fn num_components(&self) -> usize {
        self.space.num_components() + usize::from(self.has_alpha)
    }

    /// `(black, white)` stretch points
    pub fn black_white(&self) -> (f64, f64) {
        (self.black, self.white)
    }

    /// Set the stretch points.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when either point is not finite
    /// or when `white == black`.
    pub fn set_black_white(&mut self, black: f64, white: f64) -> Result<()> {
        if !black.is_finite() || !white.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "black/white points must be finite: {black}/{white}"
            )));
        }
        if white == black {
            return Err(Error::InvalidParameter(format!(
                "white point equals black point ({black})"
            )));
        }
        self.black = black;
        self.white = white;
        Ok(())
    }

    /// Display lookup table, if installed.
    pub fn lut(&self) -> Option<&RgbLut> {
        self.lut.as_ref()
    }

    /// Install or remove the display lookup table.
    pub fn set_lut(&mut self, lut: Option<RgbLut>) {
        self.lut = lut;
    }

    /// Channel of a single packed-int pixel.
    ///
    /// Float samples have no single-int pixel form, so this always fails.
    pub fn channel_of_int(&self, _pixel: u32, channel: Channel) -> Result<u8> {
        Err(Error::NotSupported(format!(
            "{channel:?} of an int pixel: float/double samples need the array form"
        )))
    }

    /// Red component of one pixel's samples.
    pub fn red(&self, samples: &[f64]) -> Result<u8> {
        self.channel(samples, Channel::Red)
    }

    /// Green component of one pixel's samples.
    pub fn green(&self, samples: &[f64]) -> Result<u8> {
        self.channel(samples, Channel::Green)
    }

    /// Blue component of one pixel's samples.
    pub fn blue(&self, samples: &[f64]) -> Result<u8> {
        self.channel(samples, Channel::Blue)
    }

    /// Alpha of one pixel's samples, 255 without an alpha sample.
    pub fn alpha(&self, samples: &[f64]) -> Result<u8> {
        self.channel(samples, Channel::Alpha)
    }

    /// Packed `0xAARRGGBB` for one pixel's samples.
    pub fn argb(&self, samples: &[f64]) -> Result<u32> {
        Ok(pack_argb(
            self.alpha(samples)?,
            self.red(samples)?,
            self.green(samples)?,
            self.blue(samples)?,
        ))
    }

    fn channel(&self, samples: &[f64], channel: Channel) -> Result<u8> {
        check_components(samples, self.num_components())?;
        let n = self.space.num_components();
        let lut = self.lut.as_ref();
        let (index, table) = match channel {
            Channel::Red => (0, lut.map(|l| &l.reds)),
            Channel::Green => (1, lut.map(|l| &l.greens)),
            Channel::Blue => (2, lut.map(|l| &l.blues)),
            Channel::Alpha if self.has_alpha => return Ok(unit_to_byte(samples[n])),
            Channel::Alpha => return Ok(255),
        };

        let mut colors = samples[..n].to_vec();
        if self.has_alpha && self.premultiplied {
            let alpha = samples[n];
            if alpha == 0.0 {
                return Ok(0);
            }
            colors.iter_mut().for_each(|v| *v /= alpha);
        }
        let range = self.white - self.black;
        colors
            .iter_mut()
            .for_each(|v| *v = (*v - self.black) / range);

        let level = unit_to_byte(self.space.to_srgb(&colors)?[index]);
        Ok(table.map_or(level, |t| t[level as usize]))
    }

    /// Convert a raster between premultiplied and straight alpha in place.
    ///
    /// Returns the model describing the raster afterwards; when the model
    /// already matches `premultiplied` the raster is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSampleType`] for non-floating rasters.
    pub fn coerce_data(&self, raster: &mut Raster, premultiplied: bool) -> Result<Self> {
        if !self.has_alpha || self.premultiplied == premultiplied {
            return Ok(self.clone());
        }
        if !raster.sample_type().is_floating() {
            return Err(Error::UnsupportedSampleType(format!(
                "cannot coerce {:?} samples with a float/double color model",
                raster.sample_type()
            )));
        }
        let n = self.space.num_components();
        if raster.num_bands() <= n {
            return Err(Error::InvalidParameter(format!(
                "raster has {} band(s), model needs {}",
                raster.num_bands(),
                n + 1
            )));
        }
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                let alpha = raster.sample(x, y, n).unwrap_or(0.0);
                for band in 0..n {
                    let v = raster.sample(x, y, band).unwrap_or(0.0);
                    let coerced = if premultiplied {
                        v * alpha
                    } else if alpha != 0.0 {
                        v / alpha
                    } else {
                        0.0
                    };
                    raster.set_sample(x, y, band, coerced)?;
                }
            }
        }
        let mut coerced = self.clone();
        coerced.premultiplied = premultiplied;
        Ok(coerced)
    }

    /// Samples that display as the packed `0xAARRGGBB` color.
    ///
    /// Gray models use luma weights 0.299/0.587/0.114.
    pub fn data_elements(&self, argb: u32) -> Vec<f64> {
        let channel = |shift: u32| ((argb >> shift) & 0xff) as f64 / 255.0;
        let alpha = channel(24);
        let range = self.white - self.black;
        let mut samples: Vec<f64> = self
            .space
            .from_srgb([channel(16), channel(8), channel(0)])
            .into_iter()
            .map(|v| v * range + self.black)
            .collect();
        if self.has_alpha {
            if self.premultiplied {
                samples.iter_mut().for_each(|v| *v *= alpha);
            }
            samples.push(alpha);
        }
        samples
    }
}
