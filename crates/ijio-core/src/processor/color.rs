//! Packed RGB plane
//!
//! Pixels are stored as `0xAARRGGBB`, one `u32` per pixel, with alpha
//! always `0xff`.

use super::{check_plane, impl_plane};
use crate::error::Result;

/// Compose an opaque packed pixel.
#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    0xff00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Split a packed pixel into `(r, g, b)`.
#[inline]
pub fn unpack_rgb(pixel: u32) -> (u8, u8, u8) {
    ((pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8)
}

/// 24-bit RGB plane.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorProcessor {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl_plane!(ColorProcessor, u32);

impl ColorProcessor {
    /// Create an all-black plane.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::from_pixels(
            width,
            height,
            vec![pack_rgb(0, 0, 0); width as usize * height as usize],
        )
    }

    /// Wrap an existing packed pixel array without copying it.
    ///
    /// The alpha byte is forced to `0xff`.
    pub fn from_pixels(width: u32, height: u32, mut pixels: Vec<u32>) -> Result<Self> {
        check_plane(width, height, pixels.len())?;
        pixels.iter_mut().for_each(|p| *p |= 0xff00_0000);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from separate red, green and blue planes.
    pub fn from_channels(width: u32, height: u32, r: &[u8], g: &[u8], b: &[u8]) -> Result<Self> {
        check_plane(width, height, r.len())?;
        check_plane(width, height, g.len())?;
        check_plane(width, height, b.len())?;
        let pixels = r
            .iter()
            .zip(g)
            .zip(b)
            .map(|((&r, &g), &b)| pack_rgb(r, g, b))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// `(r, g, b)` at `(x, y)`.
    pub fn get_rgb(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        self.get(x, y).map(unpack_rgb)
    }

    /// Set `(r, g, b)` at `(x, y)`.
    pub fn set_rgb(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) -> Result<()> {
        self.set(x, y, pack_rgb(r, g, b))
    }

    /// Split into red, green and blue planes.
    pub fn channels(&self) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let n = self.pixels.len();
        let (mut r, mut g, mut b) = (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));
        for &p in &self.pixels {
            let (pr, pg, pb) = unpack_rgb(p);
            r.push(pr);
            g.push(pg);
            b.push(pb);
        }
        (r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let p = pack_rgb(10, 20, 30);
        assert_eq!(p, 0xff0a_141e);
        assert_eq!(unpack_rgb(p), (10, 20, 30));
    }

    #[test]
    fn test_from_pixels_forces_alpha() {
        let cp = ColorProcessor::from_pixels(1, 1, vec![0x0012_3456]).unwrap();
        assert_eq!(cp.pixels()[0], 0xff12_3456);
    }

    #[test]
    fn test_channels_roundtrip() {
        let mut cp = ColorProcessor::new(2, 1).unwrap();
        cp.set_rgb(0, 0, 255, 0, 0).unwrap();
        cp.set_rgb(1, 0, 0, 128, 7).unwrap();
        let (r, g, b) = cp.channels();
        let back = ColorProcessor::from_channels(2, 1, &r, &g, &b).unwrap();
        assert_eq!(back, cp);
        assert_eq!(back.get_rgb(1, 0), Some((0, 128, 7)));
    }
}
