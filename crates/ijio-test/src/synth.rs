//! Synthetic test images
//!
//! Small deterministic images standing in for on-disk test data. Each one
//! exercises the full value range of its kind.

use ijio_core::{
    BinaryProcessor, ByteProcessor, ColorProcessor, FloatProcessor, Processor, ShortProcessor,
    pack_rgb,
};

/// 8-bit horizontal gradient from 0 to 255.
pub fn gradient_byte(width: u32, height: u32) -> Processor {
    let span = width.saturating_sub(1).max(1);
    let pixels = (0..height)
        .flat_map(|_| (0..width).map(move |x| (x * 255 / span) as u8))
        .collect();
    plane(ByteProcessor::from_pixels(width, height, pixels))
}

/// 16-bit ramp over rows and columns covering 0..=65535.
pub fn ramp_short(width: u32, height: u32) -> Processor {
    let n = (width as u64 * height as u64).saturating_sub(1).max(1);
    let pixels = (0..width as u64 * height as u64)
        .map(|i| (i * 65535 / n) as u16)
        .collect();
    plane(ShortProcessor::from_pixels(width, height, pixels))
}

/// Float ramp from `-1.0` to `1.0` with one NaN in the first pixel when
/// `with_nan` is set.
pub fn ramp_float(width: u32, height: u32, with_nan: bool) -> Processor {
    let n = (width as usize * height as usize).saturating_sub(1).max(1);
    let mut pixels: Vec<f32> = (0..width as usize * height as usize)
        .map(|i| -1.0 + 2.0 * i as f32 / n as f32)
        .collect();
    if with_nan && let Some(first) = pixels.first_mut() {
        *first = f32::NAN;
    }
    plane(FloatProcessor::from_pixels(width, height, pixels))
}

/// Vertical color bars: red, green, blue, white, black, repeating.
pub fn color_bars(width: u32, height: u32) -> Processor {
    const BARS: [(u8, u8, u8); 5] = [(255, 0, 0), (0, 255, 0), (0, 0, 255), (255, 255, 255), (0, 0, 0)];
    let bar_width = (width / BARS.len() as u32).max(1);
    let pixels = (0..height)
        .flat_map(|_| {
            (0..width).map(move |x| {
                let (r, g, b) = BARS[(x / bar_width) as usize % BARS.len()];
                pack_rgb(r, g, b)
            })
        })
        .collect();
    plane(ColorProcessor::from_pixels(width, height, pixels))
}

/// Binary checkerboard with `cell`-pixel squares, foreground first.
pub fn checkerboard_binary(width: u32, height: u32, cell: u32) -> Processor {
    let cell = cell.max(1);
    let pixels = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| if ((x / cell) + (y / cell)) % 2 == 0 { 255 } else { 0 })
        })
        .collect();
    plane(BinaryProcessor::from_pixels(width, height, pixels))
}

fn plane<P: Into<Processor>>(p: ijio_core::Result<P>) -> Processor {
    match p {
        Ok(p) => p.into(),
        Err(e) => panic!("synthetic image: {e}"),
    }
}
