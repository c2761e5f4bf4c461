//! Pixel statistics and display-range reset

use super::{ByteProcessor, FloatProcessor, Processor, ShortProcessor};

impl ByteProcessor {
    /// Smallest and largest pixel value.
    pub fn find_min_and_max(&self) -> (u8, u8) {
        min_max_ord(self.pixels())
    }
}

impl ShortProcessor {
    /// Smallest and largest pixel value.
    pub fn find_min_and_max(&self) -> (u16, u16) {
        min_max_ord(self.pixels())
    }

    /// Set the display range to the pixel minimum and maximum.
    pub fn reset_display_range(&mut self) {
        let (min, max) = self.find_min_and_max();
        self.set_display_range(min as f64, max as f64);
    }
}

impl FloatProcessor {
    /// Smallest and largest finite-or-infinite pixel value, ignoring NaN.
    ///
    /// An all-NaN plane reports `(0.0, 0.0)`.
    pub fn find_min_and_max(&self) -> (f32, f32) {
        let mut iter = self.pixels().iter().copied().filter(|v| !v.is_nan());
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }

    /// Set the display range to the pixel minimum and maximum.
    pub fn reset_display_range(&mut self) {
        let (min, max) = self.find_min_and_max();
        self.set_display_range(min as f64, max as f64);
    }
}

impl Processor {
    /// Smallest and largest pixel value as `f64`.
    ///
    /// RGB planes report the range over all three channels.
    pub fn find_min_and_max(&self) -> (f64, f64) {
        match self {
            Processor::Byte(p) => {
                let (lo, hi) = p.find_min_and_max();
                (lo as f64, hi as f64)
            }
            Processor::Short(p) => {
                let (lo, hi) = p.find_min_and_max();
                (lo as f64, hi as f64)
            }
            Processor::Float(p) => {
                let (lo, hi) = p.find_min_and_max();
                (lo as f64, hi as f64)
            }
            Processor::Rgb(p) => {
                let channels: Vec<u8> = p
                    .pixels()
                    .iter()
                    .flat_map(|&v| [(v >> 16) as u8, (v >> 8) as u8, v as u8])
                    .collect();
                let (lo, hi) = min_max_ord(&channels);
                (lo as f64, hi as f64)
            }
            Processor::Binary(p) => {
                let (lo, hi) = min_max_ord(p.pixels());
                (lo as f64, hi as f64)
            }
        }
    }

    /// Display range, if the variant keeps one.
    pub fn display_range(&self) -> Option<(f64, f64)> {
        match self {
            Processor::Short(p) => p.display_range(),
            Processor::Float(p) => p.display_range(),
            Processor::Byte(_) | Processor::Rgb(_) | Processor::Binary(_) => None,
        }
    }

    /// Set the display range on variants that keep one.
    ///
    /// 8-bit, RGB and binary planes always display over `0..=255`, so the
    /// call has no effect on them.
    pub fn set_display_range(&mut self, min: f64, max: f64) {
        match self {
            Processor::Short(p) => p.set_display_range(min, max),
            Processor::Float(p) => p.set_display_range(min, max),
            Processor::Byte(_) | Processor::Rgb(_) | Processor::Binary(_) => {}
        }
    }

    /// Recompute the display range from the pixel statistics.
    pub fn reset_display_range(&mut self) {
        match self {
            Processor::Short(p) => p.reset_display_range(),
            Processor::Float(p) => p.reset_display_range(),
            Processor::Byte(_) | Processor::Rgb(_) | Processor::Binary(_) => {}
        }
    }
}

fn min_max_ord<T: Copy + Ord + Default>(values: &[T]) -> (T, T) {
    let lo = values.iter().copied().min().unwrap_or_default();
    let hi = values.iter().copied().max().unwrap_or_default();
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::ColorProcessor;

    #[test]
    fn test_short_reset_display_range() {
        let mut sp = ShortProcessor::from_pixels(3, 1, vec![500, 12, 4000]).unwrap();
        sp.reset_display_range();
        assert_eq!(sp.display_range(), Some((12.0, 4000.0)));
    }

    #[test]
    fn test_float_min_max_skips_nan() {
        let fp = FloatProcessor::from_pixels(4, 1, vec![f32::NAN, -2.5, 7.0, f32::NAN]).unwrap();
        assert_eq!(fp.find_min_and_max(), (-2.5, 7.0));

        let all_nan = FloatProcessor::from_pixels(2, 1, vec![f32::NAN; 2]).unwrap();
        assert_eq!(all_nan.find_min_and_max(), (0.0, 0.0));
    }

    #[test]
    fn test_rgb_min_max_over_channels() {
        let mut cp = ColorProcessor::new(2, 1).unwrap();
        cp.set_rgb(0, 0, 10, 20, 30).unwrap();
        cp.set_rgb(1, 0, 40, 250, 35).unwrap();
        assert_eq!(Processor::from(cp).find_min_and_max(), (10.0, 250.0));
    }

    #[test]
    fn test_byte_ignores_display_range() {
        let mut p = Processor::from(ByteProcessor::new(1, 1).unwrap());
        p.set_display_range(5.0, 9.0);
        assert_eq!(p.display_range(), None);
    }
}
