//! Sample layouts
//!
//! A sample model says where sample `band` of pixel `(x, y)` lives inside
//! the banks of a [`DataBuffer`](super::DataBuffer).

use super::SampleType;

/// Layout of samples inside a data buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleModel {
    /// One bank, samples of a pixel stored next to each other.
    PixelInterleaved {
        /// Samples per pixel
        bands: usize,
    },
    /// One bank per band.
    Banded {
        /// Samples per pixel, also the bank count
        bands: usize,
    },
    /// One band of 1, 2 or 4 bit samples packed MSB-first into bytes,
    /// each row padded to a whole byte.
    MultiPixelPacked {
        /// Bits per sample
        bits: u32,
    },
}

impl SampleModel {
    /// Number of samples per pixel.
    pub fn num_bands(&self) -> usize {
        match *self {
            SampleModel::PixelInterleaved { bands } | SampleModel::Banded { bands } => bands,
            SampleModel::MultiPixelPacked { .. } => 1,
        }
    }

    /// Number of banks the layout needs.
    pub fn num_banks(&self) -> usize {
        match *self {
            SampleModel::Banded { bands } => bands,
            SampleModel::PixelInterleaved { .. } | SampleModel::MultiPixelPacked { .. } => 1,
        }
    }

    /// Sample size in bits for elements of `sample_type`.
    pub fn sample_size(&self, sample_type: SampleType) -> u32 {
        match *self {
            SampleModel::MultiPixelPacked { bits } => bits,
            _ => sample_type.bits(),
        }
    }

    /// Elements per row of one bank.
    pub fn scanline_stride(&self, width: u32) -> usize {
        match *self {
            SampleModel::PixelInterleaved { bands } => width as usize * bands,
            SampleModel::Banded { .. } => width as usize,
            SampleModel::MultiPixelPacked { bits } => (width as usize * bits as usize).div_ceil(8),
        }
    }

    /// Elements one bank must hold past the buffer offset.
    pub fn required_len(&self, width: u32, height: u32) -> usize {
        self.scanline_stride(width) * height as usize
    }

    /// Bank and element index of a sample, relative to the buffer offset.
    ///
    /// Packed layouts report the byte holding the sample; use
    /// [`SampleModel::bit_shift`] to find it inside that byte.
    pub(crate) fn locate(&self, width: u32, x: u32, y: u32, band: usize) -> (usize, usize) {
        let row = y as usize * self.scanline_stride(width);
        match *self {
            SampleModel::PixelInterleaved { bands } => (0, row + x as usize * bands + band),
            SampleModel::Banded { .. } => (band, row + x as usize),
            SampleModel::MultiPixelPacked { bits } => (0, row + (x as usize * bits as usize) / 8),
        }
    }

    /// Right shift that brings a packed sample down to the low bits.
    pub(crate) fn bit_shift(&self, x: u32) -> u32 {
        match *self {
            SampleModel::MultiPixelPacked { bits } => 8 - bits - (x * bits) % 8,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_stride_rounds_up() {
        let sm = SampleModel::MultiPixelPacked { bits: 1 };
        assert_eq!(sm.scanline_stride(9), 2);
        assert_eq!(sm.scanline_stride(8), 1);
        assert_eq!(sm.required_len(13, 3), 6);
        let sm4 = SampleModel::MultiPixelPacked { bits: 4 };
        assert_eq!(sm4.scanline_stride(3), 2);
    }

    #[test]
    fn test_locate_layouts() {
        let il = SampleModel::PixelInterleaved { bands: 3 };
        assert_eq!(il.locate(4, 1, 1, 2), (0, 12 + 3 + 2));
        let banded = SampleModel::Banded { bands: 3 };
        assert_eq!(banded.locate(4, 1, 1, 2), (2, 5));
        assert_eq!(banded.num_banks(), 3);
    }

    #[test]
    fn test_bit_shift_msb_first() {
        let sm = SampleModel::MultiPixelPacked { bits: 1 };
        assert_eq!(sm.bit_shift(0), 7);
        assert_eq!(sm.bit_shift(7), 0);
        let sm2 = SampleModel::MultiPixelPacked { bits: 2 };
        assert_eq!(sm2.bit_shift(1), 4);
    }
}
