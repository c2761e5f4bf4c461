//! Raster model - the codec-side image representation
//!
//! A [`Raster`] is a sample grid: a [`SampleModel`] describing the layout
//! over a [`DataBuffer`] of one primitive element type. Paired with an
//! optional [`ColorModel`] it forms a [`RasterImage`], which is what the
//! codecs in `ijio-io` consume and produce.
//!
//! # See also
//!
//! - [`crate::convert`] for the conversions to and from processors

mod sample_model;

pub use sample_model::SampleModel;

use crate::color_model::ColorModel;
use crate::error::{Error, Result};

/// Primitive element type of a data buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    /// Unsigned 8-bit
    Byte,
    /// Unsigned 16-bit
    UShort,
    /// Signed 16-bit
    Short,
    /// Signed 32-bit
    Int,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Element type the bridge does not know
    Undefined,
}

impl SampleType {
    /// Size of one element in bits (0 for `Undefined`).
    pub fn bits(self) -> u32 {
        match self {
            SampleType::Byte => 8,
            SampleType::UShort | SampleType::Short => 16,
            SampleType::Int | SampleType::Float => 32,
            SampleType::Double => 64,
            SampleType::Undefined => 0,
        }
    }

    /// Check if the elements are floating point.
    pub fn is_floating(self) -> bool {
        matches!(self, SampleType::Float | SampleType::Double)
    }
}

/// Banks of a data buffer, one `Vec` per bank.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferData {
    /// Unsigned bytes
    Byte(Vec<Vec<u8>>),
    /// Unsigned 16-bit
    UShort(Vec<Vec<u16>>),
    /// Signed 16-bit
    Short(Vec<Vec<i16>>),
    /// Signed 32-bit
    Int(Vec<Vec<i32>>),
    /// 32-bit float
    Float(Vec<Vec<f32>>),
    /// 64-bit float
    Double(Vec<Vec<f64>>),
    /// Opaque elements of an unknown type, recorded by bank length only
    Undefined(Vec<usize>),
}

/// Element storage of a raster.
///
/// Every bank holds elements of one type; `offset` elements at the start
/// of each bank precede the first sample.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBuffer {
    data: BufferData,
    offset: usize,
}

impl DataBuffer {
    /// Wrap banks with a zero offset.
    pub fn new(data: BufferData) -> Self {
        Self { data, offset: 0 }
    }

    /// Builder form setting the offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Single byte bank.
    pub fn byte(data: Vec<u8>) -> Self {
        Self::new(BufferData::Byte(vec![data]))
    }

    /// Single unsigned 16-bit bank.
    pub fn ushort(data: Vec<u16>) -> Self {
        Self::new(BufferData::UShort(vec![data]))
    }

    /// Single signed 16-bit bank.
    pub fn short(data: Vec<i16>) -> Self {
        Self::new(BufferData::Short(vec![data]))
    }

    /// Single 32-bit int bank.
    pub fn int(data: Vec<i32>) -> Self {
        Self::new(BufferData::Int(vec![data]))
    }

    /// Single float bank.
    pub fn float(data: Vec<f32>) -> Self {
        Self::new(BufferData::Float(vec![data]))
    }

    /// Single double bank.
    pub fn double(data: Vec<f64>) -> Self {
        Self::new(BufferData::Double(vec![data]))
    }

    /// Element type
    pub fn sample_type(&self) -> SampleType {
        match &self.data {
            BufferData::Byte(_) => SampleType::Byte,
            BufferData::UShort(_) => SampleType::UShort,
            BufferData::Short(_) => SampleType::Short,
            BufferData::Int(_) => SampleType::Int,
            BufferData::Float(_) => SampleType::Float,
            BufferData::Double(_) => SampleType::Double,
            BufferData::Undefined(_) => SampleType::Undefined,
        }
    }

    /// Number of banks
    pub fn num_banks(&self) -> usize {
        match &self.data {
            BufferData::Byte(b) => b.len(),
            BufferData::UShort(b) => b.len(),
            BufferData::Short(b) => b.len(),
            BufferData::Int(b) => b.len(),
            BufferData::Float(b) => b.len(),
            BufferData::Double(b) => b.len(),
            BufferData::Undefined(b) => b.len(),
        }
    }

    /// Length of a bank in elements.
    pub fn bank_len(&self, bank: usize) -> Option<usize> {
        match &self.data {
            BufferData::Byte(b) => b.get(bank).map(Vec::len),
            BufferData::UShort(b) => b.get(bank).map(Vec::len),
            BufferData::Short(b) => b.get(bank).map(Vec::len),
            BufferData::Int(b) => b.get(bank).map(Vec::len),
            BufferData::Float(b) => b.get(bank).map(Vec::len),
            BufferData::Double(b) => b.get(bank).map(Vec::len),
            BufferData::Undefined(b) => b.get(bank).copied(),
        }
    }

    /// Elements before the first sample in every bank.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The banks
    #[inline]
    pub fn data(&self) -> &BufferData {
        &self.data
    }

    /// Give up the buffer and keep its banks.
    #[inline]
    pub fn into_data(self) -> BufferData {
        self.data
    }

    /// Element as `f64`, or `None` outside the bank.
    pub fn elem(&self, bank: usize, index: usize) -> Option<f64> {
        match &self.data {
            BufferData::Byte(b) => b.get(bank)?.get(index).map(|&v| v as f64),
            BufferData::UShort(b) => b.get(bank)?.get(index).map(|&v| v as f64),
            BufferData::Short(b) => b.get(bank)?.get(index).map(|&v| v as f64),
            BufferData::Int(b) => b.get(bank)?.get(index).map(|&v| v as f64),
            BufferData::Float(b) => b.get(bank)?.get(index).map(|&v| v as f64),
            BufferData::Double(b) => b.get(bank)?.get(index).copied(),
            BufferData::Undefined(_) => None,
        }
    }

    /// Store an element, converting from `f64` with saturation.
    pub fn set_elem(&mut self, bank: usize, index: usize, value: f64) -> Result<()> {
        let len = self.bank_len(bank).unwrap_or(0);
        let oob = Error::IndexOutOfBounds { index, len };
        match &mut self.data {
            BufferData::Byte(b) => *slot(b, bank, index).ok_or(oob)? = value as u8,
            BufferData::UShort(b) => *slot(b, bank, index).ok_or(oob)? = value as u16,
            BufferData::Short(b) => *slot(b, bank, index).ok_or(oob)? = value as i16,
            BufferData::Int(b) => *slot(b, bank, index).ok_or(oob)? = value as i32,
            BufferData::Float(b) => *slot(b, bank, index).ok_or(oob)? = value as f32,
            BufferData::Double(b) => *slot(b, bank, index).ok_or(oob)? = value,
            BufferData::Undefined(_) => {
                return Err(Error::UnsupportedSampleType(
                    "cannot store into an undefined data buffer".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn slot<T>(banks: &mut [Vec<T>], bank: usize, index: usize) -> Option<&mut T> {
    banks.get_mut(bank)?.get_mut(index)
}

/// Sample grid: layout plus storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    sample_model: SampleModel,
    buffer: DataBuffer,
}

impl Raster {
    /// Create a raster, validating the layout against the buffer.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimension`] for an empty grid
    /// - [`Error::InvalidParameter`] for zero bands, a bank count that does
    ///   not match the layout, or packed samples that are not 1, 2 or 4 bit
    /// - [`Error::UnsupportedSampleType`] for packed samples in a non-byte
    ///   buffer
    /// - [`Error::BufferLength`] when a bank is not `offset + required`
    ///   elements long
    pub fn new(
        width: u32,
        height: u32,
        sample_model: SampleModel,
        buffer: DataBuffer,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        if sample_model.num_bands() == 0 {
            return Err(Error::InvalidParameter(
                "sample model has no bands".to_string(),
            ));
        }
        if let SampleModel::MultiPixelPacked { bits } = sample_model {
            if !matches!(bits, 1 | 2 | 4) {
                return Err(Error::InvalidParameter(format!(
                    "packed samples must be 1, 2 or 4 bits; got {bits}"
                )));
            }
            if buffer.sample_type() != SampleType::Byte {
                return Err(Error::UnsupportedSampleType(format!(
                    "packed samples need a byte buffer, not {:?}",
                    buffer.sample_type()
                )));
            }
        }
        if buffer.num_banks() != sample_model.num_banks() {
            return Err(Error::InvalidParameter(format!(
                "layout needs {} bank(s), buffer has {}",
                sample_model.num_banks(),
                buffer.num_banks()
            )));
        }
        let expected = buffer.offset() + sample_model.required_len(width, height);
        for bank in 0..buffer.num_banks() {
            let actual = buffer.bank_len(bank).unwrap_or(0);
            if actual != expected {
                return Err(Error::BufferLength { expected, actual });
            }
        }
        Ok(Self {
            width,
            height,
            sample_model,
            buffer,
        })
    }

    /// Single-band raster over one bank.
    pub fn single_band(width: u32, height: u32, buffer: DataBuffer) -> Result<Self> {
        Self::new(
            width,
            height,
            SampleModel::PixelInterleaved { bands: 1 },
            buffer,
        )
    }

    /// Pixel-interleaved raster.
    pub fn interleaved(width: u32, height: u32, bands: usize, buffer: DataBuffer) -> Result<Self> {
        Self::new(width, height, SampleModel::PixelInterleaved { bands }, buffer)
    }

    /// Banded raster, one bank per band.
    pub fn banded(width: u32, height: u32, buffer: DataBuffer) -> Result<Self> {
        let bands = buffer.num_banks();
        Self::new(width, height, SampleModel::Banded { bands }, buffer)
    }

    /// Packed sub-byte raster.
    pub fn packed(width: u32, height: u32, bits: u32, data: Vec<u8>) -> Result<Self> {
        Self::new(
            width,
            height,
            SampleModel::MultiPixelPacked { bits },
            DataBuffer::byte(data),
        )
    }

    /// Width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample layout
    #[inline]
    pub fn sample_model(&self) -> SampleModel {
        self.sample_model
    }

    /// Underlying storage
    #[inline]
    pub fn data_buffer(&self) -> &DataBuffer {
        &self.buffer
    }

    /// Give up the raster and keep its storage.
    #[inline]
    pub fn into_data_buffer(self) -> DataBuffer {
        self.buffer
    }

    /// Samples per pixel
    pub fn num_bands(&self) -> usize {
        self.sample_model.num_bands()
    }

    /// Number of banks
    pub fn num_banks(&self) -> usize {
        self.buffer.num_banks()
    }

    /// Element type
    pub fn sample_type(&self) -> SampleType {
        self.buffer.sample_type()
    }

    /// Sample size of `band` in bits.
    pub fn sample_size(&self, band: usize) -> Option<u32> {
        (band < self.num_bands()).then(|| self.sample_model.sample_size(self.sample_type()))
    }

    /// Sample `band` of pixel `(x, y)`.
    pub fn sample(&self, x: u32, y: u32, band: usize) -> Option<f64> {
        if x >= self.width || y >= self.height || band >= self.num_bands() {
            return None;
        }
        let (bank, index) = self.sample_model.locate(self.width, x, y, band);
        let value = self.buffer.elem(bank, self.buffer.offset() + index)?;
        match self.sample_model {
            SampleModel::MultiPixelPacked { bits } => {
                let mask = (1u32 << bits) - 1;
                Some(((value as u32 >> self.sample_model.bit_shift(x)) & mask) as f64)
            }
            _ => Some(value),
        }
    }

    /// All samples of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec<f64>> {
        (0..self.num_bands())
            .map(|band| self.sample(x, y, band))
            .collect()
    }

    /// Store sample `band` of pixel `(x, y)`.
    pub fn set_sample(&mut self, x: u32, y: u32, band: usize, value: f64) -> Result<()> {
        if x >= self.width || y >= self.height || band >= self.num_bands() {
            return Err(Error::IndexOutOfBounds {
                index: y as usize * self.width as usize + x as usize,
                len: self.width as usize * self.height as usize,
            });
        }
        let (bank, index) = self.sample_model.locate(self.width, x, y, band);
        let index = self.buffer.offset() + index;
        match self.sample_model {
            SampleModel::MultiPixelPacked { bits } => {
                let shift = self.sample_model.bit_shift(x);
                let mask = ((1u32 << bits) - 1) << shift;
                let old = self.buffer.elem(bank, index).unwrap_or(0.0) as u32;
                let new = (old & !mask) | (((value as u32) << shift) & mask);
                self.buffer.set_elem(bank, index, new as f64)
            }
            _ => self.buffer.set_elem(bank, index, value),
        }
    }
}

/// Shape of a raster image as the mapping table sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterShape {
    /// One band of 8 bits or more
    SingleBand(SampleType),
    /// One band of 1, 2 or 4 bit packed samples
    SubByte(u32),
    /// Several bands or banks
    MultiBand {
        /// Samples per pixel
        bands: usize,
        /// Element type
        sample_type: SampleType,
    },
}

/// Raster plus the color model that interprets it.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    raster: Raster,
    color_model: Option<ColorModel>,
}

impl RasterImage {
    /// Pair a raster with an optional color model.
    pub fn new(raster: Raster, color_model: Option<ColorModel>) -> Self {
        Self {
            raster,
            color_model,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// The raster
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// The raster, mutably
    pub fn raster_mut(&mut self) -> &mut Raster {
        &mut self.raster
    }

    /// The color model, if any
    pub fn color_model(&self) -> Option<&ColorModel> {
        self.color_model.as_ref()
    }

    /// Split into raster and color model.
    pub fn into_parts(self) -> (Raster, Option<ColorModel>) {
        (self.raster, self.color_model)
    }

    /// Classify the layout.
    pub fn shape(&self) -> RasterShape {
        let raster = &self.raster;
        if raster.num_bands() > 1 || raster.num_banks() > 1 {
            return RasterShape::MultiBand {
                bands: raster.num_bands(),
                sample_type: raster.sample_type(),
            };
        }
        match raster.sample_model() {
            SampleModel::MultiPixelPacked { bits } => RasterShape::SubByte(bits),
            _ => RasterShape::SingleBand(raster.sample_type()),
        }
    }

    /// Packed `0xAARRGGBB` color of pixel `(x, y)` through the color model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousColorModel`] when there is no color model.
    pub fn rgb(&self, x: u32, y: u32) -> Result<u32> {
        let cm = self.color_model.as_ref().ok_or(Error::AmbiguousColorModel {
            bands: self.raster.num_bands(),
            banks: self.raster.num_banks(),
        })?;
        let samples = self.raster.pixel(x, y).ok_or(Error::IndexOutOfBounds {
            index: y as usize * self.width() as usize + x as usize,
            len: self.width() as usize * self.height() as usize,
        })?;
        cm.rgb(&samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_length_validated() {
        let ok = Raster::single_band(3, 2, DataBuffer::byte(vec![0; 6]));
        assert!(ok.is_ok());
        let short = Raster::single_band(3, 2, DataBuffer::byte(vec![0; 5]));
        assert!(matches!(short, Err(Error::BufferLength { expected: 6, actual: 5 })));
        let with_offset = Raster::single_band(3, 2, DataBuffer::byte(vec![0; 8]).with_offset(2));
        assert!(with_offset.is_ok());
    }

    #[test]
    fn test_packed_needs_bytes() {
        let bad = Raster::new(
            8,
            1,
            SampleModel::MultiPixelPacked { bits: 1 },
            DataBuffer::ushort(vec![0]),
        );
        assert!(matches!(bad, Err(Error::UnsupportedSampleType(_))));
        assert!(Raster::packed(8, 1, 3, vec![0]).is_err());
    }

    #[test]
    fn test_packed_sample_access() {
        let mut r = Raster::packed(10, 1, 1, vec![0b1000_0001, 0b0100_0000]).unwrap();
        assert_eq!(r.sample(0, 0, 0), Some(1.0));
        assert_eq!(r.sample(1, 0, 0), Some(0.0));
        assert_eq!(r.sample(7, 0, 0), Some(1.0));
        assert_eq!(r.sample(9, 0, 0), Some(1.0));
        r.set_sample(8, 0, 0, 1.0).unwrap();
        assert_eq!(r.data_buffer().elem(0, 1), Some(0b1100_0000 as f64));
    }

    #[test]
    fn test_interleaved_pixel() {
        let r = Raster::interleaved(2, 1, 3, DataBuffer::ushort(vec![1, 2, 3, 4, 5, 6])).unwrap();
        assert_eq!(r.pixel(1, 0), Some(vec![4.0, 5.0, 6.0]));
        assert_eq!(r.sample_size(2), Some(16));
        assert_eq!(r.sample_size(3), None);
    }

    #[test]
    fn test_shape() {
        let packed = RasterImage::new(Raster::packed(8, 1, 1, vec![0]).unwrap(), None);
        assert_eq!(packed.shape(), RasterShape::SubByte(1));
        let banded = RasterImage::new(
            Raster::banded(
                1,
                1,
                DataBuffer::new(BufferData::Float(vec![vec![0.0], vec![0.0]])),
            )
            .unwrap(),
            None,
        );
        assert_eq!(
            banded.shape(),
            RasterShape::MultiBand {
                bands: 2,
                sample_type: SampleType::Float
            }
        );
        assert!(banded.rgb(0, 0).is_err());
    }
}
