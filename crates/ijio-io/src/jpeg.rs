//! JPEG image format support
//!
//! Decoding uses `jpeg-decoder`, encoding `jpeg-encoder`. JPEG holds
//! 8-bit gray or RGB only, so wider pages are scaled down on write.

use std::io::{BufReader, Cursor, Read};

use ijio_core::{ColorModel, ComponentColorModel, DataBuffer, Raster, RasterImage};
use jpeg_decoder::PixelFormat;
use jpeg_encoder::{ColorType as JpegColorType, Encoder};

use crate::metadata::FileMetadata;
use crate::page::{PageData, bilevel_gray, classify, expand_palette, fit, palette_gray, scale_to_u8};
use crate::registry::{CodecProvider, DecodedFile};
use crate::{ImageFormat, IoConfig, IoError, IoResult};

/// JPEG provider backed by `jpeg-decoder` and `jpeg-encoder`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegProvider;

impl CodecProvider for JpegProvider {
    fn id(&self) -> &str {
        "jpeg-rs"
    }

    fn format(&self) -> ImageFormat {
        ImageFormat::Jpeg
    }

    fn decode(&self, data: &[u8]) -> IoResult<DecodedFile> {
        Ok(DecodedFile::single(read_jpeg(Cursor::new(data))?))
    }

    fn encode(
        &self,
        pages: &[RasterImage],
        _metadata: &FileMetadata,
        config: &IoConfig,
    ) -> IoResult<Vec<u8>> {
        let page = pages
            .first()
            .ok_or_else(|| IoError::InvalidData("no pages to write".to_string()))?;
        write_jpeg(page, config.jpeg_quality)
    }
}

/// Read a JPEG image from a reader.
///
/// Gray comes back as 8 or 16-bit single band, color as 8-bit RGB.
/// CMYK is converted to RGB.
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<RasterImage> {
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(reader));
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(format!("JPEG decode error: {}", e)))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".to_string()))?;

    let (width, height) = (info.width as u32, info.height as u32);
    let n = width as usize * height as usize;
    let srgb = || Some(ColorModel::Component(ComponentColorModel::srgb(8)));

    let ri = match info.pixel_format {
        PixelFormat::L8 => RasterImage::new(
            Raster::single_band(width, height, DataBuffer::byte(fit(pixels, n)?))?,
            None,
        ),
        PixelFormat::L16 => {
            let samples = pixels
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            RasterImage::new(
                Raster::single_band(width, height, DataBuffer::ushort(fit(samples, n)?))?,
                None,
            )
        }
        PixelFormat::RGB24 => RasterImage::new(
            Raster::interleaved(width, height, 3, DataBuffer::byte(fit(pixels, 3 * n)?))?,
            srgb(),
        ),
        PixelFormat::CMYK32 => {
            let rgb: Vec<u8> = pixels
                .chunks_exact(4)
                .flat_map(|cmyk| {
                    let c = cmyk[0] as f32 / 255.0;
                    let m = cmyk[1] as f32 / 255.0;
                    let y = cmyk[2] as f32 / 255.0;
                    let k = cmyk[3] as f32 / 255.0;

                    let r = ((1.0 - c) * (1.0 - k) * 255.0) as u8;
                    let g = ((1.0 - m) * (1.0 - k) * 255.0) as u8;
                    let b = ((1.0 - y) * (1.0 - k) * 255.0) as u8;

                    [r, g, b]
                })
                .collect();
            RasterImage::new(
                Raster::interleaved(width, height, 3, DataBuffer::byte(fit(rgb, 3 * n)?))?,
                srgb(),
            )
        }
    };
    Ok(ri)
}

/// Encode a raster image as JPEG.
///
/// `quality` is 1..=100. 16-bit and float gray are stretched over their
/// min/max; 16-bit RGB keeps the high byte.
pub fn write_jpeg(ri: &RasterImage, quality: u8) -> IoResult<Vec<u8>> {
    let (width, height) = (ri.width(), ri.height());
    let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(IoError::EncodeError(format!(
                "JPEG dimensions are limited to 65535, got {}x{}",
                width, height
            )));
        }
    };

    let (color_type, data) = match classify(ri)? {
        PageData::Bilevel { samples, inverted } => {
            (JpegColorType::Luma, bilevel_gray(&samples, inverted))
        }
        PageData::Gray8(data) => (JpegColorType::Luma, data.into_owned()),
        PageData::Indexed8 { indices, palette } if palette.is_grayscale() => {
            (JpegColorType::Luma, palette_gray(&indices, palette))
        }
        PageData::Indexed8 { indices, palette } => {
            (JpegColorType::Rgb, expand_palette(&indices, palette))
        }
        PageData::Gray16(data) => (JpegColorType::Luma, scale_to_u8(&data[..])),
        PageData::Float32(data) => (JpegColorType::Luma, scale_to_u8(&data[..])),
        PageData::Rgb8(data) => (JpegColorType::Rgb, data.into_owned()),
        PageData::Rgb16(data) => (
            JpegColorType::Rgb,
            data.iter().map(|&v| (v >> 8) as u8).collect(),
        ),
    };

    let mut buffer = Vec::new();
    let encoder = Encoder::new(&mut buffer, quality.clamp(1, 100));
    encoder
        .encode(&data, w, h, color_type)
        .map_err(|e| IoError::EncodeError(format!("JPEG encode error: {}", e)))?;
    tracing::debug!(width, height, quality, bytes = buffer.len(), "JPEG encoded");
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ijio_core::{RasterShape, SampleType};

    #[test]
    fn test_jpeg_gray_roundtrip_is_close() {
        let data: Vec<u8> = (0..64 * 64).map(|i| ((i % 64) * 4) as u8).collect();
        let ri = RasterImage::new(Raster::single_band(64, 64, DataBuffer::byte(data.clone())).unwrap(), None);
        let bytes = write_jpeg(&ri, 95).unwrap();
        let back = read_jpeg(Cursor::new(bytes)).unwrap();
        assert_eq!(back.shape(), RasterShape::SingleBand(SampleType::Byte));
        for x in [0u32, 17, 40, 63] {
            let a = ri.raster().sample(x, 10, 0).unwrap();
            let b = back.raster().sample(x, 10, 0).unwrap();
            assert!((a - b).abs() <= 12.0, "x={x}: {a} vs {b}");
        }
    }

    #[test]
    fn test_jpeg_rgb_shape() {
        let data = vec![200u8, 30, 30].repeat(16 * 16);
        let ri = RasterImage::new(
            Raster::interleaved(16, 16, 3, DataBuffer::byte(data)).unwrap(),
            Some(ColorModel::Component(ComponentColorModel::srgb(8))),
        );
        let back = read_jpeg(Cursor::new(write_jpeg(&ri, 90).unwrap())).unwrap();
        assert_eq!(
            back.shape(),
            RasterShape::MultiBand {
                bands: 3,
                sample_type: SampleType::Byte
            }
        );
        let red = back.raster().sample(8, 8, 0).unwrap();
        assert!(red > 170.0, "red channel {red}");
    }

    #[test]
    fn test_jpeg_float_is_scaled() {
        let ri = RasterImage::new(
            Raster::single_band(8, 8, DataBuffer::float(vec![-1.0; 64])).unwrap(),
            None,
        );
        assert!(write_jpeg(&ri, 85).is_ok());
    }

    #[test]
    fn test_jpeg_rejects_garbage() {
        assert!(matches!(
            read_jpeg(Cursor::new(vec![0xff, 0xd8, 0x00])),
            Err(IoError::DecodeError(_))
        ));
    }
}
