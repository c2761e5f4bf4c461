//! PNG image format support
//!
//! Samples are read untransformed, so packed and 16-bit data keep their
//! depth. Pixel size travels in the `pHYs` chunk when the unit is
//! absolute; the ImageJ description in a `tEXt` chunk.

use std::io::{BufRead, Cursor, Seek, Write};

use ijio_core::{
    ColorModel, ColorSpace, ComponentColorModel, DataBuffer, Palette, Raster, RasterImage,
    SampleModel, convert::pack_bits,
};
use png::{BitDepth, ColorType, Decoder, Encoder, PixelDimensions, Transformations, Unit};

use crate::metadata::{FileMetadata, Resolution, ResolutionUnit};
use crate::page::{PageData, classify, fit};
use crate::registry::{CodecProvider, DecodedFile};
use crate::{ImageFormat, IoConfig, IoError, IoResult};

/// `tEXt` keyword holding the description
const DESCRIPTION_KEYWORD: &str = "Description";

const METERS_PER_INCH: f64 = 0.0254;

/// PNG provider backed by the `png` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngProvider;

impl CodecProvider for PngProvider {
    fn id(&self) -> &str {
        "png-rs"
    }

    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn decode(&self, data: &[u8]) -> IoResult<DecodedFile> {
        read_png(Cursor::new(data))
    }

    fn encode(
        &self,
        pages: &[RasterImage],
        metadata: &FileMetadata,
        _config: &IoConfig,
    ) -> IoResult<Vec<u8>> {
        let page = pages
            .first()
            .ok_or_else(|| IoError::InvalidData("no pages to write".to_string()))?;
        let mut buffer = Vec::new();
        write_png(page, metadata, &mut buffer)?;
        Ok(buffer)
    }
}

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<DecodedFile> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::IDENTITY);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;
    buf.truncate(output_info.buffer_size());

    let info = reader.info();
    let (width, height) = (info.width, info.height);
    let (color_type, bit_depth) = (info.color_type, info.bit_depth);
    let n = width as usize * height as usize;
    let component = |raster: Raster, space: ColorSpace, alpha: bool, bits: u32| {
        RasterImage::new(
            raster,
            Some(ColorModel::Component(ComponentColorModel::new(space, alpha, false, bits))),
        )
    };

    let page = match (color_type, bit_depth) {
        (ColorType::Grayscale, BitDepth::One | BitDepth::Two | BitDepth::Four) => {
            RasterImage::new(packed(width, height, bit_depth as u32, buf)?, None)
        }
        (ColorType::Grayscale, BitDepth::Eight) => RasterImage::new(
            Raster::single_band(width, height, DataBuffer::byte(fit(buf, n)?))?,
            None,
        ),
        (ColorType::Grayscale, BitDepth::Sixteen) => RasterImage::new(
            Raster::single_band(width, height, DataBuffer::ushort(fit(be_u16(&buf), n)?))?,
            None,
        ),
        (ColorType::Indexed, depth) => {
            let palette = info
                .palette
                .as_ref()
                .ok_or_else(|| IoError::DecodeError("indexed PNG without a palette".to_string()))?;
            let (r, g, b): (Vec<u8>, Vec<u8>, Vec<u8>) = palette
                .chunks_exact(3)
                .map(|c| (c[0], c[1], c[2]))
                .fold(Default::default(), |(mut r, mut g, mut b), (x, y, z)| {
                    r.push(x);
                    g.push(y);
                    b.push(z);
                    (r, g, b)
                });
            let palette = Palette::from_rgb_planes(&r, &g, &b)?;
            let raster = if depth == BitDepth::Eight {
                Raster::single_band(width, height, DataBuffer::byte(fit(buf, n)?))?
            } else {
                packed(width, height, depth as u32, buf)?
            };
            RasterImage::new(raster, Some(ColorModel::Indexed(palette)))
        }
        (ColorType::Rgb, BitDepth::Eight) => component(
            Raster::interleaved(width, height, 3, DataBuffer::byte(fit(buf, 3 * n)?))?,
            ColorSpace::Srgb,
            false,
            8,
        ),
        (ColorType::Rgb, BitDepth::Sixteen) => component(
            Raster::interleaved(width, height, 3, DataBuffer::ushort(fit(be_u16(&buf), 3 * n)?))?,
            ColorSpace::Srgb,
            false,
            16,
        ),
        (ColorType::Rgba, BitDepth::Eight) => component(
            Raster::interleaved(width, height, 4, DataBuffer::byte(fit(buf, 4 * n)?))?,
            ColorSpace::Srgb,
            true,
            8,
        ),
        (ColorType::Rgba, BitDepth::Sixteen) => component(
            Raster::interleaved(width, height, 4, DataBuffer::ushort(fit(be_u16(&buf), 4 * n)?))?,
            ColorSpace::Srgb,
            true,
            16,
        ),
        (ColorType::GrayscaleAlpha, BitDepth::Eight) => component(
            Raster::interleaved(width, height, 2, DataBuffer::byte(fit(buf, 2 * n)?))?,
            ColorSpace::Gray,
            true,
            8,
        ),
        (ColorType::GrayscaleAlpha, BitDepth::Sixteen) => component(
            Raster::interleaved(width, height, 2, DataBuffer::ushort(fit(be_u16(&buf), 2 * n)?))?,
            ColorSpace::Gray,
            true,
            16,
        ),
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNG format: {:?} {:?}",
                color_type, bit_depth
            )));
        }
    };

    let metadata = FileMetadata {
        description: info
            .uncompressed_latin1_text
            .iter()
            .find(|chunk| chunk.keyword == DESCRIPTION_KEYWORD)
            .map(|chunk| chunk.text.clone()),
        resolution: info.pixel_dims.and_then(resolution_from_dims),
    };

    Ok(DecodedFile {
        pages: vec![page],
        metadata,
    })
}

fn packed(width: u32, height: u32, bits: u32, data: Vec<u8>) -> IoResult<Raster> {
    let len = SampleModel::MultiPixelPacked { bits }.required_len(width, height);
    Ok(Raster::packed(width, height, bits, fit(data, len)?)?)
}

fn be_u16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect()
}

fn be_bytes(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Per-meter `pHYs` as centimeter resolution.
fn resolution_from_dims(dims: PixelDimensions) -> Option<Resolution> {
    match dims.unit {
        Unit::Meter if dims.xppu > 0 && dims.yppu > 0 => Some(Resolution {
            x: dims.xppu as f64 / 100.0,
            y: dims.yppu as f64 / 100.0,
            unit: ResolutionUnit::Centimeter,
        }),
        _ => None,
    }
}

fn dims_from_resolution(res: &Resolution) -> Option<PixelDimensions> {
    let per_meter = match res.unit {
        ResolutionUnit::Centimeter => 100.0,
        ResolutionUnit::Inch => 1.0 / METERS_PER_INCH,
        ResolutionUnit::None => return None,
    };
    let ppu = |v: f64| (v * per_meter).round().clamp(1.0, u32::MAX as f64) as u32;
    Some(PixelDimensions {
        xppu: ppu(res.x),
        yppu: ppu(res.y),
        unit: Unit::Meter,
    })
}

/// Write a PNG image
pub fn write_png<W: Write>(ri: &RasterImage, metadata: &FileMetadata, writer: W) -> IoResult<()> {
    let (width, height) = (ri.width(), ri.height());

    let (color_type, bit_depth, palette, data) = match classify(ri)? {
        PageData::Bilevel { samples, inverted } => {
            let packed = pack_bits(width, height, &samples)?;
            if inverted {
                (ColorType::Indexed, BitDepth::One, Some(vec![255, 255, 255, 0, 0, 0]), packed)
            } else {
                (ColorType::Grayscale, BitDepth::One, None, packed)
            }
        }
        PageData::Gray8(data) => (ColorType::Grayscale, BitDepth::Eight, None, data.into_owned()),
        PageData::Indexed8 { indices, palette } => {
            let mut rgb = Vec::with_capacity(palette.len() * 3);
            for i in 0..palette.len() {
                if let Some((r, g, b)) = palette.get_rgb(i) {
                    rgb.extend_from_slice(&[r, g, b]);
                }
            }
            (ColorType::Indexed, BitDepth::Eight, Some(rgb), indices.into_owned())
        }
        PageData::Gray16(data) => (ColorType::Grayscale, BitDepth::Sixteen, None, be_bytes(&data)),
        PageData::Rgb8(data) => (ColorType::Rgb, BitDepth::Eight, None, data.into_owned()),
        PageData::Rgb16(data) => (ColorType::Rgb, BitDepth::Sixteen, None, be_bytes(&data)),
        PageData::Float32(_) => {
            return Err(IoError::UnsupportedFormat(
                "PNG cannot hold 32-bit float samples".to_string(),
            ));
        }
    };

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(bit_depth);
    if let Some(palette) = palette {
        encoder.set_palette(palette);
    }
    encoder.set_pixel_dims(metadata.resolution.as_ref().and_then(dims_from_resolution));
    if let Some(text) = &metadata.description {
        encoder
            .add_text_chunk(DESCRIPTION_KEYWORD.to_string(), text.clone())
            .map_err(|e| IoError::EncodeError(format!("PNG text chunk error: {}", e)))?;
    }

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;
    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ijio_core::{BufferData, RasterShape, SampleType};

    fn roundtrip(ri: &RasterImage, metadata: &FileMetadata) -> DecodedFile {
        let mut buffer = Vec::new();
        write_png(ri, metadata, &mut buffer).unwrap();
        read_png(Cursor::new(buffer)).unwrap()
    }

    #[test]
    fn test_png_roundtrip_grayscale() {
        let data: Vec<u8> = (0..100).map(|i| (i * 2) as u8).collect();
        let ri = RasterImage::new(
            Raster::single_band(10, 10, DataBuffer::byte(data.clone())).unwrap(),
            None,
        );
        let decoded = roundtrip(&ri, &FileMetadata::default());
        let page = &decoded.pages[0];
        assert_eq!(page.shape(), RasterShape::SingleBand(SampleType::Byte));
        assert_eq!(page.raster().data_buffer().data(), &BufferData::Byte(vec![data]));
        assert_eq!(decoded.metadata, FileMetadata::default());
    }

    #[test]
    fn test_png_roundtrip_gray16_big_endian() {
        let ri = RasterImage::new(
            Raster::single_band(3, 1, DataBuffer::ushort(vec![0, 0x1234, 65535])).unwrap(),
            None,
        );
        let decoded = roundtrip(&ri, &FileMetadata::default());
        assert_eq!(decoded.pages[0].raster(), ri.raster());
    }

    #[test]
    fn test_png_inverted_binary_is_indexed() {
        let raster = Raster::packed(10, 1, 1, vec![0b1010_0000, 0b0100_0000]).unwrap();
        let ri = RasterImage::new(raster, Some(ColorModel::Indexed(Palette::binary(true))));
        let decoded = roundtrip(&ri, &FileMetadata::default());
        let page = &decoded.pages[0];
        assert_eq!(page.shape(), RasterShape::SubByte(1));
        assert!(page.color_model().and_then(ColorModel::palette).is_some_and(Palette::is_inverted_binary));
        assert_eq!(page.raster().sample(0, 0, 0), Some(1.0));
        assert_eq!(page.raster().sample(1, 0, 0), Some(0.0));
        assert_eq!(page.raster().sample(9, 0, 0), Some(1.0));
    }

    #[test]
    fn test_png_rejects_float() {
        let ri = RasterImage::new(Raster::single_band(1, 1, DataBuffer::float(vec![0.5])).unwrap(), None);
        let err = write_png(&ri, &FileMetadata::default(), Vec::new()).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_png_metadata_chunks() {
        let ri = RasterImage::new(Raster::single_band(2, 2, DataBuffer::byte(vec![0; 4])).unwrap(), None);
        let metadata = FileMetadata {
            description: Some("ImageJ=1.54f\nunit=cm\n".to_string()),
            resolution: Some(Resolution {
                x: 50.0,
                y: 25.0,
                unit: ResolutionUnit::Centimeter,
            }),
        };
        let decoded = roundtrip(&ri, &metadata);
        assert_eq!(decoded.metadata, metadata);
    }
}
