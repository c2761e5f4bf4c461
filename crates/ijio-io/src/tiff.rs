//! TIFF image format support
//!
//! Multi-page read and write through the `tiff` crate. Besides pixels,
//! the first page carries the `ImageDescription` tag and every page the
//! resolution tags, which together hold an image's layout and
//! calibration (see [`crate::metadata`]).

use std::io::{Cursor, Read, Seek, Write};

use ijio_core::{
    ColorModel, ColorSpace, ComponentColorModel, DataBuffer, Palette, Raster, RasterImage,
    SampleModel,
};
use tiff::ColorType;
use tiff::decoder::ifd::Value;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{self, ColorType as EncodeColor};
use tiff::encoder::{Rational, TiffEncoder, TiffValue};
use tiff::tags::{
    PhotometricInterpretation, ResolutionUnit as TiffResolutionUnit, SampleFormat, Tag,
};

use crate::metadata::{FileMetadata, Resolution, ResolutionUnit, from_rational, to_rational};
use crate::page::{PageData, bilevel_gray, classify, expand_palette, fit, palette_gray};
use crate::registry::{CodecProvider, DecodedFile};
use crate::{ImageFormat, IoConfig, IoError, IoResult, TiffCompression};

/// TIFF provider backed by the `tiff` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffProvider;

impl CodecProvider for TiffProvider {
    fn id(&self) -> &str {
        "tiff-rs"
    }

    fn format(&self) -> ImageFormat {
        ImageFormat::Tiff
    }

    fn supports_multipage(&self) -> bool {
        true
    }

    fn decode(&self, data: &[u8]) -> IoResult<DecodedFile> {
        read_tiff(Cursor::new(data))
    }

    fn encode(
        &self,
        pages: &[RasterImage],
        metadata: &FileMetadata,
        config: &IoConfig,
    ) -> IoResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        write_tiff(pages, metadata, &mut cursor, config.tiff_compression)?;
        Ok(cursor.into_inner())
    }
}

fn decode_err(e: tiff::TiffError) -> IoError {
    IoError::DecodeError(format!("TIFF decode error: {}", e))
}

fn encode_err(e: tiff::TiffError) -> IoError {
    IoError::EncodeError(format!("TIFF write error: {}", e))
}

/// Read every page of a TIFF file.
///
/// Metadata comes from the first page.
pub fn read_tiff<R: Read + Seek>(reader: R) -> IoResult<DecodedFile> {
    let mut decoder = Decoder::new(reader).map_err(decode_err)?;
    let metadata = read_metadata(&mut decoder);

    let mut pages = Vec::new();
    loop {
        pages.push(decode_page(&mut decoder)?);

        if !decoder.more_images() {
            break;
        }

        decoder
            .next_image()
            .map_err(|e| IoError::DecodeError(format!("TIFF page navigation error: {}", e)))?;
    }

    tracing::debug!(pages = pages.len(), "TIFF decoded");
    Ok(DecodedFile { pages, metadata })
}

fn read_metadata<R: Read + Seek>(decoder: &mut Decoder<R>) -> FileMetadata {
    let description = decoder.get_tag_ascii_string(Tag::ImageDescription).ok();

    let resolution = rational_tag(decoder, Tag::XResolution).map(|x| {
        let y = rational_tag(decoder, Tag::YResolution).unwrap_or(x);
        // A missing unit tag means inches.
        let unit = decoder
            .get_tag_u32(Tag::ResolutionUnit)
            .ok()
            .map_or(Some(ResolutionUnit::Inch), ResolutionUnit::from_code)
            .unwrap_or_default();
        Resolution { x, y, unit }
    });

    FileMetadata {
        description,
        resolution,
    }
}

fn rational_tag<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> Option<f64> {
    match decoder.find_tag(tag) {
        Ok(Some(Value::Rational(n, d))) => from_rational(n, d),
        Ok(Some(other)) => {
            tracing::warn!(?tag, value = ?other, "resolution tag is not a rational, skipped");
            None
        }
        _ => None,
    }
}

fn read_color_map<R: Read + Seek>(decoder: &mut Decoder<R>) -> IoResult<Palette> {
    let map = decoder.get_tag_u16_vec(Tag::ColorMap).map_err(decode_err)?;
    let n = map.len() / 3;
    let plane = |i: usize| -> Vec<u8> { map[i * n..(i + 1) * n].iter().map(|&v| (v >> 8) as u8).collect() };
    // TIFF maps always hold 2^bits entries; trailing ones are unused.
    let n_used = n.min(256);
    let (r, g, b) = (plane(0), plane(1), plane(2));
    Ok(Palette::from_rgb_planes(&r[..n_used], &g[..n_used], &b[..n_used])?)
}

/// Gray ramp from white to black with `2^bits` entries.
fn inverted_palette(bits: u32) -> IoResult<Palette> {
    let mut palette = Palette::new(bits)?;
    let max = (1u32 << bits) - 1;
    for i in 0..=max {
        let v = (255 - i * 255 / max) as u8;
        palette.add_rgb(v, v, v)?;
    }
    Ok(palette)
}

/// The decoder flips WhiteIsZero samples of 8 bits or less; flip them
/// back so the stored values pair with the inverted palette.
fn stored_samples(mut data: Vec<u8>, white_is_zero: bool) -> Vec<u8> {
    if white_is_zero {
        data.iter_mut().for_each(|b| *b = !*b);
    }
    data
}

/// Decode the page at the current decoder position
fn decode_page<R: Read + Seek>(decoder: &mut Decoder<R>) -> IoResult<RasterImage> {
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| IoError::DecodeError(format!("Failed to get TIFF dimensions: {}", e)))?;
    let color_type = decoder
        .colortype()
        .map_err(|e| IoError::DecodeError(format!("Failed to get TIFF color type: {}", e)))?;

    // 0 = WhiteIsZero
    let white_is_zero = decoder
        .get_tag_u32(Tag::PhotometricInterpretation)
        .ok()
        == Some(0);
    let color_map = match color_type {
        ColorType::Palette(_) => Some(read_color_map(decoder)?),
        _ => None,
    };

    let image_data = decoder
        .read_image()
        .map_err(|e| IoError::DecodeError(format!("Failed to read TIFF image data: {}", e)))?;

    let n = width as usize * height as usize;
    let gray = |raster: Raster, palette: Option<Palette>| {
        RasterImage::new(raster, palette.map(ColorModel::Indexed))
    };
    let component = |raster: Raster, space: ColorSpace, alpha: bool, bits: u32| {
        RasterImage::new(
            raster,
            Some(ColorModel::Component(ComponentColorModel::new(space, alpha, false, bits))),
        )
    };

    let ri = match (color_type, image_data) {
        (ColorType::Gray(bits @ (1 | 2 | 4)), DecodingResult::U8(data)) => {
            let bits = bits as u32;
            let len = SampleModel::MultiPixelPacked { bits }.required_len(width, height);
            let data = stored_samples(data, white_is_zero);
            let raster = Raster::packed(width, height, bits, fit(data, len)?)?;
            let palette = if bits == 1 {
                Some(Palette::binary(white_is_zero))
            } else if white_is_zero {
                Some(inverted_palette(bits)?)
            } else {
                None
            };
            gray(raster, palette)
        }
        (ColorType::Gray(8), DecodingResult::U8(data)) => gray(
            Raster::single_band(
                width,
                height,
                DataBuffer::byte(fit(stored_samples(data, white_is_zero), n)?),
            )?,
            white_is_zero.then(Palette::inverted_gray_ramp),
        ),
        (ColorType::Gray(16), DecodingResult::U16(data)) => gray(
            Raster::single_band(width, height, DataBuffer::ushort(fit(data, n)?))?,
            None,
        ),
        (ColorType::Gray(16), DecodingResult::I16(data)) => gray(
            Raster::single_band(width, height, DataBuffer::short(fit(data, n)?))?,
            None,
        ),
        (ColorType::Gray(16), DecodingResult::F16(data)) => {
            let data = data.iter().map(|&v: &half::f16| v.to_f32()).collect();
            gray(Raster::single_band(width, height, DataBuffer::float(fit(data, n)?))?, None)
        }
        (ColorType::Gray(32), DecodingResult::U32(data)) => {
            let data = data.iter().map(|&v| v as f32).collect();
            gray(Raster::single_band(width, height, DataBuffer::float(fit(data, n)?))?, None)
        }
        (ColorType::Gray(32), DecodingResult::I32(data)) => gray(
            Raster::single_band(width, height, DataBuffer::int(fit(data, n)?))?,
            None,
        ),
        (ColorType::Gray(32), DecodingResult::F32(data)) => gray(
            Raster::single_band(width, height, DataBuffer::float(fit(data, n)?))?,
            None,
        ),
        (ColorType::Gray(64), DecodingResult::F64(data)) => gray(
            Raster::single_band(width, height, DataBuffer::double(fit(data, n)?))?,
            None,
        ),
        (ColorType::Palette(bits), DecodingResult::U8(data)) => {
            let raster = if bits == 8 {
                Raster::single_band(width, height, DataBuffer::byte(fit(data, n)?))?
            } else {
                let bits = bits as u32;
                let len = SampleModel::MultiPixelPacked { bits }.required_len(width, height);
                Raster::packed(width, height, bits, fit(data, len)?)?
            };
            gray(raster, color_map)
        }
        (ColorType::RGB(8), DecodingResult::U8(data)) => component(
            Raster::interleaved(width, height, 3, DataBuffer::byte(fit(data, 3 * n)?))?,
            ColorSpace::Srgb,
            false,
            8,
        ),
        (ColorType::RGBA(8), DecodingResult::U8(data)) => component(
            Raster::interleaved(width, height, 4, DataBuffer::byte(fit(data, 4 * n)?))?,
            ColorSpace::Srgb,
            true,
            8,
        ),
        (ColorType::RGB(16), DecodingResult::U16(data)) => component(
            Raster::interleaved(width, height, 3, DataBuffer::ushort(fit(data, 3 * n)?))?,
            ColorSpace::Srgb,
            false,
            16,
        ),
        (ColorType::RGBA(16), DecodingResult::U16(data)) => component(
            Raster::interleaved(width, height, 4, DataBuffer::ushort(fit(data, 4 * n)?))?,
            ColorSpace::Srgb,
            true,
            16,
        ),
        (ColorType::GrayA(8), DecodingResult::U8(data)) => component(
            Raster::interleaved(width, height, 2, DataBuffer::byte(fit(data, 2 * n)?))?,
            ColorSpace::Gray,
            true,
            8,
        ),
        (ColorType::GrayA(16), DecodingResult::U16(data)) => component(
            Raster::interleaved(width, height, 2, DataBuffer::ushort(fit(data, 2 * n)?))?,
            ColorSpace::Gray,
            true,
            16,
        ),
        (color_type, _) => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported TIFF color type: {:?}",
                color_type
            )));
        }
    };
    Ok(ri)
}

/// Write pages as a (multi-page) TIFF.
///
/// The description goes on the first page only; resolution on every page.
pub fn write_tiff<W: Write + Seek>(
    pages: &[RasterImage],
    metadata: &FileMetadata,
    writer: W,
    compression: TiffCompression,
) -> IoResult<()> {
    if pages.is_empty() {
        return Err(IoError::InvalidData("no pages to write".to_string()));
    }

    let mut encoder = TiffEncoder::new(writer)
        .map_err(|e| IoError::EncodeError(format!("TIFF encoder error: {}", e)))?
        .with_compression(compression.to_tiff_compression());

    for (i, page) in pages.iter().enumerate() {
        let tags = PageTags {
            description: metadata.description.as_deref().filter(|_| i == 0),
            resolution: metadata.resolution,
        };
        write_page(&mut encoder, page, &tags)?;
    }

    Ok(())
}

struct PageTags<'a> {
    description: Option<&'a str>,
    resolution: Option<Resolution>,
}

fn write_page<W: Write + Seek>(
    encoder: &mut TiffEncoder<W>,
    ri: &RasterImage,
    tags: &PageTags<'_>,
) -> IoResult<()> {
    let (w, h) = (ri.width(), ri.height());
    match classify(ri)? {
        // No 1-bit encoder: binary pages are written as 0/255 gray
        PageData::Bilevel { samples, inverted } => {
            let data = bilevel_gray(&samples, false);
            if inverted {
                write_typed::<_, WhiteIsZero8>(encoder, w, h, &data, tags)
            } else {
                write_typed::<_, colortype::Gray8>(encoder, w, h, &data, tags)
            }
        }
        PageData::Gray8(data) => write_typed::<_, colortype::Gray8>(encoder, w, h, &data, tags),
        PageData::Indexed8 { indices, palette } if palette.is_inverted_gray_ramp() => {
            write_typed::<_, WhiteIsZero8>(encoder, w, h, &indices, tags)
        }
        PageData::Indexed8 { indices, palette } if palette.is_grayscale() => {
            let data = palette_gray(&indices, palette);
            write_typed::<_, colortype::Gray8>(encoder, w, h, &data, tags)
        }
        PageData::Indexed8 { indices, palette } => {
            let data = expand_palette(&indices, palette);
            write_typed::<_, colortype::RGB8>(encoder, w, h, &data, tags)
        }
        PageData::Gray16(data) => write_typed::<_, colortype::Gray16>(encoder, w, h, &data, tags),
        PageData::Float32(data) => write_typed::<_, colortype::Gray32Float>(encoder, w, h, &data, tags),
        PageData::Rgb8(data) => write_typed::<_, colortype::RGB8>(encoder, w, h, &data, tags),
        PageData::Rgb16(data) => write_typed::<_, colortype::RGB16>(encoder, w, h, &data, tags),
    }
}

/// 8-bit gray where sample 0 is white.
struct WhiteIsZero8;

impl EncodeColor for WhiteIsZero8 {
    type Inner = u8;
    const TIFF_VALUE: PhotometricInterpretation = PhotometricInterpretation::WhiteIsZero;
    const BITS_PER_SAMPLE: &'static [u16] = &[8];
    const SAMPLE_FORMAT: &'static [SampleFormat] = &[SampleFormat::Uint];

    fn horizontal_predict(row: &[u8], result: &mut Vec<u8>) {
        <colortype::Gray8 as EncodeColor>::horizontal_predict(row, result);
    }
}

fn write_typed<W: Write + Seek, C: EncodeColor>(
    encoder: &mut TiffEncoder<W>,
    width: u32,
    height: u32,
    data: &[C::Inner],
    tags: &PageTags<'_>,
) -> IoResult<()>
where
    [C::Inner]: TiffValue,
{
    let mut image = encoder.new_image::<C>(width, height).map_err(encode_err)?;
    if let Some(text) = tags.description {
        image
            .encoder()
            .write_tag(Tag::ImageDescription, text)
            .map_err(encode_err)?;
    }
    if let Some(res) = tags.resolution {
        let (n, d) = to_rational(res.x);
        image.x_resolution(Rational { n, d });
        let (n, d) = to_rational(res.y);
        image.y_resolution(Rational { n, d });
        image.resolution_unit(match res.unit {
            ResolutionUnit::None => TiffResolutionUnit::None,
            ResolutionUnit::Inch => TiffResolutionUnit::Inch,
            ResolutionUnit::Centimeter => TiffResolutionUnit::Centimeter,
        });
    }
    image.write_data(data).map_err(encode_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ijio_core::RasterShape;

    fn encode(pages: &[RasterImage], metadata: &FileMetadata) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        write_tiff(pages, metadata, &mut buffer, TiffCompression::None).unwrap();
        buffer.into_inner()
    }

    fn gray8(w: u32, h: u32, data: Vec<u8>) -> RasterImage {
        RasterImage::new(Raster::single_band(w, h, DataBuffer::byte(data)).unwrap(), None)
    }

    #[test]
    fn test_tiff_roundtrip_gray8() {
        let data: Vec<u8> = (0..100).map(|i| (i * 2) as u8).collect();
        let bytes = encode(&[gray8(10, 10, data.clone())], &FileMetadata::default());
        let decoded = read_tiff(Cursor::new(bytes)).unwrap();
        assert_eq!(decoded.pages.len(), 1);
        let page = &decoded.pages[0];
        assert_eq!(page.shape(), RasterShape::SingleBand(ijio_core::SampleType::Byte));
        assert_eq!(page.raster().data_buffer().data(), &ijio_core::BufferData::Byte(vec![data]));
    }

    #[test]
    fn test_tiff_compression_formats() {
        let data: Vec<u8> = (0..64).map(|i| (i % 4) as u8 * 60).collect();
        for compression in [
            TiffCompression::None,
            TiffCompression::PackBits,
            TiffCompression::Lzw,
            TiffCompression::Zip,
        ] {
            let mut buffer = Cursor::new(Vec::new());
            write_tiff(&[gray8(8, 8, data.clone())], &FileMetadata::default(), &mut buffer, compression)
                .unwrap();
            let decoded = read_tiff(Cursor::new(buffer.into_inner())).unwrap();
            assert_eq!(decoded.pages[0].raster().sample(3, 0, 0), Some(180.0), "{compression:?}");
        }
    }

    #[test]
    fn test_tiff_multipage() {
        let pages = [gray8(4, 4, vec![1; 16]), gray8(4, 4, vec![2; 16]), gray8(4, 4, vec![3; 16])];
        let bytes = encode(&pages, &FileMetadata::default());
        let decoded = read_tiff(Cursor::new(bytes)).unwrap();
        assert_eq!(decoded.pages.len(), 3);
        assert_eq!(decoded.pages[2].raster().sample(0, 0, 0), Some(3.0));
    }

    #[test]
    fn test_tiff_metadata_roundtrip() {
        let metadata = FileMetadata {
            description: Some("ImageJ=1.54f\nunit=mm\n".to_string()),
            resolution: Some(Resolution {
                x: 1.0 / 17.0,
                y: 1.0 / 23.0,
                unit: ResolutionUnit::None,
            }),
        };
        let bytes = encode(&[gray8(2, 2, vec![0; 4])], &metadata);
        let decoded = read_tiff(Cursor::new(bytes)).unwrap();
        assert_eq!(decoded.metadata.description, metadata.description);
        let res = decoded.metadata.resolution.unwrap();
        assert!((1.0 / res.x - 17.0).abs() < 1e-6);
        assert!((1.0 / res.y - 23.0).abs() < 1e-6);
        assert_eq!(res.unit, ResolutionUnit::None);
    }

    #[test]
    fn test_tiff_float_and_rgb16() {
        let float = RasterImage::new(
            Raster::single_band(2, 1, DataBuffer::float(vec![-0.5, 1.5])).unwrap(),
            None,
        );
        let rgb48 = RasterImage::new(
            Raster::interleaved(1, 1, 3, DataBuffer::ushort(vec![100, 200, 300])).unwrap(),
            Some(ColorModel::Component(ComponentColorModel::srgb(16))),
        );
        for (page, shape) in [
            (float, RasterShape::SingleBand(ijio_core::SampleType::Float)),
            (
                rgb48,
                RasterShape::MultiBand {
                    bands: 3,
                    sample_type: ijio_core::SampleType::UShort,
                },
            ),
        ] {
            let bytes = encode(std::slice::from_ref(&page), &FileMetadata::default());
            let decoded = read_tiff(Cursor::new(bytes)).unwrap();
            assert_eq!(decoded.pages[0].shape(), shape);
            assert_eq!(decoded.pages[0].raster(), page.raster());
        }
    }

    #[test]
    fn test_tiff_inverted_binary_written_white_is_zero() {
        let raster = Raster::packed(2, 1, 1, vec![0b1000_0000]).unwrap();
        let page = RasterImage::new(raster, Some(ColorModel::Indexed(Palette::binary(true))));
        let bytes = encode(&[page], &FileMetadata::default());

        let mut decoder = Decoder::new(Cursor::new(bytes.clone())).unwrap();
        assert_eq!(decoder.get_tag_u32(Tag::PhotometricInterpretation).unwrap(), 0);

        let decoded = read_tiff(Cursor::new(bytes)).unwrap();
        let page = &decoded.pages[0];
        assert_eq!(page.raster().data_buffer().data(), &ijio_core::BufferData::Byte(vec![vec![255, 0]]));
        let palette = page.color_model().and_then(ColorModel::palette).unwrap();
        assert!(palette.is_inverted_gray_ramp());
    }

    #[test]
    fn test_tiff_rejects_garbage() {
        assert!(matches!(
            read_tiff(Cursor::new(b"II*\0garbage".to_vec())),
            Err(IoError::DecodeError(_))
        ));
    }
}
