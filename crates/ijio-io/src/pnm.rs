//! PNM (Portable Any Map) format support
//!
//! Reads PBM, PGM and PPM in both ASCII (P1/P2/P3) and binary
//! (P4/P5/P6) form. Writes the binary forms only: P4 for bilevel pages,
//! P5 for 8/16-bit gray and P6 for color.
//!
//! PBM stores 1 for black, so bilevel pages come back with an inverted
//! binary palette.

use std::io::{Cursor, Read, Write};

use ijio_core::{
    ColorModel, ComponentColorModel, DataBuffer, Palette, Raster, RasterImage, SampleModel,
    convert::pack_bits,
};

use crate::metadata::FileMetadata;
use crate::page::{PageData, classify, expand_palette, fit, palette_gray};
use crate::registry::{CodecProvider, DecodedFile};
use crate::{ImageFormat, IoConfig, IoError, IoResult};

/// Native PNM provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct PnmProvider;

impl CodecProvider for PnmProvider {
    fn id(&self) -> &str {
        "pnm-native"
    }

    fn format(&self) -> ImageFormat {
        ImageFormat::Pnm
    }

    fn decode(&self, data: &[u8]) -> IoResult<DecodedFile> {
        Ok(DecodedFile::single(read_pnm(Cursor::new(data))?))
    }

    fn encode(
        &self,
        pages: &[RasterImage],
        _metadata: &FileMetadata,
        _config: &IoConfig,
    ) -> IoResult<Vec<u8>> {
        let page = pages
            .first()
            .ok_or_else(|| IoError::InvalidData("no pages to write".to_string()))?;
        let mut buffer = Vec::new();
        write_pnm(page, &mut buffer)?;
        Ok(buffer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Bitmap,
    Graymap,
    Pixmap,
}

impl Kind {
    fn channels(self) -> usize {
        match self {
            Kind::Pixmap => 3,
            _ => 1,
        }
    }
}

/// Byte cursor over a whole PNM file.
struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Skip whitespace and `#` comments.
    fn skip_space(&mut self) {
        while let Some(&b) = self.data.get(self.pos) {
            if b == b'#' {
                while self.data.get(self.pos).is_some_and(|&c| c != b'\n' && c != b'\r') {
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn number(&mut self) -> IoResult<u32> {
        self.skip_space();
        let start = self.pos;
        while self.data.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.data[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                IoError::DecodeError(format!("PNM: expected a number at byte {}", start))
            })
    }

    /// ASCII sample of a P2/P3 raster, at most `maxval`.
    fn sample(&mut self, maxval: u32) -> IoResult<u32> {
        let value = self.number()?;
        if value > maxval {
            return Err(IoError::InvalidData(format!(
                "PNM sample {} above maxval {} before byte {}",
                value, maxval, self.pos
            )));
        }
        Ok(value)
    }

    /// Single ASCII bit of a P1 raster; digits need no separator.
    fn bit(&mut self) -> IoResult<u8> {
        self.skip_space();
        match self.data.get(self.pos) {
            Some(&b @ (b'0' | b'1')) => {
                self.pos += 1;
                Ok(b - b'0')
            }
            _ => Err(IoError::DecodeError(format!(
                "PNM: expected 0 or 1 at byte {}",
                self.pos
            ))),
        }
    }

    /// Binary raster after the header's single whitespace byte.
    fn rest(&self) -> &'a [u8] {
        self.data.get(self.pos + 1..).unwrap_or_default()
    }
}

/// Read a PNM image (P1-P6) from a reader.
pub fn read_pnm<R: Read>(mut reader: R) -> IoResult<RasterImage> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let (kind, ascii) = match data.get(..2) {
        Some(b"P1") => (Kind::Bitmap, true),
        Some(b"P2") => (Kind::Graymap, true),
        Some(b"P3") => (Kind::Pixmap, true),
        Some(b"P4") => (Kind::Bitmap, false),
        Some(b"P5") => (Kind::Graymap, false),
        Some(b"P6") => (Kind::Pixmap, false),
        _ => {
            return Err(IoError::UnsupportedFormat(
                "not a P1-P6 PNM file".to_string(),
            ));
        }
    };

    let mut scanner = Scanner::new(&data);
    scanner.pos = 2;
    let width = scanner.number()?;
    let height = scanner.number()?;
    let maxval = if kind == Kind::Bitmap { 1 } else { scanner.number()? };
    if maxval == 0 || maxval > 65535 {
        return Err(IoError::InvalidData(format!("PNM maxval {} out of range", maxval)));
    }
    if width == 0 || height == 0 {
        return Err(ijio_core::Error::InvalidDimension { width, height }.into());
    }
    tracing::debug!(?kind, ascii, width, height, maxval, "PNM header");

    let n = sample_count(width, height, 1)?;
    if kind == Kind::Bitmap {
        let packed = if ascii {
            let bits = (0..n).map(|_| scanner.bit()).collect::<IoResult<Vec<u8>>>()?;
            pack_bits(width, height, &bits)?
        } else {
            let len = SampleModel::MultiPixelPacked { bits: 1 }.required_len(width, height);
            fit(scanner.rest().to_vec(), len)?
        };
        let raster = Raster::packed(width, height, 1, packed)?;
        return Ok(RasterImage::new(
            raster,
            Some(ColorModel::Indexed(Palette::binary(true))),
        ));
    }

    let count = sample_count(width, height, kind.channels())?;
    let wide = maxval > 255;
    let buffer = if ascii {
        let values = (0..count)
            .map(|_| scanner.sample(maxval))
            .collect::<IoResult<Vec<u32>>>()?;
        if wide {
            DataBuffer::ushort(values.into_iter().map(|v| v as u16).collect())
        } else {
            DataBuffer::byte(values.into_iter().map(|v| v as u8).collect())
        }
    } else if wide {
        let len = count
            .checked_mul(2)
            .ok_or_else(|| IoError::InvalidData(format!("PNM size {}x{} overflows", width, height)))?;
        let bytes = fit(scanner.rest().to_vec(), len)?;
        DataBuffer::ushort(
            bytes
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect(),
        )
    } else {
        DataBuffer::byte(fit(scanner.rest().to_vec(), count)?)
    };

    let bits = if wide { 16 } else { 8 };
    Ok(match kind {
        Kind::Pixmap => RasterImage::new(
            Raster::interleaved(width, height, 3, buffer)?,
            Some(ColorModel::Component(ComponentColorModel::srgb(bits))),
        ),
        _ => RasterImage::new(Raster::single_band(width, height, buffer)?, None),
    })
}

/// Samples in a `width x height` raster with `per_pixel` samples each.
fn sample_count(width: u32, height: u32, per_pixel: usize) -> IoResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(per_pixel))
        .ok_or_else(|| IoError::InvalidData(format!("PNM size {}x{} overflows", width, height)))
}

/// Write a raster image as binary PNM.
///
/// Chooses P4 for bilevel pages, P5 for 8/16-bit gray and P6 for color.
///
/// # Errors
///
/// Float pages have no PNM form.
pub fn write_pnm<W: Write>(ri: &RasterImage, mut writer: W) -> IoResult<()> {
    let (width, height) = (ri.width(), ri.height());

    let (magic, maxval, body) = match classify(ri)? {
        PageData::Bilevel { samples, inverted } => {
            // Bit set = black
            let black: Vec<u8> = samples
                .iter()
                .map(|&s| u8::from((s != 0) == inverted))
                .collect();
            ("P4", None, pack_bits(width, height, &black)?)
        }
        PageData::Gray8(data) => ("P5", Some(255), data.into_owned()),
        PageData::Indexed8 { indices, palette } if palette.is_grayscale() => {
            ("P5", Some(255), palette_gray(&indices, palette))
        }
        PageData::Indexed8 { indices, palette } => {
            ("P6", Some(255), expand_palette(&indices, palette))
        }
        PageData::Gray16(data) => ("P5", Some(65535), be_bytes(&data)),
        PageData::Rgb8(data) => ("P6", Some(255), data.into_owned()),
        PageData::Rgb16(data) => ("P6", Some(65535), be_bytes(&data)),
        PageData::Float32(_) => {
            return Err(IoError::UnsupportedFormat(
                "PNM cannot hold 32-bit float samples".to_string(),
            ));
        }
    };

    writeln!(writer, "{}\n{} {}", magic, width, height)?;
    if let Some(maxval) = maxval {
        writeln!(writer, "{}", maxval)?;
    }
    writer.write_all(&body)?;
    Ok(())
}

fn be_bytes(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|v| v.to_be_bytes()).collect()
}
