//! ijio-io - Codec bridge for the ijio image model
//!
//! Reads files into [`Image`]s and writes them back through pluggable
//! codec providers:
//!
//! - TIFF (multi-page, with ImageJ description and resolution metadata)
//! - PNG
//! - PNM (PBM/PGM/PPM)
//! - JPEG
//!
//! Each codec can be disabled through its cargo feature.
//!
//! # Example
//!
//! ```no_run
//! use ijio_io::{ImageFormat, IoConfig, read_image, write_image};
//!
//! let config = IoConfig::default();
//! let image = read_image("stack.tif", &config)?;
//! write_image(&image, "copy.tif", ImageFormat::Tiff, &config)?;
//! # Ok::<(), ijio_io::IoError>(())
//! ```

mod error;
mod format;
pub mod metadata;
mod options;
mod page;
pub mod registry;

#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png-format")]
pub mod png;
#[cfg(feature = "pnm")]
pub mod pnm;
#[cfg(feature = "tiff-format")]
pub mod tiff;

pub use error::{IoError, IoResult};
pub use format::{ImageFormat, detect_format, detect_format_from_bytes};
pub use metadata::{FileMetadata, ImageDescription, Resolution, ResolutionUnit};
pub use options::{DEFAULT_JPEG_QUALITY, IoConfig, IoConfigBuilder, TiffCompression};
pub use registry::{CodecProvider, DecodedFile, ProviderRegistry};

use std::fs;
use std::path::Path;

use ijio_core::{ChannelMode, Image, ImageStack, RasterImage, slice_to_raster_image, to_image};

/// Title given to images read from memory.
pub const UNTITLED: &str = "untitled";

/// Read an image file with the built-in providers.
///
/// The format is sniffed from the file's bytes, falling back to its
/// extension. The title is the file name without extension.
pub fn read_image<P: AsRef<Path>>(path: P, config: &IoConfig) -> IoResult<Image> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let format = match detect_format_from_bytes(&data) {
        Ok(format) => format,
        Err(e) => ImageFormat::from_path(path).ok_or(e)?,
    };
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNTITLED.to_string());
    read_image_with(ProviderRegistry::global(), &data, Some(format), &title, config)
}

/// Read an image from memory with the built-in providers.
pub fn read_image_mem(data: &[u8], config: &IoConfig) -> IoResult<Image> {
    read_image_with(ProviderRegistry::global(), data, None, UNTITLED, config)
}

/// Read an image from memory through a registry.
///
/// Without `format` the bytes are sniffed. Pages of equal size and kind
/// become one stack; otherwise only the first page is kept. File metadata
/// is applied last.
pub fn read_image_with(
    registry: &ProviderRegistry,
    data: &[u8],
    format: Option<ImageFormat>,
    title: &str,
    config: &IoConfig,
) -> IoResult<Image> {
    let format = match format {
        Some(format) => format,
        None => detect_format_from_bytes(data)?,
    };
    let provider = registry.lookup(format, &config.preferred_providers)?;
    let decoded = provider.decode(data)?;
    tracing::debug!(
        provider = provider.id(),
        pages = decoded.pages.len(),
        "decoded"
    );

    let mut image = assemble(title, decoded.pages)?;
    decoded.metadata.apply(&mut image);
    Ok(image)
}

/// Turn decoded pages into one image.
fn assemble(title: &str, pages: Vec<RasterImage>) -> IoResult<Image> {
    let page_count = pages.len();
    let mut images = pages
        .into_iter()
        .map(|page| to_image(title, page))
        .collect::<Result<Vec<_>, _>>()?;

    let Some(first) = images.first() else {
        return Err(IoError::InvalidData("file holds no pages".to_string()));
    };
    if page_count == 1 {
        return Ok(images.remove(0));
    }

    let (width, height, kind) = (first.width(), first.height(), first.kind());
    let per_page = first.stack_size();
    let uniform = images.iter().all(|img| {
        img.width() == width
            && img.height() == height
            && img.kind() == kind
            && img.stack_size() == per_page
    });
    if !uniform {
        tracing::warn!(
            pages = page_count,
            "pages differ in size or type, keeping the first page only"
        );
        return Ok(images.remove(0));
    }

    let composite = first.is_composite();
    let calibration = first.calibration().clone();
    let mut stack = ImageStack::new(width, height)?;
    for img in images {
        let labels: Vec<Option<String>> = (0..img.stack_size())
            .map(|i| img.stack().label(i).map(str::to_string))
            .collect();
        for (processor, label) in img.into_stack().into_processors().into_iter().zip(labels) {
            stack.push(processor, label)?;
        }
    }

    let mut image = Image::from_stack(title, stack)?;
    image.set_calibration(calibration);
    if composite {
        image.set_dimensions(per_page, page_count, 1)?;
        image.set_mode(Some(ChannelMode::Composite));
    }
    Ok(image)
}

/// Write an image file with the built-in providers.
pub fn write_image<P: AsRef<Path>>(
    image: &Image,
    path: P,
    format: ImageFormat,
    config: &IoConfig,
) -> IoResult<()> {
    let data = write_image_mem(image, format, config)?;
    fs::write(path, data)?;
    Ok(())
}

/// Encode an image in memory with the built-in providers.
pub fn write_image_mem(image: &Image, format: ImageFormat, config: &IoConfig) -> IoResult<Vec<u8>> {
    write_image_with(ProviderRegistry::global(), image, format, config)
}

/// Encode an image through a registry.
///
/// Multi-page providers get every slice; the others get the current one.
pub fn write_image_with(
    registry: &ProviderRegistry,
    image: &Image,
    format: ImageFormat,
    config: &IoConfig,
) -> IoResult<Vec<u8>> {
    let provider = registry.lookup(format, &config.preferred_providers)?;

    let indices: Vec<usize> = if provider.supports_multipage() {
        (0..image.stack_size()).collect()
    } else {
        if image.stack_size() > 1 {
            tracing::debug!(
                provider = provider.id(),
                slices = image.stack_size(),
                "single-page format, writing the current slice"
            );
        }
        vec![image.current_slice()]
    };
    let pages = indices
        .into_iter()
        .map(|i| slice_to_raster_image(image, i, config.prefer_binary))
        .collect::<Result<Vec<_>, _>>()?;

    let metadata = FileMetadata::from_image(image, config.write_calibration);
    provider.encode(&pages, &metadata, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ijio_core::{ByteProcessor, Processor, ShortProcessor};

    fn short(v: u16) -> Processor {
        ShortProcessor::from_pixels(2, 2, vec![v; 4]).unwrap().into()
    }

    #[test]
    fn test_mixed_pages_keep_first() {
        let pages = vec![
            ijio_core::to_raster_image(&short(5), false).unwrap(),
            ijio_core::to_raster_image(&ByteProcessor::new(2, 2).unwrap().into(), false).unwrap(),
        ];
        let image = assemble("mixed", pages).unwrap();
        assert_eq!(image.stack_size(), 1);
        assert_eq!(image.processor().value(0, 0), Some(5.0));
    }

    #[test]
    fn test_uniform_pages_stack() {
        let pages = (1..=3)
            .map(|v| ijio_core::to_raster_image(&short(v), false).unwrap())
            .collect();
        let image = assemble("z", pages).unwrap();
        assert_eq!(image.dimensions(), (1, 3, 1));
        assert_eq!(image.stack().processor(2).and_then(|p| p.value(1, 1)), Some(3.0));
    }

    #[test]
    fn test_no_pages_is_invalid() {
        assert!(matches!(assemble("none", Vec::new()), Err(IoError::InvalidData(_))));
    }

    #[cfg(feature = "pnm")]
    #[test]
    fn test_single_page_format_writes_current_slice() {
        let stack = ImageStack::from_processors(vec![
            ByteProcessor::from_pixels(1, 1, vec![10]).unwrap().into(),
            ByteProcessor::from_pixels(1, 1, vec![20]).unwrap().into(),
        ])
        .unwrap();
        let mut image = Image::from_stack("s", stack).unwrap();
        image.set_slice(1).unwrap();
        let config = IoConfig::default();
        let bytes = write_image_mem(&image, ImageFormat::Pnm, &config).unwrap();
        let back = read_image_mem(&bytes, &config).unwrap();
        assert_eq!(back.stack_size(), 1);
        assert_eq!(back.processor().value(0, 0), Some(20.0));
    }
}
