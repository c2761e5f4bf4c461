//! Provider registry regression test
//!
//! Provider choice follows the caller's preference list, falling back to
//! registration order.

use ijio_core::{Image, RasterImage};
use ijio_io::metadata::FileMetadata;
use ijio_io::{
    CodecProvider, DecodedFile, ImageFormat, IoConfig, IoError, IoResult, ProviderRegistry,
    read_image_with, write_image_with,
};
use ijio_test::{RegParams, synth};

/// PNM wrapper that tags its output so the chosen provider is visible.
struct TaggedPnm;

impl CodecProvider for TaggedPnm {
    fn id(&self) -> &str {
        "pnm-tagged"
    }

    fn format(&self) -> ImageFormat {
        ImageFormat::Pnm
    }

    fn decode(&self, data: &[u8]) -> IoResult<DecodedFile> {
        ijio_io::pnm::PnmProvider.decode(data)
    }

    fn encode(
        &self,
        pages: &[RasterImage],
        metadata: &FileMetadata,
        config: &IoConfig,
    ) -> IoResult<Vec<u8>> {
        let mut data = ijio_io::pnm::PnmProvider.encode(pages, metadata, config)?;
        // Trailing bytes after the raster are ignored on read
        data.extend_from_slice(b"\ntagged");
        Ok(data)
    }
}

#[test]
fn registry_reg() {
    let mut rp = RegParams::new("registry");

    let mut registry = ProviderRegistry::with_builtin();
    registry.register(TaggedPnm);
    let image = Image::from_processor("r", synth::gradient_byte(5, 5));

    // Test 0: without preferences the first registered provider wins
    let plain = write_image_with(&registry, &image, ImageFormat::Pnm, &IoConfig::default()).unwrap();
    rp.compare_values(0.0, if plain.ends_with(b"tagged") { 1.0 } else { 0.0 }, 0.0);

    // Test 1-2: a preference selects the later provider and still reads back
    let config = IoConfig::builder().preferred_providers(["nope", "pnm-tagged"]).build();
    let tagged = write_image_with(&registry, &image, ImageFormat::Pnm, &config).unwrap();
    rp.compare_values(1.0, if tagged.ends_with(b"tagged") { 1.0 } else { 0.0 }, 0.0);
    let back = read_image_with(&registry, &tagged, None, "tagged", &config).unwrap();
    rp.compare_processors(image.processor(), back.processor());

    // Test 3: an empty registry has nothing to offer
    let empty = ProviderRegistry::new();
    let missing = matches!(
        write_image_with(&empty, &image, ImageFormat::Tiff, &IoConfig::default()),
        Err(IoError::UnsupportedFormat(_))
    );
    rp.compare_values(1.0, if missing { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "registry regression test failed");
}
