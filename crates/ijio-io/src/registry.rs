//! Codec provider registry
//!
//! Several providers may handle the same format. Callers pick among them
//! with an ordered list of preferred provider ids carried in
//! [`IoConfig`](crate::IoConfig); there is no process-wide preference.
//!
//! # Example
//!
//! ```ignore
//! use ijio_io::{ImageFormat, ProviderRegistry};
//!
//! let registry = ProviderRegistry::with_builtin();
//! let provider = registry.lookup(ImageFormat::Tiff, &["tiff-rs".to_string()])?;
//! assert_eq!(provider.id(), "tiff-rs");
//! ```

use std::sync::{Arc, OnceLock};

use ijio_core::RasterImage;

use crate::metadata::FileMetadata;
use crate::{ImageFormat, IoConfig, IoError, IoResult};

/// Pages and file metadata produced by a decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFile {
    /// One raster image per page, in file order
    pub pages: Vec<RasterImage>,
    /// Description and resolution, where the format stores them
    pub metadata: FileMetadata,
}

impl DecodedFile {
    /// A single page without metadata.
    pub fn single(page: RasterImage) -> Self {
        Self {
            pages: vec![page],
            metadata: FileMetadata::default(),
        }
    }
}

/// A codec for one file format.
pub trait CodecProvider: Send + Sync {
    /// Stable identifier used in preference lists (e.g. "tiff-rs").
    fn id(&self) -> &str;

    /// Format handled.
    fn format(&self) -> ImageFormat;

    /// Whether `encode` accepts more than one page.
    fn supports_multipage(&self) -> bool {
        false
    }

    /// Decode a whole file.
    fn decode(&self, data: &[u8]) -> IoResult<DecodedFile>;

    /// Encode pages into a file.
    ///
    /// Single-page providers receive exactly one page.
    fn encode(
        &self,
        pages: &[RasterImage],
        metadata: &FileMetadata,
        config: &IoConfig,
    ) -> IoResult<Vec<u8>>;
}

/// Registered providers, in registration order.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn CodecProvider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.id()))
            .finish()
    }
}

impl ProviderRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the providers enabled by cargo features.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        #[cfg(feature = "tiff-format")]
        registry.register(crate::tiff::TiffProvider);
        #[cfg(feature = "png-format")]
        registry.register(crate::png::PngProvider);
        #[cfg(feature = "pnm")]
        registry.register(crate::pnm::PnmProvider);
        #[cfg(feature = "jpeg")]
        registry.register(crate::jpeg::JpegProvider);
        registry
    }

    /// Shared registry with the built-in providers.
    pub fn global() -> &'static ProviderRegistry {
        static INSTANCE: OnceLock<ProviderRegistry> = OnceLock::new();
        INSTANCE.get_or_init(ProviderRegistry::with_builtin)
    }

    /// Add a provider after the existing ones.
    pub fn register<P: CodecProvider + 'static>(&mut self, provider: P) {
        self.providers.push(Arc::new(provider));
    }

    /// Providers for a format, in registration order.
    pub fn providers_for(&self, format: ImageFormat) -> impl Iterator<Item = &dyn CodecProvider> {
        self.providers
            .iter()
            .map(|p| p.as_ref())
            .filter(move |p| p.format() == format)
    }

    /// Ids of every registered provider.
    pub fn ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Pick a provider for a format.
    ///
    /// The first id in `preferred` that names a provider for `format` wins;
    /// otherwise the first provider registered for the format is used.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnsupportedFormat`] when no provider handles the
    /// format.
    pub fn lookup(&self, format: ImageFormat, preferred: &[String]) -> IoResult<&dyn CodecProvider> {
        let chosen = preferred
            .iter()
            .find_map(|id| self.providers_for(format).find(|p| p.id() == id))
            .or_else(|| self.providers_for(format).next());
        match chosen {
            Some(p) => {
                tracing::debug!(format = ?format, provider = p.id(), "codec provider selected");
                Ok(p)
            }
            None => Err(IoError::UnsupportedFormat(format!(
                "no provider registered for {:?}",
                format
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake(&'static str, ImageFormat);

    impl CodecProvider for Fake {
        fn id(&self) -> &str {
            self.0
        }

        fn format(&self) -> ImageFormat {
            self.1
        }

        fn decode(&self, _data: &[u8]) -> IoResult<DecodedFile> {
            Err(IoError::DecodeError(self.0.to_string()))
        }

        fn encode(&self, _: &[RasterImage], _: &FileMetadata, _: &IoConfig) -> IoResult<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    fn registry() -> ProviderRegistry {
        let mut r = ProviderRegistry::new();
        r.register(Fake("a", ImageFormat::Png));
        r.register(Fake("b", ImageFormat::Png));
        r.register(Fake("c", ImageFormat::Tiff));
        r
    }

    #[test]
    fn test_lookup_default_is_first_registered() {
        assert_eq!(registry().lookup(ImageFormat::Png, &[]).unwrap().id(), "a");
    }

    #[test]
    fn test_lookup_honors_preference_order() {
        let r = registry();
        let pref = vec!["zzz".to_string(), "c".to_string(), "b".to_string()];
        assert_eq!(r.lookup(ImageFormat::Png, &pref).unwrap().id(), "b");
        assert_eq!(r.lookup(ImageFormat::Tiff, &pref).unwrap().id(), "c");
    }

    #[test]
    fn test_lookup_missing_format() {
        let err = registry().lookup(ImageFormat::Jpeg, &[]).err().unwrap();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_builtin_ids() {
        let ids = ProviderRegistry::with_builtin().ids().join(",");
        assert_eq!(ids, "tiff-rs,png-rs,pnm-native,jpeg-rs");
    }
}
