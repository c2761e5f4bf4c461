//! Read/write configuration

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiffCompression {
    /// No compression
    #[default]
    None,
    /// PackBits run-length compression
    PackBits,
    /// LZW compression
    Lzw,
    /// ZIP/Deflate compression
    Zip,
}

impl TiffCompression {
    /// Convert to tiff crate's Compression enum
    #[cfg(feature = "tiff-format")]
    pub(crate) fn to_tiff_compression(self) -> tiff::encoder::Compression {
        use tiff::encoder::Compression;
        match self {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::PackBits => Compression::Packbits,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::Zip => Compression::Deflate(tiff::encoder::DeflateLevel::default()),
        }
    }
}

/// Default JPEG quality
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Configuration shared by the read and write entry points
#[derive(Debug, Clone, PartialEq)]
pub struct IoConfig {
    /// Provider ids to try first, most preferred first
    pub preferred_providers: Vec<String>,
    /// Write 8-bit images holding only 0 and 255 as 1-bit data
    pub prefer_binary: bool,
    /// Compression for TIFF output
    pub tiff_compression: TiffCompression,
    /// JPEG quality, 1-100
    pub jpeg_quality: u8,
    /// Write spatial and value calibration into TIFF metadata
    pub write_calibration: bool,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            preferred_providers: Vec::new(),
            prefer_binary: false,
            tiff_compression: TiffCompression::None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            write_calibration: true,
        }
    }
}

impl IoConfig {
    pub fn builder() -> IoConfigBuilder {
        IoConfigBuilder::default()
    }
}

/// Builder for IoConfig
#[derive(Default)]
pub struct IoConfigBuilder {
    preferred_providers: Option<Vec<String>>,
    prefer_binary: Option<bool>,
    tiff_compression: Option<TiffCompression>,
    jpeg_quality: Option<u8>,
    write_calibration: Option<bool>,
}

impl IoConfigBuilder {
    /// Prefer these provider ids, in order.
    pub fn preferred_providers<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_providers = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn prefer_binary(mut self, enable: bool) -> Self {
        self.prefer_binary = Some(enable);
        self
    }

    pub fn tiff_compression(mut self, compression: TiffCompression) -> Self {
        self.tiff_compression = Some(compression);
        self
    }

    /// JPEG quality, clamped to 1-100 on build.
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = Some(quality);
        self
    }

    pub fn write_calibration(mut self, enable: bool) -> Self {
        self.write_calibration = Some(enable);
        self
    }

    pub fn build(self) -> IoConfig {
        let default = IoConfig::default();
        IoConfig {
            preferred_providers: self.preferred_providers.unwrap_or(default.preferred_providers),
            prefer_binary: self.prefer_binary.unwrap_or(default.prefer_binary),
            tiff_compression: self.tiff_compression.unwrap_or(default.tiff_compression),
            jpeg_quality: self.jpeg_quality.unwrap_or(default.jpeg_quality).clamp(1, 100),
            write_calibration: self.write_calibration.unwrap_or(default.write_calibration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        assert_eq!(IoConfig::builder().build(), IoConfig::default());
    }

    #[test]
    fn test_builder_overrides() {
        let config = IoConfig::builder()
            .preferred_providers(["png-rs", "other"])
            .prefer_binary(true)
            .tiff_compression(TiffCompression::Lzw)
            .jpeg_quality(0)
            .build();
        assert_eq!(config.preferred_providers, vec!["png-rs".to_string(), "other".to_string()]);
        assert!(config.prefer_binary);
        assert_eq!(config.tiff_compression, TiffCompression::Lzw);
        assert_eq!(config.jpeg_quality, 1);
        assert!(config.write_calibration);
    }
}
