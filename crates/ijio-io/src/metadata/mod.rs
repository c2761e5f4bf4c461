//! File-level metadata carried alongside decoded and encoded pages
//!
//! TIFF keeps both in tags and PNG in `tEXt`/`pHYs` chunks. PNM and JPEG
//! drop it.

mod description;
mod resolution;

pub use description::{ImageDescription, MAGIC, WRITER_VERSION};
pub use resolution::{Resolution, ResolutionUnit, from_rational, to_rational};

use ijio_core::Image;

/// Description text and resolution of a file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileMetadata {
    /// Raw `ImageDescription` tag text
    pub description: Option<String>,
    /// Resolution tags
    pub resolution: Option<Resolution>,
}

impl FileMetadata {
    /// Metadata to write for an image.
    ///
    /// Without `include_calibration` only the layout and display range
    /// are described and no resolution is written.
    pub fn from_image(image: &Image, include_calibration: bool) -> Self {
        let description = ImageDescription::from_image(image);
        let (description, resolution) = if include_calibration {
            (description, Resolution::from_calibration(image.calibration()))
        } else {
            (description.without_calibration(), None)
        };
        Self {
            description: Some(description.to_text()),
            resolution,
        }
    }

    /// Restore metadata on a decoded image.
    ///
    /// Resolution comes first so that a description unit wins over the
    /// resolution unit. Descriptions not written in the `ImageJ` form are
    /// kept as the image's info text.
    pub fn apply(&self, image: &mut Image) {
        if let Some(res) = &self.resolution {
            res.apply_to(image.calibration_mut());
        }
        let Some(text) = self.description.as_deref() else {
            return;
        };
        match ImageDescription::parse(text) {
            Some(d) => d.apply(image),
            None if !text.trim().is_empty() => image.set_info(Some(text.to_string())),
            None => {}
        }
    }
}
