//! ijio-core - Host image model, raster model and the conversions between them
//!
//! The host side is a [`Processor`] per plane, gathered into an
//! [`ImageStack`] and wrapped by an [`Image`] with its [`Calibration`].
//! The codec side is a [`RasterImage`]: a [`Raster`] of samples plus an
//! optional [`ColorModel`]. The [`convert`] module moves images between
//! the two.

pub mod calibration;
pub mod color_model;
pub mod convert;
pub mod error;
pub mod image;
pub mod palette;
pub mod processor;
pub mod raster;

pub use calibration::{Calibration, CalibrationFunction, FunctionKind};
pub use color_model::{
    Channel, ColorModel, ColorSpace, ComponentColorModel, FloatDoubleColorModel, RgbLut,
    Transparency,
};
pub use convert::{interpret, into_raster_image, slice_to_raster_image, to_image, to_raster_image};
pub use error::{Error, Result};
pub use image::{ChannelMode, Image, ImageStack};
pub use palette::{Palette, PaletteColor};
pub use processor::{
    BinaryProcessor, ByteProcessor, ColorProcessor, FloatProcessor, Processor, ProcessorKind,
    ShortProcessor, pack_rgb, unpack_rgb,
};
pub use raster::{BufferData, DataBuffer, Raster, RasterImage, RasterShape, SampleModel, SampleType};
