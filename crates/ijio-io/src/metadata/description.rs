//! ImageJ-style TIFF image description
//!
//! The description is a block of `key=value` lines starting with
//! `ImageJ=<version>`:
//!
//! ```text
//! ImageJ=1.54f
//! images=3
//! channels=3
//! mode=composite
//! unit=micron
//! min=0.0
//! max=4095.0
//! ```
//!
//! Unknown keys are ignored. Values that do not parse are logged and
//! skipped, so one bad field never loses the rest of the metadata.

use std::fmt::Write as _;
use std::str::FromStr;

use ijio_core::calibration::DEFAULT_UNIT;
use ijio_core::{CalibrationFunction, ChannelMode, FunctionKind, Image, ProcessorKind};

/// Leading key of every description this module reads or writes.
pub const MAGIC: &str = "ImageJ";

/// Version written after the magic key.
pub const WRITER_VERSION: &str = "1.54f";

const DEFAULT_TIME_UNIT: &str = "sec";
const MICRO_SIGN: &str = "\u{00B5}";
const MICRO_ESCAPE: &str = "\\u00B5";

/// Parsed description fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageDescription {
    /// Writer version
    pub version: String,
    /// Number of images in the file
    pub images: Option<usize>,
    /// Channel count
    pub channels: Option<usize>,
    /// Z-slice count
    pub slices: Option<usize>,
    /// Time frame count
    pub frames: Option<usize>,
    /// Whether the stack is a hyperstack
    pub hyperstack: bool,
    /// Channel display mode
    pub mode: Option<ChannelMode>,
    /// X unit (also y and z unless overridden)
    pub unit: Option<String>,
    /// Y unit
    pub y_unit: Option<String>,
    /// Z unit
    pub z_unit: Option<String>,
    /// Time unit
    pub time_unit: Option<String>,
    pub x_origin: Option<f64>,
    pub y_origin: Option<f64>,
    pub z_origin: Option<f64>,
    /// Time between frames
    pub frame_interval: Option<f64>,
    /// Animation rate
    pub fps: Option<f64>,
    /// Animation loops
    pub looping: bool,
    /// Calibration function id (`cf`)
    pub function: Option<i32>,
    /// Calibration coefficients `c0..c4`
    pub coefficients: Vec<f64>,
    /// Calibrated value unit
    pub value_unit: Option<String>,
    /// Clip negative calibrated values to zero
    pub zero_clip: bool,
    /// Slice spacing
    pub spacing: Option<f64>,
    /// Display range minimum
    pub min: Option<f64>,
    /// Display range maximum
    pub max: Option<f64>,
}

fn field<T: FromStr>(key: &str, value: &str) -> Option<T> {
    match value.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value, "unparseable description field skipped");
            None
        }
    }
}

fn unescape_unit(value: &str) -> String {
    value.replace(MICRO_ESCAPE, MICRO_SIGN)
}

fn escape_unit(value: &str) -> String {
    value.replace(MICRO_SIGN, MICRO_ESCAPE)
}

impl ImageDescription {
    /// Parse a description blob.
    ///
    /// Returns `None` unless the text starts with the `ImageJ` key.
    pub fn parse(text: &str) -> Option<Self> {
        if !text.starts_with(MAGIC) {
            return None;
        }
        let mut d = Self::default();
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                MAGIC => d.version = value.to_string(),
                "images" => d.images = field(key, value),
                "channels" => d.channels = field(key, value),
                "slices" => d.slices = field(key, value),
                "frames" => d.frames = field(key, value),
                "hyperstack" => d.hyperstack = value == "true",
                "mode" => {
                    d.mode = ChannelMode::parse(value);
                    if d.mode.is_none() {
                        tracing::warn!(key, value, "unknown channel mode skipped");
                    }
                }
                "unit" => d.unit = Some(unescape_unit(value)),
                "yunit" => d.y_unit = Some(unescape_unit(value)),
                "zunit" => d.z_unit = Some(unescape_unit(value)),
                "tunit" => d.time_unit = Some(unescape_unit(value)),
                "xorigin" => d.x_origin = field(key, value),
                "yorigin" => d.y_origin = field(key, value),
                "zorigin" => d.z_origin = field(key, value),
                "finterval" => d.frame_interval = field(key, value),
                "fps" => d.fps = field(key, value),
                "loop" => d.looping = value == "true",
                "cf" => d.function = field(key, value),
                "c0" | "c1" | "c2" | "c3" | "c4" => {
                    let index = usize::from(key.as_bytes()[1] - b'0');
                    if let Some(c) = field(key, value) {
                        if d.coefficients.len() <= index {
                            d.coefficients.resize(index + 1, 0.0);
                        }
                        d.coefficients[index] = c;
                    }
                }
                "vunit" => d.value_unit = Some(value.to_string()),
                "zeroclip" => d.zero_clip = value == "true",
                "spacing" => d.spacing = field(key, value),
                "min" => d.min = field(key, value),
                "max" => d.max = field(key, value),
                _ => {}
            }
        }
        Some(d)
    }

    /// Describe an image: its layout, calibration and display range.
    pub fn from_image(image: &Image) -> Self {
        let mut d = Self {
            version: WRITER_VERSION.to_string(),
            ..Self::default()
        };

        let n = image.stack_size();
        let (c, z, t) = image.dimensions();
        let above_one = |v: usize| (v > 1).then_some(v);
        d.images = above_one(n);
        d.channels = above_one(c);
        d.slices = above_one(z);
        d.frames = above_one(t);
        d.hyperstack = image.is_hyperstack();
        if c > 1 {
            d.mode = image.mode();
        }

        let cal = image.calibration();
        if cal.unit() != DEFAULT_UNIT {
            d.unit = Some(cal.unit().to_string());
        }
        if cal.has_axis_units() {
            d.y_unit = Some(cal.y_unit().to_string());
            d.z_unit = Some(cal.z_unit().to_string());
        }
        if let Some(f) = cal.function()
            && f.kind() != FunctionKind::None
        {
            d.function = Some(f.kind().id());
            d.coefficients = f.coefficients().to_vec();
            d.value_unit = Some(f.value_unit().to_string()).filter(|u| !u.is_empty());
            d.zero_clip = f.zero_clip();
        }
        if cal.time_unit() != DEFAULT_TIME_UNIT {
            d.time_unit = Some(cal.time_unit().to_string());
        }
        let nonzero = |v: f64| (v != 0.0).then_some(v);
        d.frame_interval = nonzero(cal.frame_interval);
        d.fps = nonzero(cal.fps);
        d.looping = cal.looping;
        d.x_origin = nonzero(cal.x_origin);
        d.y_origin = nonzero(cal.y_origin);
        d.z_origin = nonzero(cal.z_origin);
        if n > 1 && cal.pixel_depth != 1.0 {
            d.spacing = Some(cal.pixel_depth);
        }

        if matches!(image.kind(), ProcessorKind::Short | ProcessorKind::Float)
            && let Some((min, max)) = image.processor().display_range()
        {
            d.min = Some(min);
            d.max = Some(max);
        }
        d
    }

    /// Drop the spatial, temporal and value calibration fields.
    pub fn without_calibration(self) -> Self {
        Self {
            version: self.version,
            images: self.images,
            channels: self.channels,
            slices: self.slices,
            frames: self.frames,
            hyperstack: self.hyperstack,
            mode: self.mode,
            min: self.min,
            max: self.max,
            ..Self::default()
        }
    }

    /// Render as description text.
    pub fn to_text(&self) -> String {
        let mut s = String::new();
        let version = if self.version.is_empty() {
            WRITER_VERSION
        } else {
            &self.version
        };
        // Writing to a String cannot fail.
        let _ = writeln!(s, "{MAGIC}={version}");
        let mut put = |key: &str, value: &dyn std::fmt::Display| {
            let _ = writeln!(s, "{key}={value}");
        };

        if let Some(v) = self.images {
            put("images", &v);
        }
        if let Some(v) = self.channels {
            put("channels", &v);
        }
        if let Some(v) = self.slices {
            put("slices", &v);
        }
        if let Some(v) = self.frames {
            put("frames", &v);
        }
        if self.hyperstack {
            put("hyperstack", &true);
        }
        if let Some(mode) = self.mode {
            put("mode", &mode.as_str());
        }
        if let Some(u) = &self.unit {
            put("unit", &escape_unit(u));
        }
        if let Some(u) = &self.y_unit {
            put("yunit", &escape_unit(u));
        }
        if let Some(u) = &self.z_unit {
            put("zunit", &escape_unit(u));
        }
        if let Some(cf) = self.function {
            put("cf", &cf);
            for (i, c) in self.coefficients.iter().take(5).enumerate() {
                put(&format!("c{i}"), c);
            }
            if let Some(u) = &self.value_unit {
                put("vunit", u);
            }
            if self.zero_clip {
                put("zeroclip", &true);
            }
        }
        if let Some(u) = &self.time_unit {
            put("tunit", &escape_unit(u));
        }
        if let Some(v) = self.frame_interval {
            put("finterval", &v);
        }
        if let Some(v) = self.fps {
            put("fps", &v);
        }
        if self.looping {
            put("loop", &true);
        }
        if let Some(v) = self.x_origin {
            put("xorigin", &v);
        }
        if let Some(v) = self.y_origin {
            put("yorigin", &v);
        }
        if let Some(v) = self.z_origin {
            put("zorigin", &v);
        }
        if let Some(v) = self.spacing {
            put("spacing", &v);
        }
        if let Some(v) = self.min {
            put("min", &v);
        }
        if let Some(v) = self.max {
            put("max", &v);
        }
        s
    }

    /// Restore layout, calibration and display range on a decoded image.
    ///
    /// Dimensions that do not multiply to the stack size are logged and
    /// left alone.
    pub fn apply(&self, image: &mut Image) {
        if self.channels.or(self.slices).or(self.frames).is_some() {
            let c = self.channels.unwrap_or(1);
            let z = self.slices.unwrap_or(1);
            let t = self.frames.unwrap_or(1);
            if image.set_dimensions(c, z, t).is_err() {
                tracing::warn!(
                    channels = c,
                    slices = z,
                    frames = t,
                    stack = image.stack_size(),
                    "description dimensions do not match the stack, ignored"
                );
            } else if c > 1 {
                image.set_mode(self.mode);
            }
        }

        let cal = image.calibration_mut();
        if let Some(u) = &self.unit {
            cal.set_unit(u.clone());
        }
        cal.set_y_unit(self.y_unit.clone());
        cal.set_z_unit(self.z_unit.clone());
        if let Some(u) = &self.time_unit {
            cal.set_time_unit(u.clone());
        }
        if let Some(v) = self.x_origin {
            cal.x_origin = v;
        }
        if let Some(v) = self.y_origin {
            cal.y_origin = v;
        }
        if let Some(v) = self.z_origin {
            cal.z_origin = v;
        }
        if let Some(v) = self.frame_interval {
            cal.frame_interval = v;
        }
        if let Some(v) = self.fps {
            cal.fps = v;
        }
        cal.looping = self.looping;
        if let Some(v) = self.spacing {
            cal.pixel_depth = v;
        }

        if let Some(id) = self.function {
            match FunctionKind::from_id(id) {
                Some(kind) => {
                    let unit = self.value_unit.clone().unwrap_or_default();
                    match CalibrationFunction::new(kind, self.coefficients.clone(), unit) {
                        Ok(f) => cal.set_function(Some(f.with_zero_clip(self.zero_clip))),
                        Err(e) => tracing::warn!(cf = id, error = %e, "calibration function skipped"),
                    }
                }
                None => tracing::warn!(cf = id, "unknown calibration function skipped"),
            }
        }

        if let (Some(min), Some(max)) = (self.min, self.max) {
            for i in 0..image.stack_size() {
                if let Some(p) = image.stack_mut().processor_mut(i) {
                    p.set_display_range(min, max);
                }
            }
        }
    }
}
