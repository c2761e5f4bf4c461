//! Spatial, temporal and density calibration of an image

use crate::error::{Error, Result};

/// Default unit of an uncalibrated axis.
pub const DEFAULT_UNIT: &str = "pixel";

/// Calibration function family.
///
/// The numeric ids are the `cf=` values stored in TIFF descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// `a + b*x`
    StraightLine,
    /// `a + b*x + c*x^2`
    Poly2,
    /// `a + b*x + c*x^2 + d*x^3`
    Poly3,
    /// `a + b*x + c*x^2 + d*x^3 + e*x^4`
    Poly4,
    /// `a*exp(b*x)`
    Exponential,
    /// `a*x^b`
    Power,
    /// `a*ln(b*x)`
    Log,
    /// `d + (a - d)/(1 + (x/c)^b)`
    Rodbard,
    /// `b*(x - a)^c*exp(-(x - a)/d)`
    GammaVariate,
    /// `a + b*ln(x - c)`
    Log2,
    /// No function
    None,
    /// Optical density of an uncalibrated 8-bit image
    UncalibratedOd,
}

impl FunctionKind {
    /// Numeric id
    pub fn id(self) -> i32 {
        match self {
            FunctionKind::StraightLine => 0,
            FunctionKind::Poly2 => 1,
            FunctionKind::Poly3 => 2,
            FunctionKind::Poly4 => 3,
            FunctionKind::Exponential => 4,
            FunctionKind::Power => 5,
            FunctionKind::Log => 6,
            FunctionKind::Rodbard => 7,
            FunctionKind::GammaVariate => 8,
            FunctionKind::Log2 => 9,
            FunctionKind::None => 20,
            FunctionKind::UncalibratedOd => 21,
        }
    }

    /// Kind for a numeric id.
    pub fn from_id(id: i32) -> Option<Self> {
        Some(match id {
            0 => FunctionKind::StraightLine,
            1 => FunctionKind::Poly2,
            2 => FunctionKind::Poly3,
            3 => FunctionKind::Poly4,
            4 => FunctionKind::Exponential,
            5 => FunctionKind::Power,
            6 => FunctionKind::Log,
            7 => FunctionKind::Rodbard,
            8 => FunctionKind::GammaVariate,
            9 => FunctionKind::Log2,
            20 => FunctionKind::None,
            21 => FunctionKind::UncalibratedOd,
            _ => return None,
        })
    }

    /// Number of coefficients the formula reads.
    pub fn num_coefficients(self) -> usize {
        match self {
            FunctionKind::StraightLine
            | FunctionKind::Exponential
            | FunctionKind::Power
            | FunctionKind::Log => 2,
            FunctionKind::Poly2 | FunctionKind::Log2 => 3,
            FunctionKind::Poly3 | FunctionKind::Rodbard | FunctionKind::GammaVariate => 4,
            FunctionKind::Poly4 => 5,
            FunctionKind::None | FunctionKind::UncalibratedOd => 0,
        }
    }
}

/// Pixel value calibration function.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationFunction {
    kind: FunctionKind,
    coefficients: Vec<f64>,
    value_unit: String,
    zero_clip: bool,
}

impl CalibrationFunction {
    /// Create a function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when fewer coefficients are given
    /// than the formula reads.
    pub fn new(kind: FunctionKind, coefficients: Vec<f64>, value_unit: impl Into<String>) -> Result<Self> {
        if coefficients.len() < kind.num_coefficients() {
            return Err(Error::InvalidParameter(format!(
                "{kind:?} needs {} coefficient(s), got {}",
                kind.num_coefficients(),
                coefficients.len()
            )));
        }
        Ok(Self {
            kind,
            coefficients,
            value_unit: value_unit.into(),
            zero_clip: false,
        })
    }

    /// Builder form setting zero clipping.
    pub fn with_zero_clip(mut self, zero_clip: bool) -> Self {
        self.zero_clip = zero_clip;
        self
    }

    /// Function family
    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    /// Coefficients `c0, c1, ...`
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Unit of calibrated values
    pub fn value_unit(&self) -> &str {
        &self.value_unit
    }

    /// Whether negative results are clipped to 0.
    pub fn zero_clip(&self) -> bool {
        self.zero_clip
    }

    /// Evaluate at raw value `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let c = |i: usize| self.coefficients.get(i).copied().unwrap_or(0.0);
        let y = match self.kind {
            FunctionKind::StraightLine => c(0) + c(1) * x,
            FunctionKind::Poly2 => c(0) + x * (c(1) + x * c(2)),
            FunctionKind::Poly3 => c(0) + x * (c(1) + x * (c(2) + x * c(3))),
            FunctionKind::Poly4 => c(0) + x * (c(1) + x * (c(2) + x * (c(3) + x * c(4)))),
            FunctionKind::Exponential => c(0) * (c(1) * x).exp(),
            FunctionKind::Power if x == 0.0 => 0.0,
            FunctionKind::Power => c(0) * x.powf(c(1)),
            FunctionKind::Log if x == 0.0 => -1e100,
            FunctionKind::Log => c(0) * (c(1) * x).ln(),
            FunctionKind::Rodbard => c(3) + (c(0) - c(3)) / (1.0 + (x / c(2)).powf(c(1))),
            FunctionKind::GammaVariate => {
                if x <= c(0) || c(1) <= 0.0 || c(2) <= 0.0 || c(3) <= 0.0 {
                    0.0
                } else {
                    let t = x - c(0);
                    c(1) * t.powf(c(2)) * (-t / c(3)).exp()
                }
            }
            FunctionKind::Log2 => {
                let t = x - c(2);
                if t <= 0.0 { f64::NAN } else { c(0) + c(1) * t.ln() }
            }
            FunctionKind::None => x,
            FunctionKind::UncalibratedOd => {
                let v = x.clamp(0.0, 254.5);
                0.434_294_481 * (255.0 / (255.0 - v)).ln()
            }
        };
        if self.zero_clip && y < 0.0 { 0.0 } else { y }
    }
}

/// Physical calibration carried by an image.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    /// Pixel width in `unit`
    pub pixel_width: f64,
    /// Pixel height in the y unit
    pub pixel_height: f64,
    /// Slice spacing in the z unit
    pub pixel_depth: f64,
    /// X origin in pixels
    pub x_origin: f64,
    /// Y origin in pixels
    pub y_origin: f64,
    /// Z origin in slices
    pub z_origin: f64,
    /// Time between frames in the time unit
    pub frame_interval: f64,
    /// Animation rate
    pub fps: f64,
    /// Whether animation loops
    pub looping: bool,
    unit: String,
    y_unit: Option<String>,
    z_unit: Option<String>,
    time_unit: String,
    function: Option<CalibrationFunction>,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            pixel_width: 1.0,
            pixel_height: 1.0,
            pixel_depth: 1.0,
            x_origin: 0.0,
            y_origin: 0.0,
            z_origin: 0.0,
            frame_interval: 0.0,
            fps: 0.0,
            looping: false,
            unit: DEFAULT_UNIT.to_string(),
            y_unit: None,
            z_unit: None,
            time_unit: "sec".to_string(),
            function: None,
        }
    }
}

impl Calibration {
    /// Uncalibrated defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// X unit
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Set the x unit; an empty string resets it to `pixel`.
    pub fn set_unit(&mut self, unit: impl Into<String>) {
        let unit = unit.into();
        self.unit = if unit.is_empty() {
            DEFAULT_UNIT.to_string()
        } else {
            unit
        };
    }

    /// Y unit, falling back to the x unit.
    pub fn y_unit(&self) -> &str {
        self.y_unit.as_deref().unwrap_or(&self.unit)
    }

    /// Set a distinct y unit, or clear it with `None`.
    pub fn set_y_unit(&mut self, unit: Option<String>) {
        self.y_unit = unit.filter(|u| !u.is_empty());
    }

    /// Z unit, falling back to the x unit.
    pub fn z_unit(&self) -> &str {
        self.z_unit.as_deref().unwrap_or(&self.unit)
    }

    /// Set a distinct z unit, or clear it with `None`.
    pub fn set_z_unit(&mut self, unit: Option<String>) {
        self.z_unit = unit.filter(|u| !u.is_empty());
    }

    /// Check if y or z carry a unit of their own.
    pub fn has_axis_units(&self) -> bool {
        self.y_unit.as_deref().is_some_and(|u| u != self.unit)
            || self.z_unit.as_deref().is_some_and(|u| u != self.unit)
    }

    /// Time unit
    pub fn time_unit(&self) -> &str {
        &self.time_unit
    }

    /// Set the time unit.
    pub fn set_time_unit(&mut self, unit: impl Into<String>) {
        self.time_unit = unit.into();
    }

    /// Value calibration function, if any.
    pub fn function(&self) -> Option<&CalibrationFunction> {
        self.function.as_ref()
    }

    /// Install or remove the value calibration function.
    pub fn set_function(&mut self, function: Option<CalibrationFunction>) {
        self.function = function;
    }

    /// Check if any spatial calibration is set.
    pub fn scaled(&self) -> bool {
        self.pixel_width != 1.0
            || self.pixel_height != 1.0
            || self.pixel_depth != 1.0
            || self.unit != DEFAULT_UNIT
    }

    /// Check if a value function other than [`FunctionKind::None`] is set.
    pub fn calibrated(&self) -> bool {
        self.function
            .as_ref()
            .is_some_and(|f| f.kind() != FunctionKind::None)
    }

    /// Calibrated value of a raw pixel value.
    pub fn cvalue(&self, raw: f64) -> f64 {
        self.function.as_ref().map_or(raw, |f| f.eval(raw))
    }

    /// Map unsigned 16-bit values back to the signed range.
    pub fn set_signed16(&mut self) {
        self.function = Some(CalibrationFunction {
            kind: FunctionKind::StraightLine,
            coefficients: vec![-32768.0, 1.0],
            value_unit: "Gray Value".to_string(),
            zero_clip: false,
        });
    }

    /// Check if the function is the signed 16-bit mapping.
    pub fn is_signed16(&self) -> bool {
        self.function.as_ref().is_some_and(|f| {
            f.kind == FunctionKind::StraightLine
                && f.coefficients.len() >= 2
                && f.coefficients[0] == -32768.0
                && f.coefficients[1] == 1.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed16() {
        let mut cal = Calibration::new();
        assert!(!cal.is_signed16());
        cal.set_signed16();
        assert!(cal.is_signed16());
        assert_eq!(cal.cvalue(0.0), -32768.0);
        assert_eq!(cal.cvalue(65535.0), 32767.0);
    }

    #[test]
    fn test_unit_fallback() {
        let mut cal = Calibration::new();
        cal.set_unit("um");
        assert_eq!(cal.y_unit(), "um");
        cal.set_y_unit(Some("nm".to_string()));
        assert_eq!(cal.y_unit(), "nm");
        assert_eq!(cal.z_unit(), "um");
        assert!(cal.has_axis_units());
        cal.set_unit("");
        assert_eq!(cal.unit(), DEFAULT_UNIT);
    }

    #[test]
    fn test_function_ids() {
        for id in [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 20, 21] {
            let kind = FunctionKind::from_id(id).unwrap();
            assert_eq!(kind.id(), id);
        }
        assert!(FunctionKind::from_id(10).is_none());
    }

    #[test]
    fn test_eval_and_zero_clip() {
        let poly = CalibrationFunction::new(FunctionKind::Poly2, vec![1.0, 2.0, 3.0], "").unwrap();
        assert_eq!(poly.eval(2.0), 1.0 + 4.0 + 12.0);

        let line = CalibrationFunction::new(FunctionKind::StraightLine, vec![-10.0, 1.0], "")
            .unwrap()
            .with_zero_clip(true);
        assert_eq!(line.eval(3.0), 0.0);
        assert_eq!(line.eval(15.0), 5.0);

        let od = CalibrationFunction::new(FunctionKind::UncalibratedOd, vec![], "OD").unwrap();
        assert_eq!(od.eval(0.0), 0.0);
        assert!(od.eval(255.0).is_finite());

        assert!(CalibrationFunction::new(FunctionKind::Rodbard, vec![1.0], "").is_err());
    }

    #[test]
    fn test_scaled() {
        let mut cal = Calibration::new();
        assert!(!cal.scaled());
        cal.pixel_width = 0.5;
        assert!(cal.scaled());
    }
}
