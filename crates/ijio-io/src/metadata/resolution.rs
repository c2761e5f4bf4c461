//! TIFF resolution tags
//!
//! TIFF stores pixels per unit as rationals. Pixel size is the reciprocal.

use ijio_core::Calibration;

/// TIFF `ResolutionUnit` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolutionUnit {
    /// No absolute unit (1)
    #[default]
    None,
    /// Inch (2)
    Inch,
    /// Centimeter (3)
    Centimeter,
}

impl ResolutionUnit {
    /// Tag value
    pub fn code(self) -> u16 {
        match self {
            ResolutionUnit::None => 1,
            ResolutionUnit::Inch => 2,
            ResolutionUnit::Centimeter => 3,
        }
    }

    /// Unit for a tag value.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(ResolutionUnit::None),
            2 => Some(ResolutionUnit::Inch),
            3 => Some(ResolutionUnit::Centimeter),
            _ => None,
        }
    }

    /// Calibration unit name, if the unit is absolute.
    pub fn unit_name(self) -> Option<&'static str> {
        match self {
            ResolutionUnit::None => None,
            ResolutionUnit::Inch => Some("inch"),
            ResolutionUnit::Centimeter => Some("cm"),
        }
    }
}

/// Pixels per unit along x and y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Pixels per unit along x
    pub x: f64,
    /// Pixels per unit along y
    pub y: f64,
    /// Unit of both axes
    pub unit: ResolutionUnit,
}

impl Resolution {
    /// Resolution of a spatially calibrated image.
    ///
    /// Returns `None` when the calibration is unscaled or a pixel size is
    /// not positive.
    pub fn from_calibration(calibration: &Calibration) -> Option<Self> {
        let (pw, ph) = (calibration.pixel_width, calibration.pixel_height);
        if !calibration.scaled() || !(pw > 0.0 && pw.is_finite()) || !(ph > 0.0 && ph.is_finite()) {
            return None;
        }
        let unit = match calibration.unit() {
            "inch" => ResolutionUnit::Inch,
            "cm" => ResolutionUnit::Centimeter,
            _ => ResolutionUnit::None,
        };
        Some(Self {
            x: 1.0 / pw,
            y: 1.0 / ph,
            unit,
        })
    }

    /// Set pixel sizes, and the unit when it is absolute.
    ///
    /// Non-positive resolutions leave the pixel size alone.
    pub fn apply_to(&self, calibration: &mut Calibration) {
        if self.x > 0.0 && self.x.is_finite() {
            calibration.pixel_width = 1.0 / self.x;
        }
        if self.y > 0.0 && self.y.is_finite() {
            calibration.pixel_height = 1.0 / self.y;
        }
        if let Some(name) = self.unit.unit_name() {
            calibration.set_unit(name);
        }
    }
}

/// Nearest `n/d` with the largest denominator that keeps `n` in range.
///
/// Non-finite or non-positive values become `1/1`.
pub fn to_rational(value: f64) -> (u32, u32) {
    if !(value > 0.0 && value.is_finite()) {
        return (1, 1);
    }
    let max = u32::MAX as f64;
    if value >= max {
        return (u32::MAX, 1);
    }
    let whole = value.ceil().max(1.0);
    let d = (max / whole).floor().clamp(1.0, max);
    let n = (value * d).round().clamp(0.0, max);
    (n as u32, d as u32)
}

/// Value of `n/d`, `None` for a zero denominator.
pub fn from_rational(n: u32, d: u32) -> Option<f64> {
    (d != 0).then(|| n as f64 / d as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rational_precision() {
        for pixel in [17.0, 23.0, 0.1234567, 1e-4, 3.0] {
            let (n, d) = to_rational(1.0 / pixel);
            let back = 1.0 / from_rational(n, d).unwrap();
            assert!((back - pixel).abs() / pixel < 1e-6, "{pixel} -> {back}");
        }
        assert_eq!(to_rational(f64::NAN), (1, 1));
        assert_eq!(from_rational(1, 0), None);
    }

    #[test]
    fn test_calibration_round_trip() {
        let mut cal = Calibration::new();
        cal.pixel_width = 0.5;
        cal.pixel_height = 0.25;
        cal.set_unit("cm");
        let res = Resolution::from_calibration(&cal).unwrap();
        assert_eq!(res.unit, ResolutionUnit::Centimeter);
        assert_eq!((res.x, res.y), (2.0, 4.0));

        let mut back = Calibration::new();
        res.apply_to(&mut back);
        assert_eq!(back.pixel_width, 0.5);
        assert_eq!(back.pixel_height, 0.25);
        assert_eq!(back.unit(), "cm");
    }

    #[test]
    fn test_uncalibrated_has_no_resolution() {
        assert!(Resolution::from_calibration(&Calibration::new()).is_none());
        assert_eq!(ResolutionUnit::from_code(2), Some(ResolutionUnit::Inch));
        assert_eq!(ResolutionUnit::from_code(9), None);
    }
}
