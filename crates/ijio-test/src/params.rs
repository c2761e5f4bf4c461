//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::regout_dir;
use ijio_core::Processor;
use std::fs;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Run the checks (default)
    #[default]
    Compare,
    /// Run the checks and keep encoded outputs in the regout directory
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Tracks the test name, the index of the current check, the mode and
/// every failure seen so far.
pub struct RegParams {
    /// Name of the test (e.g., "tiffio")
    pub test_name: String,
    /// Current check index (incremented before each check)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode is read from `REGTEST_MODE`.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current check index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) -> bool {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
        false
    }

    /// Compare two floating-point values
    ///
    /// Returns `true` if `actual` is within `delta` of `expected`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta || diff.is_nan() {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg)
        } else {
            true
        }
    }

    /// Compare two processors pixel by pixel
    ///
    /// Kinds and sizes must agree and every pixel value must be equal.
    /// NaN matches NaN.
    pub fn compare_processors(&mut self, expected: &Processor, actual: &Processor) -> bool {
        self.index += 1;

        if expected.kind() != actual.kind()
            || expected.width() != actual.width()
            || expected.height() != actual.height()
        {
            let msg = format!(
                "Failure in {}_reg: processor comparison for index {} - \
                 expected {} {}x{}, got {} {}x{}",
                self.test_name,
                self.index,
                expected.kind().name(),
                expected.width(),
                expected.height(),
                actual.kind().name(),
                actual.width(),
                actual.height()
            );
            return self.fail(msg);
        }

        for y in 0..expected.height() {
            for x in 0..expected.width() {
                let (e, a) = (expected.value(x, y), actual.value(x, y));
                let same = match (e, a) {
                    (Some(e), Some(a)) => e == a || (e.is_nan() && a.is_nan()),
                    _ => false,
                };
                if !same {
                    let msg = format!(
                        "Failure in {}_reg: processor comparison for index {} - \
                         pixel mismatch at ({}, {}): expected {:?}, got {:?}",
                        self.test_name, self.index, x, y, e, a
                    );
                    return self.fail(msg);
                }
            }
        }

        true
    }

    /// Compare two binary data arrays
    ///
    /// Returns `true` if the data is identical.
    pub fn compare_strings(&mut self, data1: &[u8], data2: &[u8]) -> bool {
        self.index += 1;

        if data1 != data2 {
            let msg = format!(
                "Failure in {}_reg: string comparison for index {}\n\
                 sizes: {} vs {}",
                self.test_name,
                self.index,
                data1.len(),
                data2.len()
            );
            self.fail(msg)
        } else {
            true
        }
    }

    /// Keep encoded bytes for inspection
    ///
    /// In display mode the data is written to
    /// `tests/regout/{test_name}.{index:02}.{ext}`; otherwise nothing
    /// happens.
    pub fn write_output(&mut self, data: &[u8], ext: &str) -> TestResult<()> {
        self.index += 1;
        if !self.display() {
            return Ok(());
        }

        let dir = regout_dir();
        fs::create_dir_all(&dir).map_err(|e| TestError::DirectoryCreate {
            path: dir.clone(),
            message: e.to_string(),
        })?;
        let local_path = format!("{}/{}.{:02}.{}", dir, self.test_name, self.index, ext);
        fs::write(&local_path, data).map_err(|e| TestError::OutputWrite {
            path: local_path.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %local_path, bytes = data.len(), "regression output written");
        Ok(())
    }

    /// Clean up and report results
    ///
    /// Returns `true` if all checks passed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all checks have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ijio_core::{ByteProcessor, FloatProcessor, ShortProcessor};

    #[test]
    fn test_compare_values_within_delta() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
    }

    #[test]
    fn test_compare_values_failure() {
        let mut rp = RegParams::new("test");
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(!rp.is_success());
        assert_eq!(rp.failures().len(), 1);
    }

    #[test]
    fn test_compare_processors() {
        let mut rp = RegParams::new("test");
        let a: Processor = ByteProcessor::from_pixels(2, 1, vec![1, 2]).unwrap().into();
        let b: Processor = ByteProcessor::from_pixels(2, 1, vec![1, 3]).unwrap().into();
        let c: Processor = ShortProcessor::from_pixels(2, 1, vec![1, 2]).unwrap().into();
        assert!(rp.compare_processors(&a, &a.clone()));
        assert!(!rp.compare_processors(&a, &b));
        assert!(!rp.compare_processors(&a, &c));
        assert_eq!(rp.index(), 3);
    }

    #[test]
    fn test_compare_processors_nan() {
        let mut rp = RegParams::new("test");
        let a: Processor = FloatProcessor::from_pixels(1, 1, vec![f32::NAN]).unwrap().into();
        assert!(rp.compare_processors(&a, &a.clone()));
    }
}
