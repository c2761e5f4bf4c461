//! ijio-test - Regression test helpers for ijio
//!
//! Regression tests track numbered checks through [`RegParams`] and report
//! every failure at [`RegParams::cleanup`]. Two modes are supported:
//!
//! - **Compare**: run the checks (default)
//! - **Display**: also write encoded outputs to `tests/regout` for viewing
//!
//! # Usage
//!
//! ```ignore
//! use ijio_test::{RegParams, synth};
//!
//! let mut rp = RegParams::new("tiffio");
//! let original = synth::gradient_byte(32, 16);
//! rp.compare_values(32.0, original.width() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"
//! - `RUST_LOG`: filter for [`init_logging`]

mod error;
mod params;
pub mod synth;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a stderr subscriber for test output.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this
/// more than once is harmless; later calls keep the first subscriber.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer().with_target(false))
        .try_init();
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // ijio-test is at crates/ijio-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
