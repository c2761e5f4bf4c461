//! JPEG I/O regression test
//!
//! JPEG is lossy, so pixels are compared with a tolerance.
//!
//! # Coverage
//! - 8-bit gray and RGB round trips
//! - 16-bit and float images scaled to 8 bits on write
//! - Quality setting changes the file size

use ijio_core::{Image, ProcessorKind};
use ijio_io::{ImageFormat, IoConfig, read_image_mem, write_image_mem};
use ijio_test::{RegParams, synth};

#[test]
fn jpegio_reg() {
    let mut rp = RegParams::new("jpegio");
    let config = IoConfig::builder().jpeg_quality(95).build();

    // Test 0-1: gray stays close
    let gray = synth::gradient_byte(64, 16);
    let bytes = write_image_mem(&Image::from_processor("g", gray.clone()), ImageFormat::Jpeg, &config)
        .expect("write gray JPEG");
    let back = read_image_mem(&bytes, &config).expect("read gray JPEG");
    rp.compare_values(1.0, if back.kind() == ProcessorKind::Byte { 1.0 } else { 0.0 }, 0.0);
    let max_err = (0..64)
        .filter_map(|x| Some((gray.value(x, 8)? - back.processor().value(x, 8)?).abs()))
        .fold(0.0, f64::max);
    rp.compare_values(0.0, max_err, 12.0);

    // Test 2: color comes back as RGB
    let bars = Image::from_processor("c", synth::color_bars(80, 16));
    let back = read_image_mem(&write_image_mem(&bars, ImageFormat::Jpeg, &config).unwrap(), &config).unwrap();
    rp.compare_values(1.0, if back.kind() == ProcessorKind::Rgb { 1.0 } else { 0.0 }, 0.0);

    // Test 3-4: 16-bit and float are written as 8-bit gray
    for p in [synth::ramp_short(32, 8), synth::ramp_float(32, 8, true)] {
        let bytes = write_image_mem(&Image::from_processor("w", p), ImageFormat::Jpeg, &config).unwrap();
        let back = read_image_mem(&bytes, &config).unwrap();
        rp.compare_values(1.0, if back.kind() == ProcessorKind::Byte { 1.0 } else { 0.0 }, 0.0);
    }

    // Test 5: lower quality, smaller file
    let image = Image::from_processor("q", synth::gradient_byte(128, 128));
    let low = IoConfig::builder().jpeg_quality(10).build();
    let small = write_image_mem(&image, ImageFormat::Jpeg, &low).unwrap().len();
    let large = write_image_mem(&image, ImageFormat::Jpeg, &config).unwrap().len();
    rp.compare_values(1.0, if small < large { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "jpegio regression test failed");
}
