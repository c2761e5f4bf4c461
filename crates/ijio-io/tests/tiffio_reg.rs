//! TIFF I/O regression test
//!
//! Images through real TIFF bytes and back: pixels, stacks, composite
//! layout and calibration carried by the description and resolution tags.
//!
//! # Coverage
//! - Round trip of every processor kind
//! - Multi-page stacks and hyperstack dimensions
//! - RGB48 composites written as three 16-bit pages
//! - Signed 16-bit calibration
//! - Spatial calibration with per-axis units (17 x 23, "a" / "B")
//! - Compression methods
//! - Inverted binary images kept through WhiteIsZero

use ijio_core::{
    BinaryProcessor, ChannelMode, ColorModel, ComponentColorModel, DataBuffer, Image, ImageStack, Processor,
    ProcessorKind, Raster, RasterImage, ShortProcessor, to_image,
};
use ijio_io::{ImageFormat, IoConfig, TiffCompression, read_image_mem, write_image_mem};
use ijio_test::{RegParams, synth};

fn roundtrip(image: &Image, config: &IoConfig) -> Image {
    let bytes = write_image_mem(image, ImageFormat::Tiff, config).expect("write TIFF");
    read_image_mem(&bytes, config).expect("read TIFF")
}

#[test]
fn tiffio_reg() {
    ijio_test::init_logging();
    let mut rp = RegParams::new("tiffio");
    let config = IoConfig::default();

    // Test 0-4: every kind through TIFF
    let planes = [
        synth::gradient_byte(33, 9),
        synth::ramp_short(33, 9),
        synth::ramp_float(33, 9, true),
        synth::color_bars(33, 9),
    ];
    for p in planes {
        let image = Image::from_processor("plane", p.clone());
        let back = roundtrip(&image, &config);
        rp.compare_processors(&p, back.processor());
    }
    // Binary pages are stored as 0/255 gray
    let binary = synth::checkerboard_binary(33, 9, 4);
    let back = roundtrip(&Image::from_processor("bin", binary.clone()), &config);
    let same = (0..9).all(|y| (0..33).all(|x| back.processor().value(x, y) == binary.value(x, y)));
    rp.compare_values(1.0, if same { 1.0 } else { 0.0 }, 0.0);

    // Test 5-7: z-stack with hyperstack layout
    let slices: Vec<Processor> = (0..6)
        .map(|v| ShortProcessor::from_pixels(4, 4, vec![v * 1000; 16]).unwrap().into())
        .collect();
    let mut image = Image::from_stack("hyper", ImageStack::from_processors(slices).unwrap()).unwrap();
    image.set_dimensions(1, 3, 2).unwrap();
    let back = roundtrip(&image, &config);
    rp.compare_values(6.0, back.stack_size() as f64, 0.0);
    rp.compare_values(1.0, if back.dimensions() == (1, 3, 2) { 1.0 } else { 0.0 }, 0.0);
    let last = back.stack().processor(5).and_then(|p| p.value(0, 0));
    rp.compare_values(5000.0, last.unwrap_or(-1.0), 0.0);

    // Test 8-12: RGB48 composite
    let raster = Raster::interleaved(2, 2, 3, DataBuffer::ushort([100u16, 200, 300].repeat(4)))
        .expect("rgb48 raster");
    let rgb48 = to_image(
        "rgb48",
        RasterImage::new(raster, Some(ColorModel::Component(ComponentColorModel::srgb(16)))),
    )
    .expect("rgb48 conversion");
    let back = roundtrip(&rgb48, &config);
    rp.compare_values(1.0, if back.dimensions() == (3, 1, 1) { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(1.0, if back.mode() == Some(ChannelMode::Composite) { 1.0 } else { 0.0 }, 0.0);
    for (slice, expected) in [100.0, 200.0, 300.0].into_iter().enumerate() {
        let v = back.stack().processor(slice).and_then(|p| p.value(1, 1));
        rp.compare_values(expected, v.unwrap_or(-1.0), 0.0);
    }

    // Test 13-14: signed 16-bit keeps its calibration
    let raster = Raster::single_band(3, 1, DataBuffer::short(vec![-32768, 0, 32767])).unwrap();
    let signed = to_image("signed", RasterImage::new(raster, None)).unwrap();
    let back = roundtrip(&signed, &config);
    rp.compare_values(1.0, if back.calibration().is_signed16() { 1.0 } else { 0.0 }, 0.0);
    let v = back.processor().value(0, 0).map(|v| back.calibration().cvalue(v));
    rp.compare_values(-32768.0, v.unwrap_or(0.0), 0.0);

    // Test 15-18: spatial calibration with per-axis units
    let mut image = Image::from_processor("cal", synth::gradient_byte(8, 8));
    let cal = image.calibration_mut();
    cal.pixel_width = 17.0;
    cal.pixel_height = 23.0;
    cal.set_unit("a");
    cal.set_y_unit(Some("B".to_string()));
    let back = roundtrip(&image, &config);
    let cal = back.calibration();
    rp.compare_values(17.0, cal.pixel_width, 1e-6);
    rp.compare_values(23.0, cal.pixel_height, 1e-6);
    rp.compare_strings(b"a", cal.unit().as_bytes());
    rp.compare_strings(b"B", cal.y_unit().as_bytes());

    // Test 19: calibration can be left out
    let plain = IoConfig::builder().write_calibration(false).build();
    let back = roundtrip(&image, &plain);
    rp.compare_values(1.0, back.calibration().pixel_width, 0.0);

    // Test 20-23: compression methods
    for compression in [
        TiffCompression::None,
        TiffCompression::PackBits,
        TiffCompression::Lzw,
        TiffCompression::Zip,
    ] {
        let config = IoConfig::builder().tiff_compression(compression).build();
        let p = synth::ramp_short(40, 10);
        let back = roundtrip(&Image::from_processor("c", p.clone()), &config);
        rp.compare_processors(&p, back.processor());
        if rp.display() {
            let bytes = write_image_mem(&back, ImageFormat::Tiff, &config).unwrap();
            rp.write_output(&bytes, "tif").unwrap();
        }
    }

    assert!(rp.cleanup(), "tiffio regression test failed");
}

#[test]
fn tiffio_reg_display_range() {
    let mut sp = ShortProcessor::from_pixels(2, 1, vec![10, 4000]).unwrap();
    sp.set_display_range(100.0, 900.0);
    let image = Image::from_processor("range", sp.into());
    let back = roundtrip(&image, &IoConfig::default());
    assert_eq!(back.kind(), ProcessorKind::Short);
    assert_eq!(back.processor().display_range(), Some((100.0, 900.0)));
}

#[test]
fn tiffio_reg_inverted_binary() {
    let binary: Processor = BinaryProcessor::from_pixels(2, 1, vec![255, 0])
        .unwrap()
        .with_inverted(true)
        .into();
    let back = roundtrip(&Image::from_processor("inv", binary), &IoConfig::default());
    let Processor::Byte(bp) = back.processor() else {
        panic!("expected byte processor, got {:?}", back.kind());
    };
    assert_eq!(bp.pixels(), &[255, 0]);
    assert!(bp.palette().is_some_and(|p| p.is_inverted_gray_ramp()));
}
