//! Conversion regression test
//!
//! Processor to raster image and back, for every processor kind and for
//! the raster shapes no processor produces.
//!
//! # Coverage
//! - Round trip of each kind through the mapping table
//! - 1-bit packing with a width that is not a multiple of 8
//! - Signed 16-bit bias and its calibration
//! - RGB48 split into a 3-channel composite
//! - Rejection of multi-bank rasters without a color model

use ijio_core::convert::{KINDS, mapping};
use ijio_core::{
    BufferData, ByteProcessor, ColorModel, ComponentColorModel, DataBuffer, Processor,
    ProcessorKind, Raster, RasterImage, RasterShape, SampleType, to_image, to_raster_image,
};
use ijio_test::{RegParams, synth};

fn sample(kind: ProcessorKind) -> Processor {
    match kind {
        ProcessorKind::Byte => synth::gradient_byte(13, 7),
        ProcessorKind::Short => synth::ramp_short(13, 7),
        ProcessorKind::Float => synth::ramp_float(13, 7, true),
        ProcessorKind::Rgb => synth::color_bars(13, 7),
        ProcessorKind::Binary => synth::checkerboard_binary(13, 7, 3),
    }
}

#[test]
fn convert_reg() {
    ijio_test::init_logging();
    let mut rp = RegParams::new("convert");

    // Test 0-4: every kind survives forward and reverse unchanged
    for kind in KINDS {
        let p = sample(kind);
        let ri = to_raster_image(&p, false).expect("forward conversion");
        rp.compare_values(1.0, if ri.shape() == mapping(kind).shape { 1.0 } else { 0.0 }, 0.0);
        let image = to_image("roundtrip", ri).expect("reverse conversion");
        assert_eq!(image.stack_size(), 1);
        rp.compare_processors(&p, image.processor());
        eprintln!("  {} round trip checked", kind.name());
    }

    // Test 5-8: 0/255 bytes packed to 1 bit, width 10
    let pixels: Vec<u8> = (0..30).map(|i| if i % 3 == 0 { 255 } else { 0 }).collect();
    let p: Processor = ByteProcessor::from_pixels(10, 3, pixels).expect("byte plane").into();
    let ri = to_raster_image(&p, true).expect("packed conversion");
    rp.compare_values(1.0, if ri.shape() == RasterShape::SubByte(1) { 1.0 } else { 0.0 }, 0.0);
    let BufferData::Byte(banks) = ri.raster().data_buffer().data() else {
        panic!("packed raster must hold bytes");
    };
    rp.compare_values(6.0, banks[0].len() as f64, 0.0);
    // Bits past column 9 in each row's second byte are padding
    let padding_clear = banks[0].chunks(2).all(|row| row[1] & 0x3f == 0);
    rp.compare_values(1.0, if padding_clear { 1.0 } else { 0.0 }, 0.0);
    let image = to_image("packed", ri).expect("unpack");
    let same = (0..3).all(|y| (0..10).all(|x| image.processor().value(x, y) == p.value(x, y)));
    rp.compare_values(1.0, if same { 1.0 } else { 0.0 }, 0.0);

    // Test 9-13: signed 16-bit samples are biased and calibrated back
    let raster = Raster::single_band(4, 1, DataBuffer::short(vec![-32768, -1, 0, 32767]))
        .expect("short raster");
    let image = to_image("signed", RasterImage::new(raster, None)).expect("signed conversion");
    let sp = image.processor();
    rp.compare_values(0.0, sp.value(0, 0).unwrap_or(-1.0), 0.0);
    rp.compare_values(65535.0, sp.value(3, 0).unwrap_or(-1.0), 0.0);
    let cal = image.calibration();
    rp.compare_values(1.0, if cal.is_signed16() { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(-32768.0, cal.cvalue(0.0), 0.0);
    let restored: Vec<f64> = (0..4).filter_map(|x| sp.value(x, 0).map(|v| cal.cvalue(v))).collect();
    rp.compare_values(1.0, if restored == [-32768.0, -1.0, 0.0, 32767.0] { 1.0 } else { 0.0 }, 0.0);

    // Test 14-18: RGB48 becomes a 3-channel composite
    let raster = Raster::interleaved(2, 1, 3, DataBuffer::ushort(vec![100, 200, 300, 1, 2, 3]))
        .expect("rgb48 raster");
    let ri = RasterImage::new(raster, Some(ColorModel::Component(ComponentColorModel::srgb(16))));
    let image = to_image("rgb48", ri).expect("rgb48 conversion");
    rp.compare_values(3.0, image.stack_size() as f64, 0.0);
    for (slice, expected) in [100.0, 200.0, 300.0].into_iter().enumerate() {
        let value = image.stack().processor(slice).and_then(|p| p.value(0, 0));
        rp.compare_values(expected, value.unwrap_or(-1.0), 0.0);
    }
    rp.compare_values(1.0, if image.is_composite() { 1.0 } else { 0.0 }, 0.0);

    // Test 19: two banks without a color model are rejected
    let buffer = DataBuffer::new(BufferData::Byte(vec![vec![1; 4], vec![2; 4]]));
    let raster = Raster::banded(2, 2, buffer).expect("banded raster");
    let rejected = match to_image("ambiguous", RasterImage::new(raster, None)) {
        Err(e) => e.is_format_error(),
        Ok(_) => false,
    };
    rp.compare_values(1.0, if rejected { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "convert regression test failed");
}

#[test]
fn convert_reg_sample_types() {
    // Shapes outside the table still convert
    let int = RasterImage::new(
        Raster::single_band(2, 1, DataBuffer::int(vec![-7, 70000])).unwrap(),
        None,
    );
    let image = to_image("int", int).unwrap();
    assert_eq!(image.kind(), ProcessorKind::Float);
    assert_eq!(image.processor().value(1, 0), Some(70000.0));

    let double = RasterImage::new(
        Raster::single_band(1, 1, DataBuffer::double(vec![0.25])).unwrap(),
        None,
    );
    assert_eq!(to_image("double", double).unwrap().processor().value(0, 0), Some(0.25));

    let two_bit = RasterImage::new(Raster::packed(4, 1, 2, vec![0b00_01_10_11]).unwrap(), None);
    let image = to_image("2bit", two_bit).unwrap();
    assert_eq!(image.kind(), ProcessorKind::Byte);
    assert_eq!(image.processor().value(3, 0), Some(255.0));
    assert_eq!(image.processor().value(1, 0), Some(85.0));

    assert_eq!(
        mapping(ProcessorKind::Short).shape,
        RasterShape::SingleBand(SampleType::UShort)
    );
}
