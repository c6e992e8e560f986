use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use jpeg_decoder::{Decoder, PixelFormat};
use rgb::RGB8;

use crate::{
    encode, ColorType, Encoder, QuantizationTableType, RgbImage, RgbPixels, SamplingFactor,
};

fn decode(data: &[u8]) -> (Vec<u8>, u16, u16, PixelFormat) {
    let mut decoder = Decoder::new(data);
    let pixels = decoder.decode().unwrap();
    let info = decoder.info().unwrap();

    (pixels, info.width, info.height, info.pixel_format)
}

fn gradient(width: u16, height: u16) -> Vec<u8> {
    let mut data = Vec::with_capacity(usize::from(width) * usize::from(height) * 3);
    for y in 0..usize::from(height) {
        for x in 0..usize::from(width) {
            data.push((x * 255 / usize::from(width)) as u8);
            data.push((y * 255 / usize::from(height)) as u8);
            data.push(128);
        }
    }
    data
}

fn mean_abs_error(a: &[u8], b: &[u8]) -> f64 {
    assert_eq!(a.len(), b.len());

    let sum: u64 = a
        .iter()
        .zip(b)
        .map(|(&a, &b)| u64::from(a.abs_diff(b)))
        .sum();

    sum as f64 / a.len() as f64
}

#[test]
fn test_solid_gray_rgb() {
    let data = vec![128u8; 16 * 16 * 3];
    let encoded = encode(&data, 16, 16, true, 90, false, None).unwrap();

    let (pixels, width, height, format) = decode(&encoded);

    assert_eq!((width, height), (16, 16));
    assert_eq!(format, PixelFormat::RGB24);
    assert_eq!(pixels.len(), data.len());

    for &v in &pixels {
        assert!(v.abs_diff(128) <= 2, "Decoded sample {} too far from 128", v);
    }
}

#[test]
fn test_grayscale_odd_size() {
    let width = 13u16;
    let height = 7u16;

    let data: Vec<u8> = (0..usize::from(width) * usize::from(height))
        .map(|i| (i % 13 * 8 + 60) as u8)
        .collect();

    let encoded = encode(&data, width, height, false, 95, true, None).unwrap();
    let (pixels, w, h, format) = decode(&encoded);

    assert_eq!((w, h), (width, height));
    assert_eq!(format, PixelFormat::L8);
    assert!(mean_abs_error(&pixels, &data) < 3.0);
}

#[test]
fn test_color_subsampled_odd_size() {
    let width = 33u16;
    let height = 17u16;
    let data = gradient(width, height);

    for subsampling in [false, true] {
        let encoded = encode(&data, width, height, true, 90, subsampling, None).unwrap();
        let (pixels, w, h, format) = decode(&encoded);

        assert_eq!((w, h), (width, height));
        assert_eq!(format, PixelFormat::RGB24);
        let limit = if subsampling { 6.0 } else { 3.0 };
        assert!(
            mean_abs_error(&pixels, &data) < limit,
            "Error too large with subsampling {}",
            subsampling
        );
    }
}

#[test]
fn test_saturated_red() {
    let data: Vec<u8> = [255u8, 0, 0].repeat(24 * 24);

    let encoded = encode(&data, 24, 24, true, 90, true, None).unwrap();
    let (pixels, _, _, _) = decode(&encoded);

    for pixel in pixels.chunks_exact(3) {
        assert!(pixel[0] >= 250, "{:?}", pixel);
        assert!(pixel[1] <= 5, "{:?}", pixel);
        assert!(pixel[2] <= 5, "{:?}", pixel);
    }
}

#[test]
fn test_lower_quality_is_smaller() {
    let data: Vec<u8> = (0..64u32 * 64 * 3)
        .map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8)
        .collect();

    let high = encode(&data, 64, 64, true, 95, false, None).unwrap();
    let low = encode(&data, 64, 64, true, 20, false, None).unwrap();

    assert!(low.len() < high.len());

    // Noise at extreme quality still stays within baseline coding limits
    let (pixels, _, _, _) = decode(&encode(&data, 64, 64, true, 100, false, None).unwrap());
    assert_eq!(pixels.len(), data.len());
}

#[test]
fn test_rgb_pixels_match_bytes() {
    let width = 20u16;
    let height = 10u16;
    let data = gradient(width, height);

    let pixels: Vec<RGB8> = data
        .chunks_exact(3)
        .map(|c| RGB8::new(c[0], c[1], c[2]))
        .collect();

    let mut from_bytes = Vec::new();
    Encoder::new(&mut from_bytes, 80)
        .encode_image(RgbImage(&data, width, height))
        .unwrap();

    let mut from_pixels = Vec::new();
    Encoder::new(&mut from_pixels, 80)
        .encode_image(RgbPixels(&pixels, width, height))
        .unwrap();

    assert_eq!(from_bytes, from_pixels);
}

#[test]
fn test_flat_quantization_table() {
    let data = gradient(16, 16);

    let mut output = Vec::new();
    let mut encoder = Encoder::new(&mut output, 75);
    encoder.set_sampling_factor(SamplingFactor::R_4_4_4);
    encoder.set_quantization_tables(QuantizationTableType::Flat, QuantizationTableType::Flat);
    encoder.encode(&data, 16, 16, ColorType::Rgb).unwrap();

    let (pixels, _, _, _) = decode(&output);
    assert!(mean_abs_error(&pixels, &data) < 3.0);
}

#[test]
fn test_new_file() {
    let path = std::env::temp_dir().join(format!("jfif-baseline-{}.jpg", std::process::id()));

    let data = vec![50u8; 9 * 9];
    Encoder::new_file(&path, 90)
        .unwrap()
        .encode(&data, 9, 9, ColorType::Luma)
        .unwrap();

    let encoded = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let (pixels, w, h, _) = decode(&encoded);
    assert_eq!((w, h), (9, 9));
    assert!(pixels.iter().all(|&v| v.abs_diff(50) <= 2));
}
