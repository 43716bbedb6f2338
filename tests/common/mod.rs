//! Image fixtures shared by the unit tests and the end-to-end tests.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write a high-quality JPEG full of noise, so re-encoding it shrinks it.
pub fn write_noisy_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let h = x.wrapping_mul(2_654_435_761).wrapping_add(y.wrapping_mul(40_503));
        Rgb([(h >> 3) as u8, (h >> 11) as u8, (h >> 19) as u8])
    });
    let file = BufWriter::new(File::create(path).unwrap());
    JpegEncoder::new_with_quality(file, 100)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a smooth gradient PNG with no filtering and fast deflate.
pub fn write_gradient_png(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 128]));
    let file = BufWriter::new(File::create(path).unwrap());
    PngEncoder::new_with_quality(file, CompressionType::Fast, FilterType::NoFilter)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}
