use std::io::Cursor;

use assert_matches::assert_matches;
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use rstest::*;

use super::extract::to_hsl;
use super::*;

const DARK_RED: Rgba<u8> = Rgba([150, 20, 20, 255]);
const DARK_BLUE: Rgba<u8> = Rgba([20, 20, 150, 255]);
const LIGHT_GRAY: Rgba<u8> = Rgba([200, 200, 200, 255]);
const PASTEL: Rgba<u8> = Rgba([250, 200, 200, 255]);

// Quantized to 5 bits per channel and expanded back
const QUANTIZED_RED: AccentColor = AccentColor::new(148, 16, 16);
const QUANTIZED_BLUE: AccentColor = AccentColor::new(16, 16, 148);

fn split_image(size: u32, top_rows: u32, top: Rgba<u8>, bottom: Rgba<u8>) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(size, size, |_, y| {
        if y < top_rows { top } else { bottom }
    }))
}

fn png_bytes(img: &DynamicImage) -> Vec<u8> {
    let mut bytes = vec![];
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn test_dark_vibrant_ignores_unsaturated() {
    let img = split_image(8, 4, DARK_RED, LIGHT_GRAY);
    assert_eq!(Some(QUANTIZED_RED), dark_vibrant(&img, 64));
}

#[test]
fn test_dark_vibrant_prefers_population() {
    let img = split_image(8, 2, DARK_RED, DARK_BLUE);
    assert_eq!(Some(QUANTIZED_BLUE), dark_vibrant(&img, 64));
}

#[rstest(
    top,
    bottom,
    case(LIGHT_GRAY, LIGHT_GRAY),
    case(PASTEL, LIGHT_GRAY),
    case(Rgba([150, 20, 20, 0]), LIGHT_GRAY)
)]
fn test_dark_vibrant_no_candidate(top: Rgba<u8>, bottom: Rgba<u8>) {
    let img = split_image(8, 4, top, bottom);
    assert_eq!(None, dark_vibrant(&img, 64));
}

#[test]
fn test_dark_vibrant_downscales_large_artwork() {
    let img = split_image(300, 300, DARK_RED, DARK_RED);
    assert_eq!(Some(QUANTIZED_RED), dark_vibrant(&img, 64));
}

#[rstest(
    color,
    expected,
    case(AccentColor::new(255, 0, 0), (0.0, 1.0, 0.5)),
    case(AccentColor::new(0, 0, 255), (240.0, 1.0, 0.5)),
    case(AccentColor::new(0, 0, 0), (0.0, 0.0, 0.0)),
    case(AccentColor::new(255, 255, 255), (0.0, 0.0, 1.0))
)]
fn test_to_hsl(color: AccentColor, expected: (f32, f32, f32)) {
    let (h, s, l) = to_hsl(color);
    assert!((h - expected.0).abs() < 0.01, "hue {h}");
    assert!((s - expected.1).abs() < 0.01, "saturation {s}");
    assert!((l - expected.2).abs() < 0.01, "lightness {l}");
}

#[test]
fn test_accent_from_png_bytes() {
    let bytes = png_bytes(&split_image(8, 8, DARK_RED, DARK_RED));
    assert_eq!(Some(QUANTIZED_RED), accent_from_bytes(&bytes, 64).unwrap());
}

#[test]
fn test_accent_from_garbage_bytes() {
    assert_matches!(
        accent_from_bytes(b"definitely not an image", 64),
        Err(ColorError::Decode(_))
    );
}

#[test]
fn test_neutral_display() {
    assert_eq!("#424242", AccentColor::NEUTRAL.to_string());
}

struct FailingFetcher;

#[async_trait]
impl ArtworkFetcher for FailingFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ColorError> {
        Err(ColorError::Status {
            url: url.to_owned(),
            status: 404,
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_extract_accent_fetch_failure() {
    assert_matches!(
        extract_accent(&FailingFetcher, "http://host/a.png", 64).await,
        Err(ColorError::Status { status: 404, .. })
    );
}
