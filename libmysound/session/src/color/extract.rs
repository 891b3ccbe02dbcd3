use std::collections::HashMap;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use super::ColorError;
use crate::dto::accent_color::AccentColor;

const MIN_SATURATION: f32 = 0.35;
const MAX_LIGHTNESS: f32 = 0.45;
const TARGET_LIGHTNESS: f32 = 0.26;
const TARGET_SATURATION: f32 = 1.0;
const SATURATION_WEIGHT: f32 = 6.0;
const LIGHTNESS_WEIGHT: f32 = 3.0;
const POPULATION_WEIGHT: f32 = 1.0;
// Pixels more transparent than this don't count towards any color
const MIN_ALPHA: u8 = 125;

pub(crate) fn accent_from_bytes(
    bytes: &[u8],
    sample_size: u32,
) -> Result<Option<AccentColor>, ColorError> {
    let img = image::load_from_memory(bytes).map_err(|e| ColorError::Decode(e.to_string()))?;
    Ok(dark_vibrant(&img, sample_size))
}

/// Picks the most prominent dark, saturated color in the image, if there is one.
pub fn dark_vibrant(img: &DynamicImage, sample_size: u32) -> Option<AccentColor> {
    let (width, height) = img.dimensions();
    let rgba = if width > sample_size || height > sample_size {
        img.resize(sample_size, sample_size, FilterType::Triangle)
            .to_rgba8()
    } else {
        img.to_rgba8()
    };

    // 5 bits per channel
    let mut populations: HashMap<(u8, u8, u8), u32> = HashMap::new();
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        if a < MIN_ALPHA {
            continue;
        }
        *populations.entry((r >> 3, g >> 3, b >> 3)).or_default() += 1;
    }

    let max_population = populations.values().copied().max()? as f32;
    populations
        .into_iter()
        .filter_map(|((r, g, b), population)| {
            let color = AccentColor::new(expand(r), expand(g), expand(b));
            let (_, saturation, lightness) = to_hsl(color);
            (saturation >= MIN_SATURATION && lightness <= MAX_LIGHTNESS).then(|| {
                (
                    color,
                    score(saturation, lightness, population as f32 / max_population),
                )
            })
        })
        .max_by(|(a, a_score), (b, b_score)| {
            a_score
                .total_cmp(b_score)
                .then_with(|| (a.r, a.g, a.b).cmp(&(b.r, b.g, b.b)))
        })
        .map(|(color, _)| color)
}

fn expand(quantized: u8) -> u8 {
    (quantized << 3) | (quantized >> 2)
}

fn score(saturation: f32, lightness: f32, population: f32) -> f32 {
    SATURATION_WEIGHT * (1.0 - (saturation - TARGET_SATURATION).abs())
        + LIGHTNESS_WEIGHT * (1.0 - (lightness - TARGET_LIGHTNESS).abs())
        + POPULATION_WEIGHT * population
}

/// Hue in degrees, saturation and lightness in `[0, 1]`.
pub(crate) fn to_hsl(color: AccentColor) -> (f32, f32, f32) {
    let r = color.r as f32 / 255.0;
    let g = color.g as f32 / 255.0;
    let b = color.b as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let lightness = (max + min) / 2.0;

    if delta == 0.0 {
        return (0.0, 0.0, lightness);
    }

    let saturation = delta / (1.0 - (2.0 * lightness - 1.0).abs());
    let hue = if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    (hue, saturation, lightness)
}
