//! Comparison-mode filters applied to a page before display

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CompareError;
use super::types::Raster;

/// How a page is shown before comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonMode {
    /// Unmodified colors
    #[default]
    Rgb,
    /// Luminance only
    Grayscale,
    /// Grayscale binarized with an automatic threshold
    TextOnly,
}

impl ComparisonMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMode::Rgb => "rgb",
            ComparisonMode::Grayscale => "grayscale",
            ComparisonMode::TextOnly => "text-only",
        }
    }

    /// Apply the filter; the result has the same size and page index
    #[must_use]
    pub fn apply(self, raster: Raster) -> Raster {
        match self {
            ComparisonMode::Rgb => raster,
            ComparisonMode::Grayscale => {
                let gray = luminance(&raster.pixels);
                expand_gray(raster, &gray)
            }
            ComparisonMode::TextOnly => {
                let mut gray = luminance(&raster.pixels);
                let threshold = otsu_threshold(&gray);
                for v in &mut gray {
                    *v = if *v > threshold { 255 } else { 0 };
                }
                expand_gray(raster, &gray)
            }
        }
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonMode {
    type Err = CompareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" => Ok(ComparisonMode::Rgb),
            "grayscale" | "gray" | "greyscale" => Ok(ComparisonMode::Grayscale),
            "text-only" | "text only" | "text_only" | "text" => Ok(ComparisonMode::TextOnly),
            other => Err(CompareError::InvalidConfig(format!(
                "unknown comparison mode {other:?} (expected rgb, grayscale or text-only)"
            ))),
        }
    }
}

/// Overwrite every pixel of `raster` with its gray value
fn expand_gray(mut raster: Raster, gray: &[u8]) -> Raster {
    for (px, &v) in raster.pixels.chunks_exact_mut(3).zip(gray) {
        px.fill(v);
    }
    raster
}

/// BT.601 luminance of packed RGB pixels, one byte per pixel.
///
/// Uses 8-bit fixed-point weights, so a value can be one level below a
/// 14-bit implementation such as OpenCV's (pure green gives 149, not 150).
#[must_use]
pub fn luminance(rgb: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; rgb.len() / 3];
    let simd_px = (rgb.len() / 24) * 8;
    let (simd_src, rest_src) = rgb.split_at(simd_px * 3);
    let (simd_dst, rest_dst) = out.split_at_mut(simd_px);

    for (src, dst) in simd_src.chunks_exact(24).zip(simd_dst.chunks_exact_mut(8)) {
        simd_luma::gray_8_rgb_pixels(src, dst);
    }
    for (px, dst) in rest_src.chunks_exact(3).zip(rest_dst.iter_mut()) {
        *dst = simd_luma::gray_scalar(px[0], px[1], px[2]);
    }
    out
}

/// Global threshold maximizing the between-class variance of `gray`.
///
/// Values strictly above the returned level belong to the bright class.
#[must_use]
pub fn otsu_threshold(gray: &[u8]) -> u8 {
    let mut hist = [0u64; 256];
    for &v in gray {
        hist[v as usize] += 1;
    }

    let total = gray.len() as f64;
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut weight_bg = 0.0;
    let mut sum_bg = 0.0;
    let mut best_variance = 0.0;
    let mut threshold = 0u8;

    for (level, &count) in hist.iter().enumerate() {
        weight_bg += count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        sum_bg += level as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let variance = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);
        if variance > best_variance {
            best_variance = variance;
            threshold = level as u8;
        }
    }

    threshold
}

mod simd_luma {
    use wide::u16x8;

    const LUMA_R: u16 = 77;
    const LUMA_G: u16 = 150;
    const LUMA_B: u16 = 29;

    #[inline]
    pub fn gray_scalar(r: u8, g: u8, b: u8) -> u8 {
        ((u16::from(r) * LUMA_R + u16::from(g) * LUMA_G + u16::from(b) * LUMA_B + 128) >> 8) as u8
    }

    #[inline]
    pub fn gray_8_rgb_pixels(chunk: &[u8], out: &mut [u8]) {
        debug_assert!(chunk.len() == 24, "Expected 24 bytes for 8 RGB pixels");
        debug_assert!(out.len() == 8);

        let r = u16x8::new([
            u16::from(chunk[0]),
            u16::from(chunk[3]),
            u16::from(chunk[6]),
            u16::from(chunk[9]),
            u16::from(chunk[12]),
            u16::from(chunk[15]),
            u16::from(chunk[18]),
            u16::from(chunk[21]),
        ]);
        let g = u16x8::new([
            u16::from(chunk[1]),
            u16::from(chunk[4]),
            u16::from(chunk[7]),
            u16::from(chunk[10]),
            u16::from(chunk[13]),
            u16::from(chunk[16]),
            u16::from(chunk[19]),
            u16::from(chunk[22]),
        ]);
        let b = u16x8::new([
            u16::from(chunk[2]),
            u16::from(chunk[5]),
            u16::from(chunk[8]),
            u16::from(chunk[11]),
            u16::from(chunk[14]),
            u16::from(chunk[17]),
            u16::from(chunk[20]),
            u16::from(chunk[23]),
        ]);

        let luma: u16x8 = (r * u16x8::splat(LUMA_R)
            + g * u16x8::splat(LUMA_G)
            + b * u16x8::splat(LUMA_B)
            + u16x8::splat(128))
            >> 8;

        for (dst, l) in out.iter_mut().zip(luma.to_array()) {
            *dst = l as u8;
        }
    }
}
