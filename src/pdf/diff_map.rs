//! Per-pixel difference map between two rendered pages

use std::num::NonZeroU32;

use fast_image_resize as fr;
use log::{debug, warn};
use rayon::prelude::*;

use super::config::Threshold;
use super::types::Raster;

/// Rasters at least this many pixels are compared on the rayon pool
const PARALLEL_MIN_PIXELS: usize = 200_000;

/// False-colored mask of differing pixels
#[derive(Clone, PartialEq, Eq)]
pub struct DifferenceMap {
    /// RGB, 3 bytes per pixel
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Number of pixels above the threshold
    pub differing: usize,
}

impl DifferenceMap {
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    #[must_use]
    pub fn as_raster(&self, page_index: usize) -> Raster {
        Raster {
            pixels: self.pixels.clone(),
            width: self.width,
            height: self.height,
            page_index,
        }
    }
}

impl std::fmt::Debug for DifferenceMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DifferenceMap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("differing", &self.differing)
            .finish_non_exhaustive()
    }
}

/// Color of pixels at or below the threshold
pub const SAME_COLOR: [u8; 3] = jet(0);
/// Color of pixels above the threshold
pub const DIFFERENT_COLOR: [u8; 3] = jet(255);

/// Jet color ramp: 0 is dark blue, 255 is dark red
#[must_use]
pub const fn jet(value: u8) -> [u8; 3] {
    // Piecewise-linear in units of 1/1020 (4 * 255) to stay in integers
    const fn channel(value: u8, center: i32) -> u8 {
        let x = 4 * value as i32;
        let d = x - center * 255;
        let d = if d < 0 { -d } else { d };
        // 1.5 - |4x - c| scaled by 255, rounded half up
        let v = 3 * 255 - 2 * d;
        if v <= 0 {
            0
        } else if v >= 2 * 255 {
            255
        } else {
            ((v + 1) / 2) as u8
        }
    }
    [channel(value, 3), channel(value, 2), channel(value, 1)]
}

/// Compare two pages pixel by pixel.
///
/// Pages of different sizes are each resized to the larger width and the
/// larger height first. The result depends only on the inputs.
#[must_use]
pub fn difference_map(a: &Raster, b: &Raster, threshold: Threshold) -> DifferenceMap {
    let width = a.width.max(b.width);
    let height = a.height.max(b.height);
    let a = resized_pixels(a, width, height);
    let b = resized_pixels(b, width, height);
    let t = u16::from(threshold.get());

    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    let row_bytes = width as usize * 3;
    if row_bytes == 0 {
        return DifferenceMap {
            pixels,
            width,
            height,
            differing: 0,
        };
    }

    let diff_row = |(out, (ra, rb)): (&mut [u8], (&[u8], &[u8]))| -> usize {
        let mut differing = 0;
        for ((dst, pa), pb) in out
            .chunks_exact_mut(3)
            .zip(ra.chunks_exact(3))
            .zip(rb.chunks_exact(3))
        {
            let magnitude = pa
                .iter()
                .zip(pb)
                .map(|(&x, &y)| u16::from(x.abs_diff(y)))
                .max()
                .unwrap_or(0);
            if magnitude > t {
                dst.copy_from_slice(&DIFFERENT_COLOR);
                differing += 1;
            } else {
                dst.copy_from_slice(&SAME_COLOR);
            }
        }
        differing
    };

    let differing = if (width as usize * height as usize) >= PARALLEL_MIN_PIXELS {
        pixels
            .par_chunks_mut(row_bytes)
            .zip(a.par_chunks(row_bytes).zip(b.par_chunks(row_bytes)))
            .map(diff_row)
            .sum()
    } else {
        pixels
            .chunks_mut(row_bytes)
            .zip(a.chunks(row_bytes).zip(b.chunks(row_bytes)))
            .map(diff_row)
            .sum()
    };

    debug!("Difference map {width}x{height}: {differing} pixels above {threshold}");

    DifferenceMap {
        pixels,
        width,
        height,
        differing,
    }
}

/// Pixels of `raster` at `width`x`height`, borrowed when no resize is needed
fn resized_pixels(raster: &Raster, width: u32, height: u32) -> std::borrow::Cow<'_, [u8]> {
    if raster.dimensions() == (width, height) && raster.check().is_ok() {
        return std::borrow::Cow::Borrowed(&raster.pixels);
    }

    match fast_resize(raster, width, height) {
        Ok(pixels) => std::borrow::Cow::Owned(pixels),
        Err(e) => {
            warn!("Fast resize failed for page {}: {e}, falling back to nearest neighbour", raster.page_index);
            std::borrow::Cow::Owned(resize_nearest(raster, width, height))
        }
    }
}

/// Bilinear resize using fast_image_resize
fn fast_resize(
    raster: &Raster,
    new_width: u32,
    new_height: u32,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let src_image = fr::Image::from_vec_u8(
        NonZeroU32::new(raster.width).ok_or("Invalid width")?,
        NonZeroU32::new(raster.height).ok_or("Invalid height")?,
        raster.pixels.clone(),
        fr::PixelType::U8x3,
    )?;

    let dst_width = NonZeroU32::new(new_width).ok_or("Invalid target width")?;
    let dst_height = NonZeroU32::new(new_height).ok_or("Invalid target height")?;
    let mut dst_image = fr::Image::new(dst_width, dst_height, fr::PixelType::U8x3);

    let mut resizer = fr::Resizer::new(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear));
    resizer.resize(&src_image.view(), &mut dst_image.view_mut())?;

    Ok(dst_image.into_vec())
}

/// Nearest-neighbour resize; an empty source becomes black
fn resize_nearest(raster: &Raster, new_width: u32, new_height: u32) -> Vec<u8> {
    let mut out = vec![0u8; new_width as usize * new_height as usize * 3];
    if raster.width == 0 || raster.height == 0 {
        return out;
    }
    for y in 0..new_height {
        let sy = (u64::from(y) * u64::from(raster.height) / u64::from(new_height)) as u32;
        for x in 0..new_width {
            let sx = (u64::from(x) * u64::from(raster.width) / u64::from(new_width)) as u32;
            let i = (y as usize * new_width as usize + x as usize) * 3;
            if let Some(px) = raster.pixel(sx, sy) {
                out[i..i + 3].copy_from_slice(&px);
            }
        }
    }
    out
}
