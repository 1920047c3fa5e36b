//! Insertion/deletion overlays on rendered pages
//!
//! Highlighting is best effort. Rendering the pages is required, but any
//! failure while extracting, aligning or locating the overlays degrades to
//! [`HighlightOutcome::FallbackRaw`] with the untouched rasters.

use log::{debug, warn};

use super::align::align;
use super::error::CompareError;
use super::source::{PageSource, extract_tokens, render_pages};
use super::types::{BBox, Raster, Rgba, Token};

/// Overlay colors and render scale for one highlighting pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightParams {
    pub scale: f32,
    pub insertion_color: Rgba,
    pub deletion_color: Rgba,
}

/// Rendered pages of both sides and whether overlays were applied
#[derive(Debug)]
pub enum HighlightOutcome {
    Highlighted {
        left: Vec<Raster>,
        right: Vec<Raster>,
        /// Number of overlays painted across both sides
        painted: usize,
    },
    FallbackRaw {
        left: Vec<Raster>,
        right: Vec<Raster>,
        reason: String,
    },
}

impl HighlightOutcome {
    #[must_use]
    pub fn is_highlighted(&self) -> bool {
        matches!(self, Self::Highlighted { .. })
    }

    #[must_use]
    pub fn into_rasters(self) -> (Vec<Raster>, Vec<Raster>) {
        match self {
            Self::Highlighted { left, right, .. } | Self::FallbackRaw { left, right, .. } => {
                (left, right)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// One overlay, already resolved to pixel coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Paint {
    side: Side,
    page: usize,
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
    color: Rgba,
}

/// Render both documents and paint overlays where their words differ.
///
/// Errors only when a document cannot be rendered.
pub fn highlight_documents(
    a: &dyn PageSource,
    b: &dyn PageSource,
    params: &HighlightParams,
) -> Result<HighlightOutcome, CompareError> {
    let left = render_pages(a, params.scale)?;
    let right = render_pages(b, params.scale)?;

    let tokens = extract_tokens(a).and_then(|text_a| Ok((text_a, extract_tokens(b)?)));
    Ok(match tokens {
        Ok((text_a, text_b)) => highlight_rasters(&text_a, &text_b, left, right, params),
        Err(e) => fallback(left, right, &e),
    })
}

/// Paint overlays for already extracted tokens onto already rendered pages.
///
/// Either every overlay is applied or, on failure, none is.
pub fn highlight_rasters(
    text_a: &[Token],
    text_b: &[Token],
    mut left: Vec<Raster>,
    mut right: Vec<Raster>,
    params: &HighlightParams,
) -> HighlightOutcome {
    let paints = match plan_overlays(text_a, text_b, &left, &right, params) {
        Ok(paints) => paints,
        Err(e) => return fallback(left, right, &e),
    };

    for paint in &paints {
        let raster = match paint.side {
            Side::Left => &mut left[paint.page],
            Side::Right => &mut right[paint.page],
        };
        fill_rect(raster, paint);
    }
    debug!("Painted {} overlays", paints.len());

    HighlightOutcome::Highlighted {
        left,
        right,
        painted: paints.len(),
    }
}

fn fallback(left: Vec<Raster>, right: Vec<Raster>, error: &CompareError) -> HighlightOutcome {
    warn!("Highlighting failed, showing plain pages: {error}");
    HighlightOutcome::FallbackRaw {
        left,
        right,
        reason: error.to_string(),
    }
}

fn plan_overlays(
    text_a: &[Token],
    text_b: &[Token],
    left: &[Raster],
    right: &[Raster],
    params: &HighlightParams,
) -> Result<Vec<Paint>, CompareError> {
    for raster in left.iter().chain(right) {
        raster.check()?;
    }

    let alignment = align(text_a, text_b);
    let mut paints = Vec::new();

    for pair in alignment.pairs() {
        match pair {
            (None, Some(inserted)) => {
                paints.push(locate(Side::Right, inserted, right, params.insertion_color, params)?);
            }
            (Some(deleted), None) => {
                paints.push(locate(Side::Left, deleted, left, params.deletion_color, params)?);
            }
            (Some(old), Some(new)) if old.text != new.text => {
                paints.push(locate(Side::Left, old, left, params.deletion_color, params)?);
                paints.push(locate(Side::Right, new, right, params.insertion_color, params)?);
            }
            _ => {}
        }
    }

    Ok(paints)
}

fn locate(
    side: Side,
    token: &Token,
    rasters: &[Raster],
    color: Rgba,
    params: &HighlightParams,
) -> Result<Paint, CompareError> {
    let raster = rasters
        .get(token.page_index)
        .ok_or(CompareError::PageOutOfRange {
            page: token.page_index,
            page_count: rasters.len(),
        })?;
    let (x0, y0, x1, y1) = pixel_rect(token.bbox.scaled(params.scale), raster.width, raster.height);

    Ok(Paint {
        side,
        page: token.page_index,
        x0,
        y0,
        x1,
        y1,
        color,
    })
}

/// Round a scaled box outward and clip it to the raster
fn pixel_rect(bbox: BBox, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let max_x = width as f32;
    let max_y = height as f32;
    let x0 = bbox.x0.min(bbox.x1).floor().clamp(0.0, max_x);
    let y0 = bbox.y0.min(bbox.y1).floor().clamp(0.0, max_y);
    let x1 = bbox.x0.max(bbox.x1).ceil().clamp(0.0, max_x);
    let y1 = bbox.y0.max(bbox.y1).ceil().clamp(0.0, max_y);
    (x0 as u32, y0 as u32, x1 as u32, y1 as u32)
}

fn fill_rect(raster: &mut Raster, paint: &Paint) {
    let stride = raster.width as usize * 3;
    let (x0, x1) = (paint.x0 as usize, paint.x1 as usize);
    if x0 >= x1 {
        return;
    }
    for y in paint.y0 as usize..paint.y1 as usize {
        let row = &mut raster.pixels[y * stride + x0 * 3..y * stride + x1 * 3];
        for px in row.chunks_exact_mut(3) {
            paint.color.blend_over(px);
        }
    }
}
