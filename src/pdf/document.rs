//! MuPDF-backed [`PageSource`]

use std::path::{Path, PathBuf};

use log::{debug, info};
use mupdf::text_page::TextBlockType;
use mupdf::{Colorspace, Document, Matrix, Page, Pixmap, Quad, TextPageFlags};

use super::error::CompareError;
use super::source::PageSource;
use super::types::{BBox, Raster, Token};

/// An opened PDF document. Closed when dropped.
pub struct MupdfDocument {
    doc: Document,
    path: PathBuf,
    page_count: usize,
}

impl MupdfDocument {
    pub fn open(path: &Path) -> Result<Self, CompareError> {
        let doc = Document::open(path.to_string_lossy().as_ref()).map_err(|e| {
            CompareError::Open {
                path: path.to_path_buf(),
                detail: e.to_string(),
            }
        })?;
        let page_count = doc.page_count()?.max(0) as usize;
        info!("Opened {path:?} ({page_count} pages)");

        Ok(Self {
            doc,
            path: path.to_path_buf(),
            page_count,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_page(&self, page_num: usize) -> Result<Page, CompareError> {
        if page_num >= self.page_count {
            return Err(CompareError::PageOutOfRange {
                page: page_num,
                page_count: self.page_count,
            });
        }
        Ok(self.doc.load_page(page_num as i32)?)
    }
}

impl PageSource for MupdfDocument {
    fn page_count(&self) -> Result<usize, CompareError> {
        Ok(self.page_count)
    }

    fn page_tokens(&self, page_num: usize) -> Result<Vec<Token>, CompareError> {
        let page = self.load_page(page_num)?;
        let bounds = page.bounds()?;
        extract_words(&page, page_num, (bounds.x0, bounds.y0))
    }

    fn render_page(&self, page_num: usize, scale: f32) -> Result<Raster, CompareError> {
        let page = self.load_page(page_num)?;
        let rgb = Colorspace::device_rgb();
        let pixmap = page.to_pixmap(&Matrix::new_scale(scale, scale), &rgb, false, false)?;
        debug!(
            "Rendered page {page_num} of {:?} at {scale}: {}x{}",
            self.path,
            pixmap.width(),
            pixmap.height()
        );

        let pixels = pixmap_to_rgb(&pixmap)?;
        Raster::from_rgb(pixmap.width(), pixmap.height(), page_num, pixels)
    }
}

/// Split every text line into whitespace-separated words.
///
/// Coordinates are shifted so that the page's top-left corner is the origin,
/// matching pixel (0, 0) of the rendered raster.
fn extract_words(
    page: &Page,
    page_num: usize,
    origin: (f32, f32),
) -> Result<Vec<Token>, CompareError> {
    let text_page = page.to_text_page(TextPageFlags::empty())?;
    let mut words = Vec::new();

    for block in text_page.blocks() {
        if block.r#type() != TextBlockType::Text {
            continue;
        }
        for line in block.lines() {
            let chars = line.chars().map(|ch| (ch.char(), quad_bbox(&ch.quad())));
            words.extend(words_in_line(chars, page_num, origin));
        }
    }

    Ok(words)
}

/// Axis-aligned bounds of a (possibly rotated) character quad
fn quad_bbox(quad: &Quad) -> BBox {
    let xs = [quad.ul.x, quad.ur.x, quad.ll.x, quad.lr.x];
    let ys = [quad.ul.y, quad.ur.y, quad.ll.y, quad.lr.y];
    BBox::new(
        xs.iter().copied().fold(f32::INFINITY, f32::min),
        ys.iter().copied().fold(f32::INFINITY, f32::min),
        xs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        ys.iter().copied().fold(f32::NEG_INFINITY, f32::max),
    )
}

/// Group the characters of one line into words.
///
/// A word is a maximal run of non-whitespace characters; its box is the
/// union of the character boxes, shifted by `origin`. Characters without a
/// Unicode mapping end the current word.
fn words_in_line(
    chars: impl IntoIterator<Item = (Option<char>, BBox)>,
    page_num: usize,
    origin: (f32, f32),
) -> Vec<Token> {
    let mut words = Vec::new();
    let mut text = String::new();
    let mut bbox: Option<BBox> = None;

    for (ch, char_box) in chars {
        match ch {
            Some(c) if !c.is_whitespace() => {
                text.push(c);
                bbox = Some(bbox.map_or(char_box, |b| b.union(char_box)));
            }
            _ => flush_word(&mut words, &mut text, &mut bbox, page_num, origin),
        }
    }
    flush_word(&mut words, &mut text, &mut bbox, page_num, origin);
    words
}

fn flush_word(
    words: &mut Vec<Token>,
    text: &mut String,
    bbox: &mut Option<BBox>,
    page: usize,
    origin: (f32, f32),
) {
    if let Some(b) = bbox.take() {
        if !text.is_empty() {
            let shifted = BBox::new(
                b.x0 - origin.0,
                b.y0 - origin.1,
                b.x1 - origin.0,
                b.y1 - origin.1,
            );
            words.push(Token::new(std::mem::take(text), shifted, page));
        }
    }
    text.clear();
}

fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, CompareError> {
    packed_rgb(
        pixmap.samples(),
        pixmap.width() as usize,
        pixmap.height() as usize,
        pixmap.n() as usize,
        pixmap.stride() as usize,
    )
}

/// Copy the first three channels of every pixel into a packed RGB buffer.
///
/// `stride` is the byte length of one source row and may include padding.
fn packed_rgb(
    samples: &[u8],
    width: usize,
    height: usize,
    n: usize,
    stride: usize,
) -> Result<Vec<u8>, CompareError> {
    if n < 3 {
        return Err(CompareError::generic(format!(
            "Unsupported pixmap format: {n} channels"
        )));
    }

    let row_bytes = width * n;
    let expected_min = match height {
        0 => 0,
        h => stride.saturating_mul(h - 1) + row_bytes,
    };
    if samples.len() < expected_min || row_bytes > stride {
        return Err(CompareError::generic("Pixmap buffer size mismatch"));
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row_start = y * stride;
        let row = &samples[row_start..row_start + row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mupdf::Point;

    fn glyph(c: char, x: f32) -> (Option<char>, BBox) {
        (Some(c), BBox::new(x, 10.0, x + 5.0, 20.0))
    }

    fn line(text: &str) -> Vec<(Option<char>, BBox)> {
        text.chars()
            .enumerate()
            .map(|(i, c)| glyph(c, i as f32 * 5.0))
            .collect()
    }

    fn texts(words: &[Token]) -> Vec<&str> {
        words.iter().map(|w| w.text.as_str()).collect()
    }

    #[test]
    fn test_words_split_on_runs_of_spaces() {
        let words = words_in_line(line("ab   cd"), 0, (0.0, 0.0));
        assert_eq!(texts(&words), vec!["ab", "cd"]);
        assert_eq!(words[0].bbox, BBox::new(0.0, 10.0, 10.0, 20.0));
        assert_eq!(words[1].bbox, BBox::new(25.0, 10.0, 35.0, 20.0));
    }

    #[test]
    fn test_word_at_end_of_line_and_single_char_words() {
        let words = words_in_line(line(" a b xyz"), 3, (0.0, 0.0));
        assert_eq!(texts(&words), vec!["a", "b", "xyz"]);
        assert_eq!(words[0].bbox, BBox::new(5.0, 10.0, 10.0, 20.0));
        assert_eq!(words[2].bbox, BBox::new(25.0, 10.0, 40.0, 20.0));
        assert!(words.iter().all(|w| w.page_index == 3));
    }

    #[test]
    fn test_unmapped_char_ends_word() {
        let mut chars = line("ab");
        chars.push((None, BBox::new(10.0, 10.0, 15.0, 20.0)));
        chars.extend(
            line("cd")
                .into_iter()
                .map(|(c, b)| (c, BBox::new(b.x0 + 15.0, b.y0, b.x1 + 15.0, b.y1))),
        );
        let words = words_in_line(chars, 0, (0.0, 0.0));
        assert_eq!(texts(&words), vec!["ab", "cd"]);
    }

    #[test]
    fn test_words_are_shifted_to_page_origin() {
        let words = words_in_line(line("hi"), 0, (100.0, 50.0));
        assert_eq!(words[0].bbox, BBox::new(-100.0, -40.0, -90.0, -30.0));
        assert!(words_in_line(line("   "), 0, (0.0, 0.0)).is_empty());
    }

    #[test]
    fn test_quad_bbox_covers_rotated_quad() {
        let quad = Quad::new(
            Point::new(2.0, 1.0),
            Point::new(6.0, 3.0),
            Point::new(1.0, 5.0),
            Point::new(5.0, 7.0),
        );
        assert_eq!(quad_bbox(&quad), BBox::new(1.0, 1.0, 6.0, 7.0));
    }

    #[test]
    fn test_packed_rgb_drops_alpha_and_row_padding() {
        // 2x2 RGBA pixels, rows padded to 10 bytes
        let samples = [
            1, 2, 3, 255, 4, 5, 6, 255, 0, 0, //
            7, 8, 9, 128, 10, 11, 12, 0, 0, 0,
        ];
        let rgb = packed_rgb(&samples, 2, 2, 4, 10).unwrap();
        assert_eq!(rgb, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_packed_rgb_rejects_short_buffers() {
        assert!(packed_rgb(&[0; 11], 2, 2, 3, 6).is_err());
        assert!(packed_rgb(&[0; 12], 2, 2, 3, 5).is_err());
        assert!(packed_rgb(&[0; 8], 2, 2, 2, 4).is_err());
        assert_eq!(packed_rgb(&[], 0, 0, 3, 0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_pixmap_with_alpha_converts_to_rgb() {
        let mut pixmap = Pixmap::new_with_w_h(&Colorspace::device_rgb(), 3, 2, true).unwrap();
        assert_eq!(pixmap.n(), 4);
        for (i, px) in pixmap.samples_mut().chunks_exact_mut(4).enumerate() {
            px.copy_from_slice(&[i as u8, 10 + i as u8, 20 + i as u8, 255]);
        }

        let rgb = pixmap_to_rgb(&pixmap).unwrap();
        assert_eq!(rgb.len(), 3 * 2 * 3);
        assert_eq!(&rgb[..6], &[0, 10, 20, 1, 11, 21]);
        assert_eq!(&rgb[15..], &[5, 15, 25]);
    }
}
