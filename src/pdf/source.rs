//! Document access used by the comparison pipeline
//!
//! A [`PageSource`] is an opened paginated document. Opening happens in the
//! implementor's constructor and closing happens on drop, so the trait only
//! covers what the pipeline reads: the page count, word tokens per page and a
//! rasterized page at a given scale.

use log::debug;

use super::error::CompareError;
use super::types::{Raster, Token};

pub trait PageSource {
    /// Number of pages in the document
    fn page_count(&self) -> Result<usize, CompareError>;

    /// Word tokens of one page in the page's storage order
    fn page_tokens(&self, page: usize) -> Result<Vec<Token>, CompareError>;

    /// Rasterize one page; pixel size is the native page size times `scale`
    fn render_page(&self, page: usize, scale: f32) -> Result<Raster, CompareError>;
}

/// Flat token sequence across all pages, page index preserved
pub fn extract_tokens(doc: &dyn PageSource) -> Result<Vec<Token>, CompareError> {
    let page_count = doc.page_count()?;
    let mut tokens = Vec::new();
    for page in 0..page_count {
        let page_tokens = doc.page_tokens(page)?;
        debug!("Page {page}: {} tokens", page_tokens.len());
        tokens.extend(page_tokens);
    }
    Ok(tokens)
}

/// One raster per page at `scale`
pub fn render_pages(doc: &dyn PageSource, scale: f32) -> Result<Vec<Raster>, CompareError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(CompareError::InvalidConfig(format!(
            "scale must be positive, got {scale}"
        )));
    }
    let page_count = doc.page_count()?;
    (0..page_count)
        .map(|page| {
            let raster = doc.render_page(page, scale)?;
            raster.check()?;
            Ok(raster)
        })
        .collect()
}
