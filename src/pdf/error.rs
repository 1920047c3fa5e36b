//! Errors raised by the comparison pipeline

use std::path::PathBuf;

/// Errors from opening, extracting, rendering or exporting documents
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[cfg(feature = "pdf")]
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::error::Error),

    #[error("failed to open {path:?}: {detail}")]
    Open { path: PathBuf, detail: String },

    #[error("page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("page {page} raster holds {len} bytes, expected {width}x{height} RGB")]
    InvalidRaster {
        page: usize,
        width: u32,
        height: u32,
        len: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding: {0}")]
    Image(#[from] image::ImageError),

    #[error("{detail}")]
    Generic { detail: String },
}

impl CompareError {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }
}
