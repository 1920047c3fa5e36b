//! PDF comparison pipeline

mod align;
mod compare;
mod config;
mod diff_map;
#[cfg(feature = "pdf")]
mod document;
mod error;
mod highlight;
mod mode;
mod source;
mod types;
mod zoom;

pub use align::{Alignment, OpTag, Opcode, align, opcodes};
pub use compare::{Comparison, HighlightStatus, PagePair, compare};
pub use config::{CompareConfig, Threshold};
pub use diff_map::{DIFFERENT_COLOR, DifferenceMap, SAME_COLOR, difference_map, jet};
#[cfg(feature = "pdf")]
pub use document::MupdfDocument;
pub use error::CompareError;
pub use highlight::{HighlightOutcome, HighlightParams, highlight_documents, highlight_rasters};
pub use mode::{ComparisonMode, luminance, otsu_threshold};
pub use source::{PageSource, extract_tokens, render_pages};
pub use types::*;
pub use zoom::Zoom;
