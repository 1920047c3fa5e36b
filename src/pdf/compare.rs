//! One comparison pass over a pair of documents

use log::{debug, info};

use super::config::CompareConfig;
use super::diff_map::{DifferenceMap, difference_map};
use super::error::CompareError;
use super::highlight::{HighlightOutcome, highlight_documents};
use super::source::{PageSource, render_pages};
use super::types::Raster;

/// Which highlighting path produced the pages
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HighlightStatus {
    Disabled,
    Highlighted { painted: usize },
    FallbackRaw { reason: String },
}

/// Output for one page index
#[derive(Debug)]
pub struct PagePair {
    /// Page number (0-indexed)
    pub index: usize,
    /// Side A, absent when document A is shorter
    pub left: Option<Raster>,
    /// Side B, absent when document B is shorter
    pub right: Option<Raster>,
    /// Present when requested and both sides exist
    pub diff_map: Option<DifferenceMap>,
}

/// Result of comparing two documents
#[derive(Debug)]
pub struct Comparison {
    pub pages: Vec<PagePair>,
    pub highlight: HighlightStatus,
}

impl Comparison {
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total differing pixels over all difference maps
    #[must_use]
    pub fn differing_pixels(&self) -> usize {
        self.pages
            .iter()
            .filter_map(|p| p.diff_map.as_ref())
            .map(|m| m.differing)
            .sum()
    }
}

/// Compare two documents with an explicit configuration.
///
/// Fails when either document cannot be read or rendered. A failure while
/// highlighting is not an error; it shows up as
/// [`HighlightStatus::FallbackRaw`].
pub fn compare(
    a: &dyn PageSource,
    b: &dyn PageSource,
    config: &CompareConfig,
) -> Result<Comparison, CompareError> {
    config.validate()?;

    let pages_a = a.page_count()?;
    let pages_b = b.page_count()?;
    let total_pages = pages_a.max(pages_b);
    info!("Comparing {total_pages} pages ({pages_a} vs {pages_b})");

    let (left, right, highlight) = if config.highlight_enabled {
        match highlight_documents(a, b, &config.highlight_params())? {
            HighlightOutcome::Highlighted {
                left,
                right,
                painted,
            } => (left, right, HighlightStatus::Highlighted { painted }),
            HighlightOutcome::FallbackRaw {
                left,
                right,
                reason,
            } => (left, right, HighlightStatus::FallbackRaw { reason }),
        }
    } else {
        (
            render_pages(a, config.scale)?,
            render_pages(b, config.scale)?,
            HighlightStatus::Disabled,
        )
    };

    let mut left = left.into_iter();
    let mut right = right.into_iter();
    let mut pages = Vec::with_capacity(total_pages);

    for index in 0..total_pages {
        let page_a = left.next().map(|r| config.mode.apply(r));
        let page_b = right.next().map(|r| config.mode.apply(r));

        let diff_map = match (&page_a, &page_b) {
            (Some(pa), Some(pb)) if config.show_difference_map => {
                Some(difference_map(pa, pb, config.threshold))
            }
            _ => None,
        };
        debug!(
            "Page {index}: left={} right={} diff_map={}",
            page_a.is_some(),
            page_b.is_some(),
            diff_map.is_some()
        );

        pages.push(PagePair {
            index,
            left: page_a,
            right: page_b,
            diff_map,
        });
    }

    info!("Comparison complete");
    Ok(Comparison { pages, highlight })
}
