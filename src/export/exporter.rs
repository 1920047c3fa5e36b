use crate::export::filename::{PageSide, page_file_name};
use crate::pdf::{Comparison, Raster};
use anyhow::{Context, Result};
use image::RgbImage;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ExportError {
    InvalidRaster { page: usize, width: u32, height: u32 },
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::InvalidRaster {
                page,
                width,
                height,
            } => write!(
                f,
                "Page {} raster does not match its size {width}x{height}",
                page + 1
            ),
        }
    }
}

impl std::error::Error for ExportError {}

/// Writes the rasters of a comparison as PNG files
pub struct PageExporter;

impl PageExporter {
    /// Write every page of `comparison` into `out_dir`, creating it if needed.
    ///
    /// Returns the written paths in page order: side A, side B, difference map.
    /// A comparison without pages writes nothing and leaves `out_dir` alone.
    pub fn export(comparison: &Comparison, out_dir: &Path) -> Result<Vec<PathBuf>> {
        if comparison.pages.is_empty() {
            info!("Comparison has no pages, nothing to export");
            return Ok(Vec::new());
        }

        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

        info!(
            "Exporting {} pages to {}",
            comparison.page_count(),
            out_dir.display()
        );

        let mut written = Vec::new();
        for page in &comparison.pages {
            match &page.left {
                Some(raster) => {
                    written.push(Self::write_raster(raster, out_dir, PageSide::Left)?);
                }
                None => warn!("Page {} missing in first document", page.index + 1),
            }
            match &page.right {
                Some(raster) => {
                    written.push(Self::write_raster(raster, out_dir, PageSide::Right)?);
                }
                None => warn!("Page {} missing in second document", page.index + 1),
            }
            if let Some(map) = &page.diff_map {
                let raster = map.as_raster(page.index);
                written.push(Self::write_raster(&raster, out_dir, PageSide::DiffMap)?);
            }
        }

        info!("Exported {} images", written.len());
        Ok(written)
    }

    fn write_raster(raster: &Raster, out_dir: &Path, side: PageSide) -> Result<PathBuf> {
        let path = out_dir.join(page_file_name(raster.page_index, side));
        let image = RgbImage::from_raw(raster.width, raster.height, raster.pixels.clone())
            .ok_or(ExportError::InvalidRaster {
                page: raster.page_index,
                width: raster.width,
                height: raster.height,
            })?;

        image
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}
