//! Zoom level for page rendering
//!
//! Zoom is kept as an integer percentage so that stepping in and out is
//! exact; the render scale is derived from it.

use super::error::CompareError;

/// Zoom percentage used to derive the render scale
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Zoom {
    percent: u16,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            percent: Self::DEFAULT_PERCENT,
        }
    }
}

impl Zoom {
    /// 100% renders pages at their native size
    pub const DEFAULT_PERCENT: u16 = 100;
    /// Minimum allowed zoom percentage
    pub const MIN_PERCENT: u16 = 25;
    /// Maximum allowed zoom percentage
    pub const MAX_PERCENT: u16 = 400;
    /// Percentage points per zoom step
    pub const STEP: u16 = 10;

    /// Zoom at `percent`, rejecting values outside the allowed range
    pub fn new(percent: u16) -> Result<Self, CompareError> {
        if !(Self::MIN_PERCENT..=Self::MAX_PERCENT).contains(&percent) {
            return Err(CompareError::InvalidConfig(format!(
                "zoom must be between {}% and {}%, got {percent}%",
                Self::MIN_PERCENT,
                Self::MAX_PERCENT
            )));
        }
        Ok(Self { percent })
    }

    #[must_use]
    pub fn percent(self) -> u16 {
        self.percent
    }

    /// Render scale (1.0 = 100%)
    #[must_use]
    pub fn scale(self) -> f32 {
        f32::from(self.percent) / 100.0
    }

    /// Set the percentage, clamping to the allowed range
    pub fn set_percent(&mut self, percent: u16) {
        self.percent = Self::clamp_percent(percent);
    }

    /// Zoom in by one step
    pub fn step_in(&mut self) {
        self.set_percent(self.percent.saturating_add(Self::STEP));
    }

    /// Zoom out by one step
    pub fn step_out(&mut self) {
        self.set_percent(self.percent.saturating_sub(Self::STEP));
    }

    pub fn clamp_percent(percent: u16) -> u16 {
        percent.clamp(Self::MIN_PERCENT, Self::MAX_PERCENT)
    }
}
