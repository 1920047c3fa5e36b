//! Per-comparison configuration

use std::fmt;

use super::error::CompareError;
use super::highlight::HighlightParams;
use super::mode::ComparisonMode;
use super::types::Rgba;

/// Difference threshold in `[1, 100]`.
///
/// A pixel differs when its largest per-channel difference exceeds it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(u8);

impl Threshold {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;
    pub const DEFAULT: Threshold = Threshold(30);

    pub fn new(value: u8) -> Result<Self, CompareError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(CompareError::InvalidConfig(format!(
                "threshold must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Threshold {
    type Error = CompareError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Everything one comparison pass depends on besides the two documents
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompareConfig {
    /// Render scale, must be positive
    pub scale: f32,
    pub highlight_enabled: bool,
    pub insertion_color: Rgba,
    pub deletion_color: Rgba,
    pub threshold: Threshold,
    pub mode: ComparisonMode,
    pub show_difference_map: bool,
}

impl CompareConfig {
    /// Translucent green
    pub const DEFAULT_INSERTION: Rgba = Rgba::new(0, 255, 0, 64);
    /// Translucent red
    pub const DEFAULT_DELETION: Rgba = Rgba::new(255, 0, 0, 64);

    pub fn validate(&self) -> Result<(), CompareError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(CompareError::InvalidConfig(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn highlight_params(&self) -> HighlightParams {
        HighlightParams {
            scale: self.scale,
            insertion_color: self.insertion_color,
            deletion_color: self.deletion_color,
        }
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            highlight_enabled: true,
            insertion_color: Self::DEFAULT_INSERTION,
            deletion_color: Self::DEFAULT_DELETION,
            threshold: Threshold::default(),
            mode: ComparisonMode::default(),
            show_difference_map: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bounds() {
        assert!(Threshold::new(0).is_err());
        assert!(Threshold::new(101).is_err());
        assert_eq!(Threshold::new(1).unwrap().get(), 1);
        assert_eq!(Threshold::try_from(100).unwrap().get(), 100);
        assert_eq!(Threshold::default().get(), 30);
    }

    #[test]
    fn test_default_config() {
        let config = CompareConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.highlight_enabled);
        assert!(!config.show_difference_map);
        assert_eq!(config.mode, ComparisonMode::Rgb);
        assert_eq!(config.insertion_color, Rgba::new(0, 255, 0, 64));
        assert_eq!(config.deletion_color, Rgba::new(255, 0, 0, 64));
    }

    #[test]
    fn test_validate_rejects_bad_scale() {
        for scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = CompareConfig {
                scale,
                ..CompareConfig::default()
            };
            assert!(config.validate().is_err(), "scale {scale} accepted");
        }
    }
}
