use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pdf::{CompareConfig, CompareError, ComparisonMode, Rgba, Threshold, Zoom};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "pdfdiff";

/// Persisted defaults for a comparison; command-line flags override them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_zoom_percent")]
    pub zoom_percent: u16,

    #[serde(default = "default_true")]
    pub highlight_differences: bool,

    #[serde(default = "default_insertion_color")]
    pub insertion_color: Rgba,

    #[serde(default = "default_deletion_color")]
    pub deletion_color: Rgba,

    #[serde(default = "default_threshold")]
    pub difference_threshold: u8,

    #[serde(default)]
    pub comparison_mode: ComparisonMode,

    #[serde(default)]
    pub show_difference_map: bool,
}

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_zoom_percent() -> u16 {
    Zoom::DEFAULT_PERCENT
}

fn default_insertion_color() -> Rgba {
    CompareConfig::DEFAULT_INSERTION
}

fn default_deletion_color() -> Rgba {
    CompareConfig::DEFAULT_DELETION
}

fn default_threshold() -> u8 {
    Threshold::DEFAULT.get()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            zoom_percent: default_zoom_percent(),
            highlight_differences: true,
            insertion_color: default_insertion_color(),
            deletion_color: default_deletion_color(),
            difference_threshold: default_threshold(),
            comparison_mode: ComparisonMode::default(),
            show_difference_map: false,
        }
    }
}

impl Settings {
    /// Build the comparison configuration, rejecting out-of-range values
    pub fn compare_config(&self) -> Result<CompareConfig, CompareError> {
        Ok(CompareConfig {
            scale: Zoom::new(self.zoom_percent)?.scale(),
            highlight_enabled: self.highlight_differences,
            insertion_color: self.insertion_color,
            deletion_color: self.deletion_color,
            threshold: Threshold::new(self.difference_threshold)?,
            mode: self.comparison_mode,
            show_difference_map: self.show_difference_map,
        })
    }
}

pub fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

/// Load settings from the user config directory, creating the file with
/// defaults when it does not exist yet
pub fn load_settings() -> Settings {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return Settings::default();
    };

    if path.exists() {
        load_settings_from_path(&path)
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        let settings = Settings::default();
        save_settings_to_file(&settings, &path);
        settings
    }
}

/// Read settings from `path`; unreadable or invalid files yield defaults
pub fn load_settings_from_path(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(content) => match serde_yaml::from_str::<Settings>(&content) {
            Ok(mut settings) => {
                debug!("Loaded settings from {path:?}");

                if settings.version < CURRENT_VERSION {
                    migrate_settings(&mut settings);
                    save_settings_to_file(&settings, path);
                }
                settings
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
                Settings::default()
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
            Settings::default()
        }
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );
    settings.version = CURRENT_VERSION;
}

pub fn save_settings_to_file(settings: &Settings, path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    let content = generate_settings_yaml(settings);

    match fs::write(path, content) {
        Ok(()) => debug!("Saved settings to {path:?}"),
        Err(e) => error!("Failed to save settings to {path:?}: {e}"),
    }
}

fn generate_settings_yaml(settings: &Settings) -> String {
    let mut content = String::from(SETTINGS_HEADER);

    content.push_str(&format!("version: {}\n", settings.version));
    content.push_str(&format!("zoom_percent: {}\n", settings.zoom_percent));
    content.push_str(&format!(
        "highlight_differences: {}\n",
        settings.highlight_differences
    ));
    content.push_str(&format!(
        "insertion_color: \"{}\"\n",
        settings.insertion_color
    ));
    content.push_str(&format!("deletion_color: \"{}\"\n", settings.deletion_color));
    content.push_str(&format!(
        "difference_threshold: {}\n",
        settings.difference_threshold
    ));
    content.push_str(&format!("comparison_mode: {}\n", settings.comparison_mode));
    content.push_str(&format!(
        "show_difference_map: {}\n",
        settings.show_difference_map
    ));

    content
}

const SETTINGS_HEADER: &str = r##"# ============================================================================
# pdfdiff settings
# ============================================================================
# zoom_percent:          25..400, render scale in percent
# insertion_color:       "#RRGGBBAA" overlay on words only in the second PDF
# deletion_color:        "#RRGGBBAA" overlay on words only in the first PDF
# difference_threshold:  1..100, per-channel difference that counts as changed
# comparison_mode:       rgb | grayscale | text-only

"##;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_round_trip_through_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILENAME);

        save_settings_to_file(&Settings::default(), &path);
        assert!(path.exists());
        assert_eq!(load_settings_from_path(&path), Settings::default());
    }

    #[test]
    fn test_saved_file_starts_with_commented_header() {
        let content = generate_settings_yaml(&Settings::default());
        assert!(content.starts_with(SETTINGS_HEADER));
        assert!(content.contains("\"#RRGGBBAA\" overlay"));
        assert!(content.contains("insertion_color: \"#00ff0040\""));
        assert_eq!(
            serde_yaml::from_str::<Settings>(&content).unwrap(),
            Settings::default()
        );
    }

    #[test]
    fn test_old_version_is_migrated_and_rewritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        fs::write(&path, "version: 0
difference_threshold: 55
").unwrap();

        let settings = load_settings_from_path(&path);
        assert_eq!(settings.version, CURRENT_VERSION);
        assert_eq!(settings.difference_threshold, 55);

        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains(&format!("version: {CURRENT_VERSION}\n")));
        assert!(rewritten.contains("difference_threshold: 55\n"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        fs::write(
            &path,
            "version: 1\ncomparison_mode: text-only\ninsertion_color: \"#0000ff80\"\n",
        )
        .unwrap();

        let settings = load_settings_from_path(&path);
        assert_eq!(settings.comparison_mode, ComparisonMode::TextOnly);
        assert_eq!(settings.insertion_color, Rgba::new(0, 0, 255, 128));
        assert_eq!(settings.difference_threshold, 30);
        assert!(settings.highlight_differences);
    }

    #[test]
    fn test_invalid_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        fs::write(&path, "insertion_color: \"not a color\"\n").unwrap();

        assert_eq!(load_settings_from_path(&path), Settings::default());
    }

    #[test]
    fn test_compare_config_validates_ranges() {
        let settings = Settings {
            zoom_percent: 150,
            ..Settings::default()
        };
        let config = settings.compare_config().unwrap();
        assert!((config.scale - 1.5).abs() < f32::EPSILON);

        let bad_threshold = Settings {
            difference_threshold: 0,
            ..Settings::default()
        };
        assert!(bad_threshold.compare_config().is_err());

        let bad_zoom = Settings {
            zoom_percent: 10,
            ..Settings::default()
        };
        assert!(bad_zoom.compare_config().is_err());
    }
}
