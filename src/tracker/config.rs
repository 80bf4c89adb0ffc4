//! Configuration for a tracking run.
//!
//! Loads settings from config.json at startup. Any key may be omitted;
//! missing keys take their default value.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<TrackerConfig> = OnceLock::new();

/// What to do when a second name appears before the first one got a count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanNamePolicy {
    /// The newer name replaces the pending one (the older name is lost).
    #[default]
    Replace,
    /// The pending name is kept and the newer one is dropped.
    KeepFirst,
}

/// Scroll gesture parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Vertical drag distance in pixels (upwards)
    pub drag_distance: i32,
    /// Drag anchor x, as a multiple of region width from the region's left edge
    pub anchor_x_factor: f32,
    /// Drag anchor y, as a multiple of region height from the region's top edge
    pub anchor_y_factor: f32,
    /// Time to move the cursor to the anchor (milliseconds)
    pub approach_ms: u64,
    /// Duration of the drag itself (milliseconds)
    pub drag_ms: u64,
    /// Pause before releasing the button (milliseconds)
    pub hold_ms: u64,
    /// Pause after release before capturing (milliseconds)
    pub settle_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            drag_distance: 233,
            anchor_x_factor: 1.5,
            anchor_y_factor: 0.75,
            approach_ms: 200,
            drag_ms: 500,
            hold_ms: 1000,
            settle_ms: 500,
        }
    }
}

/// Output settings for the `report` command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub chart_file: String,
    pub stats_file: String,
    /// Number of players drawn in the history chart
    pub top_players: usize,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            chart_file: "fan_history.png".to_string(),
            stats_file: "fan_stats.json".to_string(),
            top_players: 10,
            chart_width: 1200,
            chart_height: 700,
        }
    }
}

/// Complete tracker configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Substring of the game window title
    pub window_title: String,
    /// Wait after focusing the window (milliseconds)
    pub focus_delay_ms: u64,
    /// Saved region file
    pub region_file: String,
    /// Historical fan table
    pub table_file: String,
    /// Image file each page is captured to (inside captures/)
    pub capture_file: String,
    /// OCR detections below this confidence (0.0-1.0) are discarded
    pub min_confidence: f32,
    /// Exact texts that are UI labels, never names
    pub ignored_labels: Vec<String>,
    pub orphan_name_policy: OrphanNamePolicy,
    /// Identical consecutive pages needed to decide the list has ended
    pub duplicate_limit: usize,
    /// Hard cap on captured pages; unlimited when absent
    pub max_pages: Option<u32>,
    pub scroll: ScrollConfig,
    /// Integer upscale factor applied before OCR
    pub ocr_scale: u32,
    /// Tesseract page segmentation mode
    pub tesseract_psm: u32,
    pub report: ReportConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            window_title: "Umamusume".to_string(),
            focus_delay_ms: 2000,
            region_file: "selected_region.json".to_string(),
            table_file: "clubTracker.csv".to_string(),
            capture_file: "club_list_capture.png".to_string(),
            min_confidence: 0.4,
            ignored_labels: ["Leader", "Officer", "Members", "Total Fans", "Last Login"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            orphan_name_policy: OrphanNamePolicy::Replace,
            duplicate_limit: 3,
            max_pages: None,
            scroll: ScrollConfig::default(),
            ocr_scale: 2,
            // Sparse text: names and counts come out as separate lines
            tesseract_psm: 11,
            report: ReportConfig::default(),
        }
    }
}

/// Loads configuration from the given file or returns defaults.
pub fn load_config_from(config_path: &Path) -> TrackerConfig {
    crate::log(&format!("Looking for config at: {}", config_path.display()));

    if config_path.exists() {
        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log("Config loaded from config.json");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse config.json: {}. Using defaults.",
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read config.json: {}. Using defaults.",
                    e
                ));
            }
        }
    } else {
        crate::log("config.json not found. Using default config.");
    }

    TrackerConfig::default()
}

/// Initializes the global configuration from config.json next to the executable.
pub fn init_config() {
    let config_path = crate::paths::get_exe_dir().join("config.json");
    let _ = CONFIG.set(load_config_from(&config_path));
}

/// Returns the global configuration, falling back to defaults if
/// `init_config()` was never called.
pub fn get_config() -> &'static TrackerConfig {
    CONFIG.get_or_init(TrackerConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.json"));
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "window_title": "Uma", "scroll": { "drag_distance": 300 }, "orphan_name_policy": "keep_first" }"#,
        )
        .unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.window_title, "Uma");
        assert_eq!(config.scroll.drag_distance, 300);
        assert_eq!(config.scroll.hold_ms, 1000);
        assert_eq!(config.orphan_name_policy, OrphanNamePolicy::KeepFirst);
        assert_eq!(config.duplicate_limit, 3);
        assert_eq!(config.min_confidence, 0.4);
    }

    #[test]
    fn test_invalid_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ window_title: ").unwrap();
        assert_eq!(load_config_from(&path), TrackerConfig::default());
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let shipped = include_str!("../../config.json");
        let config: TrackerConfig = serde_json::from_str(shipped).unwrap();
        assert_eq!(config, TrackerConfig::default());
    }
}
