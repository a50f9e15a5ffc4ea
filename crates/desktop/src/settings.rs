use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use moodmirror_core::shared::constants::{
    DEFAULT_CONFIDENCE, DEFAULT_DEVICE_INDEX, DEFAULT_FAILURE_THRESHOLD, DEFAULT_TICK_PERIOD,
};

const APP_DIR_NAME: &str = "MoodMirror";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub camera_index: u32,
    pub tick_ms: u32,
    /// Face detection confidence in percent.
    pub confidence: u32,
    pub failure_threshold: u32,
    pub high_contrast: bool,
    pub font_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_index: DEFAULT_DEVICE_INDEX,
            tick_ms: DEFAULT_TICK_PERIOD.as_millis() as u32,
            confidence: (DEFAULT_CONFIDENCE * 100.0).round() as u32,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD as u32,
            high_contrast: false,
            font_scale: 1.0,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            self.save_to(&path);
        }
    }

    fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    log::warn!("Failed to save settings to {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("Failed to serialize settings: {e}"),
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1) as u64)
    }

    pub fn confidence_fraction(&self) -> f64 {
        self.confidence.min(100) as f64 / 100.0
    }

    /// The settings that require rebuilding the camera pipeline when changed.
    pub fn pipeline_key(&self) -> (u32, u32, u32, u32) {
        (
            self.camera_index,
            self.tick_ms,
            self.confidence,
            self.failure_threshold,
        )
    }
}
