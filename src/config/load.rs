use crate::config::types::{Config, DetectionPoints, UserSettings};
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

pub const SETTINGS_FILE: &str = "settings.json";
pub const DETECTION_POINTS_FILE: &str = "detection_points.json";

impl Config {
    pub fn new() -> Result<Self> {
        let settings = Self::load_settings().unwrap_or_else(|e| {
            warn!("無法載入設定，改用預設值: {e}");
            UserSettings::default()
        });
        let detection_points = Self::load_detection_points()?;

        Ok(Self {
            settings,
            detection_points,
        })
    }

    fn load_settings() -> Result<UserSettings> {
        let path = Path::new(SETTINGS_FILE);
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// 偵測點檔案不存在不是錯誤，代表使用者尚未手動校準
    fn load_detection_points() -> Result<Option<DetectionPoints>> {
        let path = Path::new(DETECTION_POINTS_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read detection points from {}", path.display()))?;

        let points = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse detection points from {}", path.display()))?;
        Ok(Some(points))
    }
}
