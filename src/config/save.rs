use crate::config::load::{DETECTION_POINTS_FILE, SETTINGS_FILE};
use crate::config::types::{DetectionPoints, UserSettings};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save_settings(settings: &UserSettings) -> Result<()> {
    let path = Path::new(SETTINGS_FILE);
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

pub fn save_detection_points(points: &DetectionPoints) -> Result<()> {
    let path = Path::new(DETECTION_POINTS_FILE);
    let content =
        serde_json::to_string_pretty(points).context("Failed to serialize detection points")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write detection points to {}", path.display()))?;

    Ok(())
}
