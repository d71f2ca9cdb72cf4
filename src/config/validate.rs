use crate::config::types::{MARGIN_MAX, MAX_THREADS, MIN_THREADS, Margins, RunConfig};
use anyhow::{Result, bail};
use rust_i18n::t;
use std::fs;
use std::path::{Path, PathBuf};

/// 裁切後的中間檔名，輸入檔不可佔用
pub const AFTERCROP_NAME: &str = "aftercrop.mp4";

pub fn check_margins(margins: &Margins) -> Result<()> {
    if margins.top > MARGIN_MAX
        || margins.bottom > MARGIN_MAX
        || margins.left > MARGIN_MAX
        || margins.right > MARGIN_MAX
    {
        bail!("{}", t!("errors.margin_too_large", max = MARGIN_MAX));
    }
    Ok(())
}

pub fn check_start_end_seconds(start_second: u64, end_second: u64) -> Result<()> {
    if start_second >= end_second {
        bail!("{}", t!("errors.end_must_be_greater"));
    }
    Ok(())
}

pub fn check_thread_num(thread_num: usize) -> Result<()> {
    if !(MIN_THREADS..=MAX_THREADS).contains(&thread_num) {
        bail!("{}", t!("errors.thread_num"));
    }
    Ok(())
}

impl RunConfig {
    /// 處理開始前的完整參數驗證，任一項失敗都不進入剪輯
    pub fn validate(&self) -> Result<()> {
        check_margins(&self.margins)?;
        check_thread_num(self.thread_num)?;
        check_start_end_seconds(self.start_second, self.end_second)?;
        Ok(())
    }
}

/// 工作資料夾必須恰好有一個輸入檔，且檔名不能以 out 開頭
/// （out 前綴保留給中間產物）
pub fn check_file_and_return_path(working_dir: &Path) -> Result<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(working_dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();

    if files.len() != 1 {
        bail!("{}", t!("errors.single_file_required"));
    }

    let path = files.remove(0);
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    if name.starts_with("out") {
        bail!("{}", t!("errors.no_out_prefix"));
    }
    Ok(path)
}

/// 裁切前的檔名檢查：不可佔用 aftercrop.mp4，也不可覆蓋既有輸出
pub fn check_crop_names(working_dir: &Path, input_name: &str) -> Result<()> {
    if input_name == AFTERCROP_NAME {
        bail!("{}", t!("errors.aftercrop_name"));
    }
    if working_dir.join(AFTERCROP_NAME).exists() {
        bail!("{}", t!("errors.duplicate_file"));
    }
    Ok(())
}

pub fn check_measure_second(measure_second: f64, fps: f64, frame_count: u64) -> Result<()> {
    if !measure_second.is_finite() || measure_second < 0.0 {
        bail!("{}", t!("errors.measure_second_param"));
    }
    if measure_second >= frame_count as f64 / fps {
        bail!("{}", t!("errors.margin_exceeds_length"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::Margins;

    #[test]
    fn test_margins_within_cap() {
        let margins = Margins {
            top: 0,
            bottom: 500,
            left: 12,
            right: 499,
        };
        assert!(check_margins(&margins).is_ok());
    }

    #[test]
    fn test_margins_over_cap() {
        let margins = Margins {
            top: 501,
            ..Margins::default()
        };
        assert!(check_margins(&margins).is_err());
    }

    #[test]
    fn test_start_end_order() {
        assert!(check_start_end_seconds(10, 90).is_ok());
        assert!(check_start_end_seconds(90, 90).is_err());
        assert!(check_start_end_seconds(91, 90).is_err());
    }

    #[test]
    fn test_thread_bounds() {
        assert!(check_thread_num(1).is_ok());
        assert!(check_thread_num(16).is_ok());
        assert!(check_thread_num(0).is_err());
        assert!(check_thread_num(17).is_err());
    }

    #[test]
    fn test_single_input_file_rule() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_file_and_return_path(dir.path()).is_err());

        std::fs::write(dir.path().join("rec.mp4"), b"x").unwrap();
        let found = check_file_and_return_path(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "rec.mp4");

        std::fs::write(dir.path().join("other.mp4"), b"x").unwrap();
        assert!(check_file_and_return_path(dir.path()).is_err());
    }

    #[test]
    fn test_out_prefix_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("out_3.mp4"), b"x").unwrap();
        assert!(check_file_and_return_path(dir.path()).is_err());
    }

    #[test]
    fn test_measure_second_bounds() {
        assert!(check_measure_second(5.0, 30.0, 300).is_ok());
        assert!(check_measure_second(10.0, 30.0, 300).is_err());
        assert!(check_measure_second(-1.0, 30.0, 300).is_err());
    }
}
