//! 收尾：懶人模式的片段串接與兩種模式共用的暫存清理

use crate::component::pause_cutter::emitter::TEMP_PREFIX;
use crate::tools::{concat_videos, get_video_meta};
use anyhow::{Context, Result};
use log::{info, warn};
use rust_i18n::t;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const TEMP_FILENAME: &str = "temp_list.txt";
pub const LAZY_OUTPUT: &str = "output.mp4";

/// concat demuxer 的清單內容，一行一個片段
#[must_use]
pub fn manifest_lines(segment_names: &[String]) -> String {
    let mut manifest = String::new();
    for name in segment_names {
        manifest.push_str(&format!("file '{name}'\n"));
    }
    manifest
}

/// 懶人模式 worker 片段的檔名，依 worker 編號排列
#[must_use]
pub fn lazy_segment_name(worker: usize) -> String {
    format!("{TEMP_PREFIX}{worker}.mp4")
}

/// 把各 worker 的片段照順序接成最終輸出
///
/// 清單檔寫在工作目錄內，接完即刪
pub fn lazy_concat(working_dir: &Path, worker_count: usize) -> Result<PathBuf> {
    let names: Vec<String> = (0..worker_count)
        .map(lazy_segment_name)
        .filter(|name| working_dir.join(name).exists())
        .collect();

    let manifest = working_dir.join(TEMP_FILENAME);
    std::fs::write(&manifest, manifest_lines(&names))
        .with_context(|| format!("無法寫入串接清單: {}", manifest.display()))?;

    let output = working_dir.join(LAZY_OUTPUT);
    let result = concat_videos(&manifest, &output);
    let _ = std::fs::remove_file(&manifest);
    result?;

    Ok(output)
}

/// 刪掉所有暫存片段；`ignore_frame_cnt` 大於 0 時連太短的
/// 成品一起刪（幀數小於等於門檻的片段視為雜訊）
///
/// `protected` 內的檔案（來源影片等）絕不刪除
pub fn cleanup(working_dir: &Path, ignore_frame_cnt: u64, protected: &[PathBuf]) -> Result<()> {
    for entry in WalkDir::new(working_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if protected.iter().any(|p| p == path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if name.starts_with(TEMP_PREFIX) {
            std::fs::remove_file(path)
                .with_context(|| format!("刪除暫存檔失敗: {}", path.display()))?;
            continue;
        }

        if ignore_frame_cnt > 0 && name.ends_with(".mp4") {
            match get_video_meta(path) {
                Ok(meta) if meta.frame_count <= ignore_frame_cnt => {
                    std::fs::remove_file(path)
                        .with_context(|| format!("刪除片段失敗: {}", path.display()))?;
                    info!("{}", t!("cutter.segment_deleted", name = name));
                }
                Ok(_) => {}
                Err(err) => warn!("無法讀取片段資訊 {}: {err:#}", path.display()),
            }
        }
    }
    Ok(())
}
