use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// 剪輯流程需要的影片中繼資料
#[derive(Debug, Clone, Copy)]
pub struct VideoMeta {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub frame_count: u64,
}

impl VideoMeta {
    /// 整數幀率，開始/結束秒數換算幀編號時使用
    #[must_use]
    pub fn fps_int(&self) -> u64 {
        self.fps as u64
    }

    #[must_use]
    pub fn has_fractional_fps(&self) -> bool {
        (self.fps - self.fps.trunc()).abs() > f64::EPSILON
    }
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

fn run_ffprobe(path: &Path) -> Result<FfprobeOutput> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe 執行失敗: {stderr}");
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).with_context(|| "無法解析 ffprobe 輸出")
}

/// 使用 ffprobe 取得影片中繼資料
pub fn get_video_meta(path: &Path) -> Result<VideoMeta> {
    let probe = run_ffprobe(path)?;

    let video_stream = probe
        .streams
        .as_ref()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
        })
        .ok_or_else(|| anyhow::anyhow!("找不到視訊串流: {}", path.display()))?;

    let width = video_stream
        .width
        .ok_or_else(|| anyhow::anyhow!("無法取得影片寬度"))?;
    let height = video_stream
        .height
        .ok_or_else(|| anyhow::anyhow!("無法取得影片高度"))?;

    let fps = video_stream
        .r_frame_rate
        .as_ref()
        .and_then(|r| parse_frame_rate(r))
        .ok_or_else(|| anyhow::anyhow!("無法取得影片幀率"))?;

    // 幀數優先從 nb_frames，部分容器沒有就用時長換算
    let frame_count = match video_stream
        .nb_frames
        .as_ref()
        .and_then(|n| n.parse::<u64>().ok())
    {
        Some(n) => n,
        None => {
            let duration = probe
                .format
                .as_ref()
                .and_then(|f| f.duration.as_ref())
                .or(video_stream.duration.as_ref())
                .and_then(|d| d.parse::<f64>().ok())
                .ok_or_else(|| anyhow::anyhow!("無法取得影片長度"))?;
            (duration * fps).round() as u64
        }
    };

    Ok(VideoMeta {
        fps,
        width,
        height,
        frame_count,
    })
}

/// 檔案是否帶有音軌；沒有音軌不是錯誤
pub fn has_audio_stream(path: &Path) -> Result<bool> {
    let probe = run_ffprobe(path)?;
    Ok(probe
        .streams
        .as_ref()
        .is_some_and(|streams| {
            streams
                .iter()
                .any(|s| s.codec_type.as_deref() == Some("audio"))
        }))
}

/// 解析幀率字串（例如 "30/1" 或 "30000/1001"）
fn parse_frame_rate(rate: &str) -> Option<f64> {
    if let Some((num_str, den_str)) = rate.split_once('/') {
        let num: f64 = num_str.parse().ok()?;
        let den: f64 = den_str.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate.parse().ok()
}
