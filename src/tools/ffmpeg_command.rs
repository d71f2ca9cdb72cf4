use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Command;

fn run_checked(mut cmd: Command, what: &str) -> Result<()> {
    let output = cmd
        .output()
        .with_context(|| format!("無法執行 ffmpeg（{what}）"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffmpeg {what} 失敗 ({}): {}", output.status, stderr.trim());
    }
    Ok(())
}

/// 像素精準的矩形裁切
pub fn crop_video(
    input: &Path,
    output: &Path,
    width: u32,
    height: u32,
    x: u32,
    y: u32,
) -> Result<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .arg(input)
        .args(["-b:v", "0", "-vf", &format!("crop={width}:{height}:{x}:{y}")])
        .arg(output);
    run_checked(cmd, "crop")
}

/// 依 manifest（每行 `file <name>`）串接影片，串流直接複製
pub fn concat_videos(manifest: &Path, output: &Path) -> Result<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args([
        "-hide_banner",
        "-loglevel",
        "error",
        "-y",
        "-f",
        "concat",
        "-safe",
        "0",
        "-i",
    ])
    .arg(manifest)
    .args(["-c", "copy"])
    .arg(output);
    run_checked(cmd, "concat")
}

/// 合併一支影片與一支音訊：影片串流複製，音訊重新編碼為 aac
pub fn mux_video_audio(video: &Path, audio: &Path, output: &Path) -> Result<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .arg(video)
        .arg("-i")
        .arg(audio)
        .args(["-c:v", "copy", "-c:a", "aac"])
        .arg(output);
    run_checked(cmd, "mux")
}
