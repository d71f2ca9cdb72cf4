use crate::tools::ffprobe_info::has_audio_stream;
use anyhow::{Context, Result, bail};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 來源檔的音軌；一次探測，之後以毫秒區間切片匯出
pub struct AudioTrack {
    path: PathBuf,
    has_audio: bool,
}

impl AudioTrack {
    /// 探測音軌。沒有音軌不是錯誤，後續音訊流程整段跳過
    pub fn probe(path: &Path) -> Result<Self> {
        let has_audio = has_audio_stream(path)?;
        if !has_audio {
            debug!("來源沒有音軌: {}", path.display());
        }
        Ok(Self {
            path: path.to_path_buf(),
            has_audio,
        })
    }

    #[must_use]
    pub const fn has_audio(&self) -> bool {
        self.has_audio
    }

    /// 匯出 [start_ms, end_ms) 的音訊為 mp3
    pub fn export_slice(&self, start_ms: f64, end_ms: f64, output: &Path) -> Result<()> {
        if !self.has_audio {
            bail!("來源沒有音軌，無法切片: {}", self.path.display());
        }

        let output_cmd = Command::new("ffmpeg")
            .args([
                "-hide_banner",
                "-loglevel",
                "error",
                "-y",
                "-ss",
                &format!("{:.6}", start_ms / 1000.0),
                "-to",
                &format!("{:.6}", end_ms / 1000.0),
                "-i",
            ])
            .arg(&self.path)
            .args(["-vn", "-c:a", "libmp3lame", "-q:a", "4"])
            .arg(output)
            .output()
            .with_context(|| format!("無法執行 ffmpeg 音訊切片: {}", self.path.display()))?;

        if !output_cmd.status.success() {
            let stderr = String::from_utf8_lossy(&output_cmd.stderr);
            bail!("音訊切片失敗: {}", stderr.trim());
        }
        Ok(())
    }
}
