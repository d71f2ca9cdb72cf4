use crate::tools::frame_source::Frame;
use anyhow::{Context, Result, bail};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// 逐幀寫出介面
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// 關閉輸出串流並確認編碼器正常結束
    fn finish(&mut self) -> Result<()>;
}

/// 透過 ffmpeg 把 rawvideo 幀編碼成 mp4v 容器的 writer
pub struct FfmpegFrameWriter {
    path: PathBuf,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl FfmpegFrameWriter {
    pub fn create(path: &Path, fps: f64, width: u32, height: u32) -> Result<Self> {
        let mut child = Command::new("ffmpeg")
            .args([
                "-hide_banner",
                "-loglevel",
                "error",
                "-y",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "bgr24",
                "-s",
                &format!("{width}x{height}"),
                "-r",
                &format!("{fps}"),
                "-i",
                "-",
                "-c:v",
                "mpeg4",
                "-tag:v",
                "mp4v",
                "-q:v",
                "5",
                "-an",
            ])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("無法執行 ffmpeg 編碼: {}", path.display()))?;

        let stdin = child.stdin.take();
        Ok(Self {
            path: path.to_path_buf(),
            child: Some(child),
            stdin,
        })
    }
}

impl FrameSink for FfmpegFrameWriter {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("輸出串流已關閉: {}", self.path.display()))?;
        stdin
            .write_all(frame.data())
            .with_context(|| format!("寫入編碼器失敗: {}", self.path.display()))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.stdin = None;
        if let Some(mut child) = self.child.take() {
            let status = child
                .wait()
                .with_context(|| format!("等待 ffmpeg 編碼結束失敗: {}", self.path.display()))?;
            if !status.success() {
                bail!("ffmpeg 編碼失敗 ({status}): {}", self.path.display());
            }
        }
        Ok(())
    }
}

impl Drop for FfmpegFrameWriter {
    fn drop(&mut self) {
        self.stdin = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.wait();
        }
    }
}
