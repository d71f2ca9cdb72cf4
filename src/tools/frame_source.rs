use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

/// 一張解碼後的 BGR24 畫面
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    #[must_use]
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width as usize) * (height as usize) * 3);
        Self {
            width,
            height,
            data,
        }
    }

    /// 單色畫面，測試與校準用
    #[must_use]
    pub fn filled(width: u32, height: u32, bgr: [u8; 3]) -> Self {
        let mut data = vec![0u8; (width as usize) * (height as usize) * 3];
        for px in data.chunks_exact_mut(3) {
            px.copy_from_slice(&bgr);
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// 取 (y, x) 的 BGR 值，超出邊界時夾到最近的像素
    #[must_use]
    pub fn px(&self, y: u32, x: u32) -> [u8; 3] {
        let y = y.min(self.height.saturating_sub(1)) as usize;
        let x = x.min(self.width.saturating_sub(1)) as usize;
        let offset = (y * self.width as usize + x) * 3;
        [self.data[offset], self.data[offset + 1], self.data[offset + 2]]
    }

    pub fn set_px(&mut self, y: u32, x: u32, bgr: [u8; 3]) {
        let y = y.min(self.height.saturating_sub(1)) as usize;
        let x = x.min(self.width.saturating_sub(1)) as usize;
        let offset = (y * self.width as usize + x) * 3;
        self.data[offset..offset + 3].copy_from_slice(&bgr);
    }
}

/// 逐幀讀取介面；同一個檔案可以開多個互不干擾的 reader
pub trait FrameSource {
    /// 跳到指定幀，之後的 `read_next` 由此幀開始遞增
    fn seek(&mut self, frame_index: usize) -> Result<()>;

    /// 讀下一幀，串流結束回傳 `Ok(None)`
    fn read_next(&mut self) -> Result<Option<Frame>>;
}

/// 透過 ffmpeg rawvideo 管線解碼的 reader
///
/// seek 是以重開子程序實現的，因此只有循序遞增讀取才有效率，
/// 剪輯流程本來就只會往前讀
pub struct FfmpegFrameReader {
    path: PathBuf,
    fps: f64,
    width: u32,
    height: u32,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
}

impl FfmpegFrameReader {
    pub fn open(path: &Path, fps: f64, width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            fps,
            width,
            height,
            child: None,
            stdout: None,
        })
    }

    fn stop(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn spawn_at(&mut self, frame_index: usize) -> Result<()> {
        self.stop();

        let seek_seconds = frame_index as f64 / self.fps;
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-loglevel", "error"]);
        if frame_index > 0 {
            cmd.args(["-accurate_seek", "-ss", &format!("{seek_seconds:.6}")]);
        }
        cmd.arg("-i")
            .arg(&self.path)
            .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "bgr24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("無法執行 ffmpeg 解碼: {}", self.path.display()))?;
        self.stdout = child.stdout.take();
        self.child = Some(child);
        Ok(())
    }
}

impl FrameSource for FfmpegFrameReader {
    fn seek(&mut self, frame_index: usize) -> Result<()> {
        self.spawn_at(frame_index)
    }

    fn read_next(&mut self) -> Result<Option<Frame>> {
        if self.child.is_none() {
            self.spawn_at(0)?;
        }
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let frame_bytes = (self.width as usize) * (self.height as usize) * 3;
        let mut data = vec![0u8; frame_bytes];
        let mut filled = 0;
        while filled < frame_bytes {
            let n = stdout
                .read(&mut data[filled..])
                .with_context(|| format!("讀取解碼輸出失敗: {}", self.path.display()))?;
            if n == 0 {
                // 串流結束；不完整的殘幀一併丟棄
                self.stop();
                return Ok(None);
            }
            filled += n;
        }

        Ok(Some(Frame::new(self.width, self.height, data)))
    }
}

impl Drop for FfmpegFrameReader {
    fn drop(&mut self) {
        self.stop();
    }
}
