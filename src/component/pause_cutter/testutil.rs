//! 時間軸與輸出測試共用的合成幀與假讀寫器

use crate::component::pause_cutter::geometry::SamplePointSet;
use crate::config::Margins;
use crate::tools::{Frame, FrameSink, FrameSource};
use anyhow::Result;

pub const TEST_W: u32 = 192;
pub const TEST_H: u32 = 108;

pub fn test_points() -> SamplePointSet {
    SamplePointSet::resolve(TEST_W, TEST_H, &Margins::default(), None)
}

/// 非暫停、非加速：跳一留一的 2 倍速路徑
pub fn plain_frame(points: &SamplePointSet) -> Frame {
    let mut frame = Frame::filled(TEST_W, TEST_H, [90, 90, 90]);
    // 右上點對亮度拉開，避免誤判暫停
    frame.set_px(points.pause_mid.y, points.pause_mid.x, [200, 200, 200]);
    // 速度圖示呈未加速狀態
    frame.set_px(points.acc_right.y, points.acc_right.x, [230, 230, 230]);
    frame
}

/// 非暫停、加速中：全數保留
pub fn accel_frame(points: &SamplePointSet) -> Frame {
    let mut frame = Frame::filled(TEST_W, TEST_H, [90, 90, 90]);
    frame.set_px(points.pause_mid.y, points.pause_mid.x, [200, 200, 200]);
    frame
}

/// 有效暫停：右上點對一致且有效暫停列落在灰帶
pub fn pause_valid_frame(_points: &SamplePointSet) -> Frame {
    Frame::filled(TEST_W, TEST_H, [90, 90, 90])
}

/// 無效暫停：右上點對一致但灰帶檢查不過
pub fn pause_invalid_frame(_points: &SamplePointSet) -> Frame {
    Frame::filled(TEST_W, TEST_H, [140, 140, 140])
}

/// 以幀編號為索引的記憶體內幀來源
pub struct FakeSource {
    frames: Vec<Frame>,
    cursor: usize,
}

impl FakeSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames, cursor: 0 }
    }
}

impl FrameSource for FakeSource {
    fn seek(&mut self, frame_index: usize) -> Result<()> {
        self.cursor = frame_index;
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<Frame>> {
        let Some(frame) = self.frames.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        Ok(Some(frame.clone()))
    }
}

/// 記錄寫入幀數的假輸出
#[derive(Default)]
pub struct MemorySink {
    pub written: usize,
    pub finished: bool,
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, _frame: &Frame) -> Result<()> {
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
