use crate::component::pause_cutter::classifier::{is_acceleration, is_pause, is_valid_pause};
use crate::component::pause_cutter::geometry::SamplePointSet;
use crate::tools::{Frame, FrameSource};
use anyhow::Result;
use indicatif::ProgressBar;
use log::{info, warn};
use rust_i18n::t;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 使用者選定的剪輯區間，以幀編號表示
///
/// 區間外的內容原封不動保留（懶人模式）或完全不掃描（一般模式）
#[derive(Debug, Clone, Copy)]
pub struct CutWindow {
    pub start_f: usize,
    pub end_f: usize,
}

impl CutWindow {
    #[must_use]
    pub fn from_seconds(start_second: u64, end_second: u64, fps_int: u64) -> Self {
        Self {
            start_f: (start_second * fps_int) as usize,
            end_f: (end_second * fps_int) as usize,
        }
    }

    #[must_use]
    pub const fn contains(&self, frame_index: usize) -> bool {
        frame_index >= self.start_f && frame_index <= self.end_f
    }
}

/// 全片長的三條布林時間軸
///
/// 多執行緒分析時以不重疊的索引區段切給各 worker，
/// 安全性來自分割而不是鎖
#[derive(Debug, Clone)]
pub struct Timeline {
    pub pause: Vec<bool>,
    pub valid_pause: Vec<bool>,
    pub keep: Vec<bool>,
}

/// 單一 worker 擁有的時間軸切片，索引為區段內的相對位置
pub struct TimelineChunk<'a> {
    pub range: Range<usize>,
    pub pause: &'a mut [bool],
    pub valid_pause: &'a mut [bool],
    pub keep: &'a mut [bool],
}

impl Timeline {
    #[must_use]
    pub fn new(frame_count: usize) -> Self {
        Self {
            pause: vec![false; frame_count],
            valid_pause: vec![false; frame_count],
            keep: vec![false; frame_count],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pause.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pause.is_empty()
    }

    /// 依連續遞增的區段切出互斥的可變切片
    ///
    /// 區段必須由 0 開始、彼此相接並以總幀數結尾
    pub fn partition(&mut self, ranges: &[Range<usize>]) -> Vec<TimelineChunk<'_>> {
        let mut chunks = Vec::with_capacity(ranges.len());
        let mut rest_pause = self.pause.as_mut_slice();
        let mut rest_valid = self.valid_pause.as_mut_slice();
        let mut rest_keep = self.keep.as_mut_slice();
        let mut offset = 0;

        for range in ranges {
            assert_eq!(range.start, offset, "分割區段必須連續");
            let len = range.end - range.start;
            let (pause, p_rest) = rest_pause.split_at_mut(len);
            let (valid_pause, v_rest) = rest_valid.split_at_mut(len);
            let (keep, k_rest) = rest_keep.split_at_mut(len);
            rest_pause = p_rest;
            rest_valid = v_rest;
            rest_keep = k_rest;
            offset = range.end;
            chunks.push(TimelineChunk {
                range: range.clone(),
                pause,
                valid_pause,
                keep,
            });
        }
        assert!(rest_pause.is_empty(), "分割區段必須涵蓋整條時間軸");

        chunks
    }
}

/// 懶人模式的分析：區間外無條件保留；區間內非暫停非加速的幀
/// 以跳一留一的方式折半（實現 2 倍速），加速幀全留，
/// 暫停幀記到 pause / valid_pause 時間軸
///
/// 讀不到的幀保持預設 false（不中斷整個工作），只記數回報
pub fn lazy_analyze<S: FrameSource>(
    worker: usize,
    window: CutWindow,
    source: &mut S,
    points: &SamplePointSet,
    chunk: &mut TimelineChunk<'_>,
    progress: &ProgressBar,
    shutdown: &Arc<AtomicBool>,
) -> Result<usize> {
    source.seek(chunk.range.start)?;
    let mut skip = true;
    let mut missed = 0usize;
    let mut frame: Option<Frame> = None;

    for i in chunk.range.clone() {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        if i <= window.end_f {
            frame = source.read_next()?;
        }
        let local = i - chunk.range.start;

        if !window.contains(i) {
            chunk.keep[local] = true;
        } else if let Some(frame) = frame.as_ref() {
            if is_pause(frame, points) {
                chunk.pause[local] = true;
                if is_valid_pause(frame, points) {
                    chunk.valid_pause[local] = true;
                }
            } else if is_acceleration(frame, points) {
                chunk.keep[local] = true;
            } else if skip {
                skip = false;
            } else {
                skip = true;
                chunk.keep[local] = true;
            }
        } else {
            missed += 1;
        }
        progress.inc(1);
    }

    if missed > 0 {
        warn!("{}", t!("cutter.missed_frames", worker = worker, count = missed));
    }
    Ok(missed)
}

/// 一般模式的分析：只掃描剪輯區間內的幀，區間外完全不讀
pub fn normal_analyze<S: FrameSource>(
    worker: usize,
    window: CutWindow,
    source: &mut S,
    points: &SamplePointSet,
    chunk: &mut TimelineChunk<'_>,
    progress: &ProgressBar,
    shutdown: &Arc<AtomicBool>,
) -> Result<usize> {
    let start = chunk.range.start.max(window.start_f);
    let end = chunk.range.end.min(window.end_f + 1);
    if start >= end {
        info!("{}", t!("cutter.worker_no_intersection", worker = worker));
        return Ok(0);
    }

    source.seek(start)?;
    let mut missed = 0usize;

    for i in start..end {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let local = i - chunk.range.start;
        match source.read_next()? {
            Some(frame) => {
                if is_pause(&frame, points) {
                    chunk.pause[local] = true;
                    if is_valid_pause(&frame, points) {
                        chunk.valid_pause[local] = true;
                    }
                }
            }
            None => missed += 1,
        }
        progress.inc(1);
    }

    if missed > 0 {
        warn!("{}", t!("cutter.missed_frames", worker = worker, count = missed));
    }
    Ok(missed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::pause_cutter::testutil::{
        FakeSource, accel_frame, plain_frame, pause_invalid_frame, pause_valid_frame, test_points,
    };

    fn hidden() -> ProgressBar {
        ProgressBar::hidden()
    }

    fn no_shutdown() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn test_partition_disjoint_slices() {
        let mut timeline = Timeline::new(10);
        let ranges = [0..3, 3..7, 7..10];
        let mut chunks = timeline.partition(&ranges);
        assert_eq!(chunks.len(), 3);
        chunks[1].keep[0] = true;
        chunks[2].pause[2] = true;
        drop(chunks);
        assert!(timeline.keep[3]);
        assert!(timeline.pause[9]);
    }

    #[test]
    #[should_panic(expected = "連續")]
    fn test_partition_rejects_gaps() {
        let mut timeline = Timeline::new(10);
        let _ = timeline.partition(&[0..3, 4..10]);
    }

    #[test]
    fn test_lazy_analyze_alternating_skip() {
        let points = test_points();
        // 六張非暫停、非加速的幀：跳一留一，第二、四、六張保留
        let frames = vec![plain_frame(&points); 6];
        let mut source = FakeSource::new(frames);
        let mut timeline = Timeline::new(6);
        let mut chunks = timeline.partition(&[0..6]);
        let window = CutWindow {
            start_f: 0,
            end_f: 5,
        };

        lazy_analyze(
            0,
            window,
            &mut source,
            &points,
            &mut chunks[0],
            &hidden(),
            &no_shutdown(),
        )
        .unwrap();
        drop(chunks);

        assert_eq!(
            timeline.keep,
            vec![false, true, false, true, false, true]
        );
        assert!(timeline.pause.iter().all(|&p| !p));
    }

    #[test]
    fn test_lazy_analyze_accel_and_pause() {
        let points = test_points();
        let frames = vec![
            accel_frame(&points),
            pause_invalid_frame(&points),
            pause_valid_frame(&points),
            accel_frame(&points),
        ];
        let mut source = FakeSource::new(frames);
        let mut timeline = Timeline::new(4);
        let mut chunks = timeline.partition(&[0..4]);
        let window = CutWindow {
            start_f: 0,
            end_f: 3,
        };

        lazy_analyze(
            0,
            window,
            &mut source,
            &points,
            &mut chunks[0],
            &hidden(),
            &no_shutdown(),
        )
        .unwrap();
        drop(chunks);

        assert_eq!(timeline.keep, vec![true, false, false, true]);
        assert_eq!(timeline.pause, vec![false, true, true, false]);
        assert_eq!(timeline.valid_pause, vec![false, false, true, false]);
    }

    #[test]
    fn test_lazy_analyze_outside_window_kept() {
        let points = test_points();
        let frames = vec![pause_valid_frame(&points); 8];
        let mut source = FakeSource::new(frames);
        let mut timeline = Timeline::new(8);
        let mut chunks = timeline.partition(&[0..8]);
        // 區間只涵蓋 2..=5，外面的幀無條件保留
        let window = CutWindow {
            start_f: 2,
            end_f: 5,
        };

        lazy_analyze(
            0,
            window,
            &mut source,
            &points,
            &mut chunks[0],
            &hidden(),
            &no_shutdown(),
        )
        .unwrap();
        drop(chunks);

        assert_eq!(
            timeline.keep,
            vec![true, true, false, false, false, false, true, true]
        );
        assert_eq!(
            timeline.pause,
            vec![false, false, true, true, true, true, false, false]
        );
    }

    #[test]
    fn test_lazy_analyze_counts_missing_frames() {
        let points = test_points();
        // 只有 3 張可解碼，區段卻有 5 幀
        let frames = vec![plain_frame(&points); 3];
        let mut source = FakeSource::new(frames);
        let mut timeline = Timeline::new(5);
        let mut chunks = timeline.partition(&[0..5]);
        let window = CutWindow {
            start_f: 0,
            end_f: 4,
        };

        let missed = lazy_analyze(
            0,
            window,
            &mut source,
            &points,
            &mut chunks[0],
            &hidden(),
            &no_shutdown(),
        )
        .unwrap();
        drop(chunks);

        assert_eq!(missed, 2);
        // 讀不到的幀保持預設 false
        assert!(!timeline.keep[3] && !timeline.keep[4]);
    }

    #[test]
    fn test_normal_analyze_window_only() {
        let points = test_points();
        let frames = vec![pause_valid_frame(&points); 10];
        let mut source = FakeSource::new(frames);
        let mut timeline = Timeline::new(10);
        let mut chunks = timeline.partition(&[0..10]);
        let window = CutWindow {
            start_f: 3,
            end_f: 6,
        };

        normal_analyze(
            0,
            window,
            &mut source,
            &points,
            &mut chunks[0],
            &hidden(),
            &no_shutdown(),
        )
        .unwrap();
        drop(chunks);

        // 區間外完全沒掃，連 keep 也不動
        for i in 0..10 {
            let expect = (3..=6).contains(&i);
            assert_eq!(timeline.pause[i], expect, "index {i}");
            assert_eq!(timeline.valid_pause[i], expect, "index {i}");
            assert!(!timeline.keep[i]);
        }
    }

    #[test]
    fn test_normal_analyze_no_intersection() {
        let points = test_points();
        let mut source = FakeSource::new(vec![pause_valid_frame(&points); 4]);
        let mut timeline = Timeline::new(20);
        let mut chunks = timeline.partition(&[0..10, 10..20]);
        let window = CutWindow {
            start_f: 12,
            end_f: 15,
        };

        let missed = normal_analyze(
            0,
            window,
            &mut source,
            &points,
            &mut chunks[0],
            &hidden(),
            &no_shutdown(),
        )
        .unwrap();
        assert_eq!(missed, 0);
        drop(chunks);
        assert!(timeline.pause.iter().all(|&p| !p));
    }
}
