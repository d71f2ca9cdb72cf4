//! 剪輯流程的指揮中心：探測、分析、後處理、輸出、收尾

use crate::component::pause_cutter::emitter::{
    SegmentSpan, combine, lazy_video_generate, lazy_video_generate_cut, name_prefix,
    normal_audio_generate, normal_video_generate, segment_file_name, segment_spans,
};
use crate::component::pause_cutter::finalizer::{cleanup, lazy_concat, lazy_segment_name};
use crate::component::pause_cutter::geometry::SamplePointSet;
use crate::component::pause_cutter::partition::{SegmentBoundary, segment_bounds, split_even};
use crate::component::pause_cutter::postprocess::{expand_valid_pause_range, suppress_short_runs};
use crate::component::pause_cutter::timeline::{
    CutWindow, Timeline, lazy_analyze, normal_analyze,
};
use crate::config::validate::check_file_and_return_path;
use crate::config::{CutMode, RunConfig};
use crate::tools::{
    AudioTrack, FfmpegFrameReader, FfmpegFrameWriter, TimeCost, get_video_meta,
};
use anyhow::{Result, anyhow, bail};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rust_i18n::t;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

pub struct PauseCutter {
    config: RunConfig,
    working_dir: PathBuf,
    shutdown: Arc<AtomicBool>,
}

/// 把 worker 邊界夾進剪輯區間，回傳各 worker 的幀範圍
/// 與起始片段編號；空範圍的 worker 直接剔除
fn worker_span_ranges(
    bounds: &[SegmentBoundary],
    win_start: usize,
    win_end: usize,
) -> Vec<(Range<usize>, usize)> {
    let mut ranges = Vec::with_capacity(bounds.len());
    for (i, bound) in bounds.iter().enumerate() {
        let start = bound.frame.clamp(win_start, win_end);
        let end = bounds
            .get(i + 1)
            .map_or(win_end, |next| next.frame.clamp(win_start, win_end));
        if start < end {
            ranges.push((start..end, bound.segment_offset));
        }
    }
    ranges
}

fn phase_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(ProgressStyle::default_bar().progress_chars("=>-"));
    bar
}

impl PauseCutter {
    #[must_use]
    pub fn new(config: RunConfig, working_dir: PathBuf, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            config,
            working_dir,
            shutdown,
        }
    }

    /// 工作資料夾內唯一的影片檔就是輸入
    pub fn run(&self) -> Result<()> {
        self.config.validate()?;
        let input = check_file_and_return_path(&self.working_dir)?;
        self.run_on(&input)
    }

    /// 對指定的輸入檔執行完整剪輯流程（裁切後接剪的入口）
    pub fn run_on(&self, input: &Path) -> Result<()> {
        self.config.validate()?;
        info!(
            "{}",
            t!("cutter.started", mode = t!(self.config.mode.display_key()))
        );

        let meta = get_video_meta(input)?;
        if meta.has_fractional_fps() {
            warn!("{}", t!("cutter.fps_warning"));
        }
        let fps_int = meta.fps_int();
        if fps_int == 0 || meta.frame_count == 0 {
            bail!("{}", t!("errors.calculation_failed"));
        }
        if self.config.end_second * fps_int > meta.frame_count {
            bail!("{}", t!("errors.end_exceeds_video"));
        }

        let points = SamplePointSet::resolve(
            meta.width,
            meta.height,
            &self.config.margins,
            self.config.manual_points.as_ref(),
        );
        if !points.within_bounds(meta.width, meta.height) {
            bail!("{}", t!("errors.calculation_failed"));
        }

        let frame_count = meta.frame_count as usize;
        let mut window =
            CutWindow::from_seconds(self.config.start_second, self.config.end_second, fps_int);
        window.end_f = window.end_f.min(frame_count - 1);
        let reader = ReaderArgs {
            fps: meta.fps,
            width: meta.width,
            height: meta.height,
        };

        let ranges = split_even(frame_count, self.config.thread_num);

        // 全剪模式單趟完成，邊讀邊分類，不需要先建時間軸
        if self.config.mode == CutMode::LazyCutAll {
            self.emit_lazy_cut(input, &reader, window, &points, frame_count, &ranges)?;
            return self.finalize_lazy(input);
        }

        let mut timeline = Timeline::new(frame_count);
        self.analyze(input, &reader, window, &points, &mut timeline, &ranges)?;

        if self.shutdown.load(Ordering::SeqCst) {
            info!("{}", t!("cutter.interrupted"));
            return Ok(());
        }

        expand_valid_pause_range(&timeline.pause, &mut timeline.valid_pause);
        if self.config.mode == CutMode::LazyKeepValid && self.config.ignore_frame_cnt > 0 {
            suppress_short_runs(
                &mut timeline.keep,
                &mut timeline.valid_pause,
                self.config.ignore_frame_cnt,
            );
        }

        if self.config.mode.is_lazy() {
            self.emit_lazy(input, &reader, &timeline, &ranges)?;
            self.finalize_lazy(input)?;
        } else {
            self.emit_normal(input, &reader, window, &timeline)?;
        }
        Ok(())
    }

    fn analyze(
        &self,
        input: &Path,
        reader: &ReaderArgs,
        window: CutWindow,
        points: &SamplePointSet,
        timeline: &mut Timeline,
        ranges: &[Range<usize>],
    ) -> Result<()> {
        let cost = TimeCost::start(t!("cutter.phase_analyze"));
        let bar = phase_bar(timeline.len() as u64);
        let lazy = self.config.mode.is_lazy();
        let chunks = timeline.partition(ranges);

        let missed = thread::scope(|s| -> Result<usize> {
            let mut handles = Vec::with_capacity(chunks.len());
            for (worker, mut chunk) in chunks.into_iter().enumerate() {
                let bar = bar.clone();
                let shutdown = &self.shutdown;
                handles.push(s.spawn(move || -> Result<usize> {
                    let mut source = reader.open(input)?;
                    if lazy {
                        lazy_analyze(worker, window, &mut source, points, &mut chunk, &bar, shutdown)
                    } else {
                        normal_analyze(worker, window, &mut source, points, &mut chunk, &bar, shutdown)
                    }
                }));
            }
            let mut missed = 0usize;
            for handle in handles {
                missed += handle.join().map_err(|_| anyhow!("分析執行緒異常結束"))??;
            }
            Ok(missed)
        })?;

        bar.finish_and_clear();
        debug!("分析階段缺幀總數: {missed}");
        cost.end();
        Ok(())
    }

    fn emit_lazy(
        &self,
        input: &Path,
        reader: &ReaderArgs,
        timeline: &Timeline,
        ranges: &[Range<usize>],
    ) -> Result<()> {
        let cost = TimeCost::start(t!("cutter.phase_generate"));
        let bar = phase_bar(timeline.len() as u64);

        thread::scope(|s| -> Result<()> {
            let mut handles = Vec::with_capacity(ranges.len());
            for (worker, range) in ranges.iter().cloned().enumerate() {
                let keep = &timeline.keep[range.clone()];
                let valid = &timeline.valid_pause[range.clone()];
                let bar = bar.clone();
                let shutdown = &self.shutdown;
                let path = self.working_dir.join(lazy_segment_name(worker));
                handles.push(s.spawn(move || -> Result<usize> {
                    let mut source = reader.open(input)?;
                    let mut sink =
                        FfmpegFrameWriter::create(&path, reader.fps, reader.width, reader.height)?;
                    lazy_video_generate(&mut source, keep, valid, range, &mut sink, &bar, shutdown)
                }));
            }
            for (worker, handle) in handles.into_iter().enumerate() {
                let missed = handle.join().map_err(|_| anyhow!("輸出執行緒異常結束"))??;
                if missed > 0 {
                    warn!("{}", t!("cutter.missed_frames", worker = worker, count = missed));
                }
            }
            Ok(())
        })?;
        bar.finish_and_clear();
        cost.end();
        Ok(())
    }

    /// 全剪模式的輸出：每個 worker 獨立讀自己的範圍並當場分類
    fn emit_lazy_cut(
        &self,
        input: &Path,
        reader: &ReaderArgs,
        window: CutWindow,
        points: &SamplePointSet,
        frame_count: usize,
        ranges: &[Range<usize>],
    ) -> Result<()> {
        let cost = TimeCost::start(t!("cutter.phase_generate"));
        let bar = phase_bar(frame_count as u64);

        thread::scope(|s| -> Result<()> {
            let mut handles = Vec::with_capacity(ranges.len());
            for (worker, range) in ranges.iter().cloned().enumerate() {
                let bar = bar.clone();
                let shutdown = &self.shutdown;
                let path = self.working_dir.join(lazy_segment_name(worker));
                handles.push(s.spawn(move || -> Result<usize> {
                    let mut source = reader.open(input)?;
                    let mut sink =
                        FfmpegFrameWriter::create(&path, reader.fps, reader.width, reader.height)?;
                    lazy_video_generate_cut(
                        &mut source,
                        window,
                        points,
                        range,
                        &mut sink,
                        &bar,
                        shutdown,
                    )
                }));
            }
            for (worker, handle) in handles.into_iter().enumerate() {
                let missed = handle.join().map_err(|_| anyhow!("輸出執行緒異常結束"))??;
                if missed > 0 {
                    warn!("{}", t!("cutter.missed_frames", worker = worker, count = missed));
                }
            }
            Ok(())
        })?;
        bar.finish_and_clear();
        cost.end();
        Ok(())
    }

    /// 懶人模式共同的收尾：串接片段、清掉暫存
    fn finalize_lazy(&self, input: &Path) -> Result<()> {
        if self.shutdown.load(Ordering::SeqCst) {
            info!("{}", t!("cutter.interrupted"));
            return Ok(());
        }

        let cost = TimeCost::start(t!("cutter.phase_concat"));
        let output = lazy_concat(&self.working_dir, self.config.thread_num)?;
        cost.end();

        let cost = TimeCost::start(t!("cutter.phase_cleanup"));
        cleanup(&self.working_dir, 0, &[input.to_path_buf(), output])?;
        cost.end();

        info!("{}", t!("cutter.lazy_complete"));
        Ok(())
    }

    fn emit_normal(
        &self,
        input: &Path,
        reader: &ReaderArgs,
        window: CutWindow,
        timeline: &Timeline,
    ) -> Result<()> {
        let win_start = window.start_f;
        let win_end = (window.end_f + 1).min(timeline.len());
        let bounds = segment_bounds(
            &timeline.pause,
            timeline.len() / self.config.thread_num,
            self.config.thread_num,
        );
        let worker_ranges = worker_span_ranges(&bounds, win_start, win_end);

        let worker_spans: Vec<Vec<SegmentSpan>> = worker_ranges
            .iter()
            .map(|(range, first_index)| {
                segment_spans(&timeline.pause, &timeline.valid_pause, range.clone(), *first_index)
            })
            .collect();
        let total_segments = worker_spans
            .iter()
            .flatten()
            .map(|span| span.index)
            .max()
            .map_or(0, |max| max + 1);
        let prefix = name_prefix(total_segments);

        let cost = TimeCost::start(t!("cutter.phase_generate"));
        let bar = phase_bar((win_end - win_start) as u64);
        thread::scope(|s| -> Result<()> {
            let mut handles = Vec::with_capacity(worker_spans.len());
            for spans in &worker_spans {
                let bar = bar.clone();
                let shutdown = &self.shutdown;
                let working_dir = &self.working_dir;
                handles.push(s.spawn(move || -> Result<usize> {
                    let mut source = reader.open(input)?;
                    normal_video_generate(
                        &mut source,
                        spans,
                        |span| {
                            let path = working_dir.join(segment_file_name(
                                prefix, span.index, span.state, "mp4",
                            ));
                            FfmpegFrameWriter::create(
                                &path,
                                reader.fps,
                                reader.width,
                                reader.height,
                            )
                        },
                        &bar,
                        shutdown,
                    )
                }));
            }
            for (worker, handle) in handles.into_iter().enumerate() {
                let missed = handle.join().map_err(|_| anyhow!("輸出執行緒異常結束"))??;
                if missed > 0 {
                    warn!("{}", t!("cutter.missed_frames", worker = worker, count = missed));
                }
            }
            Ok(())
        })?;
        bar.finish_and_clear();
        cost.end();

        let track = AudioTrack::probe(input)?;
        if track.has_audio() {
            let cost = TimeCost::start(t!("cutter.phase_audio"));
            let flat: Vec<SegmentSpan> = worker_spans.iter().flatten().cloned().collect();
            let bar = phase_bar(flat.len() as u64);
            normal_audio_generate(
                &track,
                &flat,
                reader.fps,
                prefix,
                &self.working_dir,
                &bar,
                &self.shutdown,
            )?;
            bar.finish_and_clear();
            cost.end();
        } else {
            info!("{}", t!("cutter.no_audio"));
        }

        let cost = TimeCost::start(t!("cutter.phase_merge"));
        combine(
            &self.working_dir,
            total_segments,
            track.has_audio(),
            self.config.mode == CutMode::NormalAudioOnly,
        )?;
        cost.end();

        let cost = TimeCost::start(t!("cutter.phase_cleanup"));
        cleanup(
            &self.working_dir,
            self.config.ignore_frame_cnt as u64,
            &[input.to_path_buf()],
        )?;
        cost.end();

        info!("{}", t!("cutter.normal_complete", count = total_segments));
        Ok(())
    }
}

/// 開 reader 需要的中繼資料，執行緒之間以值共享
#[derive(Clone, Copy)]
struct ReaderArgs {
    fps: f64,
    width: u32,
    height: u32,
}

impl ReaderArgs {
    fn open(&self, input: &Path) -> Result<FfmpegFrameReader> {
        FfmpegFrameReader::open(input, self.fps, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_ranges_clamped_to_window() {
        let bounds = [
            SegmentBoundary {
                frame: 0,
                segment_offset: 0,
            },
            SegmentBoundary {
                frame: 40,
                segment_offset: 3,
            },
            SegmentBoundary {
                frame: 90,
                segment_offset: 5,
            },
        ];
        let ranges = worker_span_ranges(&bounds, 10, 80);
        assert_eq!(ranges, vec![(10..40, 0), (40..80, 3)]);
    }

    #[test]
    fn test_worker_ranges_drop_empty() {
        let bounds = [
            SegmentBoundary {
                frame: 0,
                segment_offset: 0,
            },
            SegmentBoundary {
                frame: 5,
                segment_offset: 1,
            },
        ];
        // 區間從 5 開始，第一個 worker 的範圍收斂成空
        let ranges = worker_span_ranges(&bounds, 5, 20);
        assert_eq!(ranges, vec![(5..20, 1)]);
    }
}
