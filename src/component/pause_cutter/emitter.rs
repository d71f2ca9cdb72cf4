//! 輸出階段：把分析完成的時間軸變成片段檔案

use crate::component::pause_cutter::classifier::{is_acceleration, is_pause};
use crate::component::pause_cutter::geometry::SamplePointSet;
use crate::component::pause_cutter::timeline::CutWindow;
use crate::tools::{AudioTrack, FrameSink, FrameSource, mux_video_audio};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 暫存片段的共用前綴，清理階段靠它辨認要刪的檔案
pub const TEMP_PREFIX: &str = "out_";

/// 片段的三種狀態，也決定輸出檔名的結尾
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseState {
    None,
    InvalidPause,
    ValidPause,
}

impl PauseState {
    #[must_use]
    pub const fn classify(pause: bool, valid_pause: bool) -> Self {
        match (pause, valid_pause) {
            (true, true) => Self::ValidPause,
            (true, false) => Self::InvalidPause,
            _ => Self::None,
        }
    }

    #[must_use]
    pub const fn file_suffix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::InvalidPause => "_invalid_pause",
            Self::ValidPause => "_valid_pause",
        }
    }

    pub const ALL: [Self; 3] = [Self::None, Self::InvalidPause, Self::ValidPause];
}

/// 狀態一致的連續幀區段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSpan {
    pub index: usize,
    pub range: Range<usize>,
    pub state: PauseState,
}

/// 把 [range) 內的幀依暫停狀態切成連續區段
///
/// 編號從 `first_index` 起算；跨 worker 時由邊界上
/// 累計的換段次數接續，檔名才不會相撞
#[must_use]
pub fn segment_spans(
    pause: &[bool],
    valid_pause: &[bool],
    range: Range<usize>,
    first_index: usize,
) -> Vec<SegmentSpan> {
    let mut spans: Vec<SegmentSpan> = Vec::new();
    for i in range.clone() {
        let state = PauseState::classify(pause[i], valid_pause[i]);
        match spans.last_mut() {
            Some(last) if last.state == state => last.range.end = i + 1,
            _ => {
                let index = spans.last().map_or(first_index, |last| last.index + 1);
                spans.push(SegmentSpan {
                    index,
                    range: i..i + 1,
                    state,
                });
            }
        }
    }
    spans
}

/// 片段總數決定編號的十進位位數；墊高後所有檔名
/// 等長，字典序即播放序
#[must_use]
pub fn name_prefix(total_segments: usize) -> usize {
    10usize.pow(total_segments.to_string().len() as u32)
}

#[must_use]
pub fn segment_file_name(prefix: usize, index: usize, state: PauseState, ext: &str) -> String {
    format!("{TEMP_PREFIX}{}{}.{ext}", prefix + index, state.file_suffix())
}

fn final_file_name(prefix: usize, index: usize, state: PauseState, ext: &str) -> String {
    format!("{}{}.{ext}", prefix + index, state.file_suffix())
}

/// 懶人保留模式輸出：worker 把自己範圍內標為保留或
/// 有效暫停的幀依序寫進單一片段
///
/// 回傳讀不到的幀數；keep / valid_pause 為此範圍的切片
pub fn lazy_video_generate<S: FrameSource, K: FrameSink>(
    source: &mut S,
    keep: &[bool],
    valid_pause: &[bool],
    range: Range<usize>,
    sink: &mut K,
    progress: &ProgressBar,
    shutdown: &Arc<AtomicBool>,
) -> Result<usize> {
    debug_assert_eq!(keep.len(), range.len());
    source.seek(range.start)?;
    let mut missed = 0usize;

    for i in range.clone() {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let local = i - range.start;
        let wanted = keep[local] || valid_pause[local];
        match source.read_next()? {
            Some(frame) => {
                if wanted {
                    sink.write_frame(&frame)?;
                }
            }
            None => {
                if wanted {
                    missed += 1;
                }
            }
        }
        progress.inc(1);
    }

    sink.finish()?;
    Ok(missed)
}

/// 懶人全剪模式輸出：單趟完成，不需要先分析
///
/// 邊讀邊分類：暫停幀直接丟棄，加速幀全留，其餘跳一留一，
/// 剪輯區間外的幀原封不動寫出
pub fn lazy_video_generate_cut<S: FrameSource, K: FrameSink>(
    source: &mut S,
    window: CutWindow,
    points: &SamplePointSet,
    range: Range<usize>,
    sink: &mut K,
    progress: &ProgressBar,
    shutdown: &Arc<AtomicBool>,
) -> Result<usize> {
    source.seek(range.start)?;
    let mut skip = true;
    let mut missed = 0usize;

    for i in range {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let Some(frame) = source.read_next()? else {
            missed += 1;
            progress.inc(1);
            continue;
        };
        if !window.contains(i) {
            sink.write_frame(&frame)?;
        } else if !is_pause(&frame, points) {
            if is_acceleration(&frame, points) {
                sink.write_frame(&frame)?;
            } else if skip {
                skip = false;
            } else {
                skip = true;
                sink.write_frame(&frame)?;
            }
        }
        progress.inc(1);
    }

    sink.finish()?;
    Ok(missed)
}

/// 一般模式輸出：worker 依 spans 逐段開新檔寫入
///
/// spans 必須連續且屬於同一個 worker 範圍，來源只 seek 一次
pub fn normal_video_generate<S, K, F>(
    source: &mut S,
    spans: &[SegmentSpan],
    mut open_sink: F,
    progress: &ProgressBar,
    shutdown: &Arc<AtomicBool>,
) -> Result<usize>
where
    S: FrameSource,
    K: FrameSink,
    F: FnMut(&SegmentSpan) -> Result<K>,
{
    let Some(first) = spans.first() else {
        return Ok(0);
    };
    source.seek(first.range.start)?;
    let mut missed = 0usize;

    for span in spans {
        let mut sink = open_sink(span)?;
        for _ in span.range.clone() {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }
            match source.read_next()? {
                Some(frame) => sink.write_frame(&frame)?,
                None => missed += 1,
            }
            progress.inc(1);
        }
        sink.finish()?;
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
    }

    Ok(missed)
}

/// 片段對應的音訊毫秒區間
///
/// 結尾多墊一個幀時距的毫秒數，接合處才不會因取整吃掉聲音
#[must_use]
pub fn audio_slice_bounds(range: &Range<usize>, fps: f64) -> (f64, f64) {
    let inc = 1000.0 / fps;
    let start_ms = range.start as f64 * inc;
    let end_ms = range.end as f64 * inc + fps;
    (start_ms, end_ms)
}

/// 依 spans 匯出每段的 mp3，檔名與片段視訊對應
pub fn normal_audio_generate(
    track: &AudioTrack,
    spans: &[SegmentSpan],
    fps: f64,
    prefix: usize,
    working_dir: &Path,
    progress: &ProgressBar,
    shutdown: &Arc<AtomicBool>,
) -> Result<()> {
    for span in spans {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let (start_ms, end_ms) = audio_slice_bounds(&span.range, fps);
        let output = working_dir.join(segment_file_name(prefix, span.index, span.state, "mp3"));
        track.export_slice(start_ms, end_ms, &output)?;
        progress.inc(1);
    }
    Ok(())
}

fn existing_variant(working_dir: &Path, prefix: usize, index: usize) -> Option<PauseState> {
    PauseState::ALL.into_iter().find(|&state| {
        working_dir
            .join(segment_file_name(prefix, index, state, "mp4"))
            .exists()
    })
}

/// 合成最終片段：有音軌就把視訊與對應 mp3 合流，
/// 否則只把暫存檔改成正式檔名
///
/// `audio_only_invalid` 時無效暫停段只留 mp3（改名），
/// 其視訊暫存檔留給清理階段刪除
pub fn combine(
    working_dir: &Path,
    total_segments: usize,
    has_audio: bool,
    audio_only_invalid: bool,
) -> Result<()> {
    let prefix = name_prefix(total_segments);

    (0..total_segments).into_par_iter().try_for_each(|index| {
        let Some(state) = existing_variant(working_dir, prefix, index) else {
            return Ok(());
        };
        let video = working_dir.join(segment_file_name(prefix, index, state, "mp4"));
        let audio = working_dir.join(segment_file_name(prefix, index, state, "mp3"));

        if audio_only_invalid && state == PauseState::InvalidPause {
            if audio.exists() {
                let target: PathBuf =
                    working_dir.join(final_file_name(prefix, index, state, "mp3"));
                std::fs::rename(&audio, &target)
                    .with_context(|| format!("改名失敗: {}", audio.display()))?;
            }
            return Ok(());
        }

        let target: PathBuf = working_dir.join(final_file_name(prefix, index, state, "mp4"));
        if has_audio && audio.exists() {
            mux_video_audio(&video, &audio, &target)?;
        } else {
            std::fs::rename(&video, &target)
                .with_context(|| format!("改名失敗: {}", video.display()))?;
        }
        Ok(())
    })
}
