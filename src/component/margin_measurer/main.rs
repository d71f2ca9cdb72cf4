use crate::config::validate::{AFTERCROP_NAME, check_crop_names, check_measure_second};
use crate::config::{MARGIN_MAX, Margins};
use anyhow::{Result, anyhow, bail};
use log::info;
use rust_i18n::t;
use std::path::{Path, PathBuf};

use crate::tools::{Frame, FrameSource, FfmpegFrameReader, crop_video, get_video_meta};

// 黑邊測量的顏色門檻（BGR）
// 暗紅直線貼著畫面右緣，藍色橫線貼著下緣，淺灰介面區塊貼著左緣
const DARK_RED_TH: [u8; 3] = [20, 20, 90];
const RED_RATIO_FOR_TOP_MARGIN: f64 = 0.3913;
const BLUE_TH: [u8; 3] = [130, 110, 50];
const BLUE_LOWER_PERC: f64 = 0.1;
const BLUE_UPPER_PERC: f64 = 0.25;
const LIGHT_GRAY_TH: [u8; 3] = [130, 130, 130];
const LIGHT_GRAY_LOWER_PERC: f64 = 0.1;
const LIGHT_GRAY_UPPER_PERC: f64 = 0.25;

fn is_dark_red(px: [u8; 3]) -> bool {
    px[0] <= DARK_RED_TH[0] && px[1] <= DARK_RED_TH[1] && px[2] >= DARK_RED_TH[2]
}

fn is_line_blue(px: [u8; 3]) -> bool {
    px[0] >= BLUE_TH[0] && px[1] >= BLUE_TH[1] && px[2] <= BLUE_TH[2]
}

fn is_light_gray(px: [u8; 3]) -> bool {
    px[0] >= LIGHT_GRAY_TH[0] && px[1] >= LIGHT_GRAY_TH[1] && px[2] >= LIGHT_GRAY_TH[2]
}

/// 從單一畫面量出四邊黑邊
///
/// 右、上邊靠畫面右上角的暗紅直線：最右邊含紅點的直行決定右邊，
/// 該行第一段連續紅點往上回推一個固定比例決定上邊。
/// 下邊掃描藍色橫線、左邊掃描淺灰直行，兩者都以佔比落在
/// (0.1, 0.25) 區間為命中。任一邊量不到就整次失敗。
pub fn measure_margins(frame: &Frame) -> Result<Margins> {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let half_w = width / 2;
    let half_h = height / 2;

    let mut top = MARGIN_MAX;
    let mut right = MARGIN_MAX;
    'red: for x in (half_w..width).rev() {
        for y in 0..half_h {
            if !is_dark_red(frame.px(y as u32, x as u32)) {
                continue;
            }
            right = (width - 1 - x) as u32;
            let first_y = y;
            let mut run = 1usize;
            while first_y + run < half_h
                && is_dark_red(frame.px((first_y + run) as u32, x as u32))
            {
                run += 1;
            }
            top = (first_y as f64 - run as f64 * RED_RATIO_FOR_TOP_MARGIN).max(0.0) as u32;
            break 'red;
        }
    }

    let mut bottom = MARGIN_MAX;
    for bot_check in 1..half_h {
        let row = (height - bot_check) as u32;
        let blue_cnt = (0..width)
            .filter(|&x| is_line_blue(frame.px(row, x as u32)))
            .count();
        let ratio = blue_cnt as f64 / width as f64;
        if ratio > BLUE_LOWER_PERC && ratio < BLUE_UPPER_PERC {
            bottom = (bot_check - 1) as u32;
            break;
        }
    }

    let mut left = MARGIN_MAX;
    for x in 0..half_w {
        let gray_cnt = (0..height)
            .filter(|&y| is_light_gray(frame.px(y as u32, x as u32)))
            .count();
        let ratio = gray_cnt as f64 / height as f64;
        if ratio > LIGHT_GRAY_LOWER_PERC && ratio < LIGHT_GRAY_UPPER_PERC {
            left = x as u32;
            break;
        }
    }

    if top >= MARGIN_MAX || bottom >= MARGIN_MAX || left >= MARGIN_MAX || right >= MARGIN_MAX {
        bail!("{}", t!("errors.calculation_failed"));
    }
    Ok(Margins {
        top,
        bottom,
        left,
        right,
    })
}

/// 在指定秒數抓一張畫面並測量黑邊
pub fn measure_at(input: &Path, measure_second: f64) -> Result<Margins> {
    let meta = get_video_meta(input)?;
    check_measure_second(measure_second, meta.fps, meta.frame_count)?;

    let mut reader = FfmpegFrameReader::open(input, meta.fps, meta.width, meta.height)?;
    reader.seek((meta.fps * measure_second) as usize)?;
    let frame = reader
        .read_next()?
        .ok_or_else(|| anyhow!("{}", t!("errors.calculation_failed")))?;

    let margins = measure_margins(&frame)?;
    info!(
        "{}",
        t!(
            "measure.margin_filled",
            top = margins.top,
            bottom = margins.bottom,
            left = margins.left,
            right = margins.right
        )
    );
    Ok(margins)
}

/// 扣掉黑邊後的裁切矩形 (w, h, x, y)；寬高為奇數時補 1，
/// 編碼器只吃偶數尺寸
#[must_use]
pub fn crop_rect(width: u32, height: u32, margins: &Margins) -> (u32, u32, u32, u32) {
    let mut w = width.saturating_sub(margins.left + margins.right);
    let mut h = height.saturating_sub(margins.top + margins.bottom);
    if w % 2 == 1 {
        w += 1;
    }
    if h % 2 == 1 {
        h += 1;
    }
    (w, h, margins.left, margins.top)
}

/// 依黑邊把輸入影片裁切成 aftercrop.mp4，回傳輸出路徑
pub fn crop(working_dir: &Path, input: &Path, margins: &Margins) -> Result<PathBuf> {
    let input_name = input
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    check_crop_names(working_dir, &input_name)?;

    let meta = get_video_meta(input)?;
    let (w, h, x, y) = crop_rect(meta.width, meta.height, margins);
    let output = working_dir.join(AFTERCROP_NAME);
    crop_video(input, &output, w, h, x, y)?;

    info!("{}", t!("measure.crop_complete"));
    Ok(output)
}
