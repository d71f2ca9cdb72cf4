use crate::component::pause_cutter::geometry::SamplePointSet;
use crate::tools::Frame;

// 顏色門檻，與座標係數同屬校準資料
const WHITE_10: u8 = 240;
const WHITE_9: u8 = 200;
const GRAY: u8 = 128;
const P_DIFF_TH: f64 = 10.0;
const M_P_DIFF_TH: i16 = 30;
const GRAY_LOWER: u8 = 55;
const GRAY_UPPER: u8 = 130;

fn channel_mean(px: [u8; 3]) -> f64 {
    f64::from(u16::from(px[0]) + u16::from(px[1]) + u16::from(px[2])) / 3.0
}

fn all_above(px: [u8; 3], threshold: u8) -> bool {
    px.iter().all(|&c| c > threshold)
}

fn all_below(px: [u8; 3], threshold: u8) -> bool {
    px.iter().all(|&c| c < threshold)
}

fn any_below(px: [u8; 3], threshold: u8) -> bool {
    px.iter().any(|&c| c < threshold)
}

fn diff_below(a: [u8; 3], b: [u8; 3], threshold: i16) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(&x, &y)| (i16::from(x) - i16::from(y)).abs() < threshold)
}

fn in_gray_band(px: [u8; 3]) -> bool {
    px.iter().all(|&c| (GRAY_LOWER..=GRAY_UPPER).contains(&c))
}

/// 此幀是否為暫停畫面
///
/// 暫停指示在不同遊戲狀態下有三種呈現方式，三個特徵任一命中即視為暫停：
/// (a) 右上兩點的亮度平均幾乎相同；
/// (b) 中央三個白點全部高於純白門檻；
/// (c) 中央白點彼此顏色接近且偏亮、同時黑點偏暗。
#[must_use]
pub fn is_pause(frame: &Frame, points: &SamplePointSet) -> bool {
    let pause_left = frame.px(points.pause_left.y, points.pause_left.x);
    let pause_mid = frame.px(points.pause_mid.y, points.pause_mid.x);
    if (channel_mean(pause_left) - channel_mean(pause_mid)).abs() < P_DIFF_TH {
        return true;
    }

    let left = frame.px(points.center_left.y, points.center_left.x);
    let mid = frame.px(points.center_mid.y, points.center_mid.x);
    let right = frame.px(points.center_right.y, points.center_right.x);
    if all_above(left, WHITE_10) && all_above(mid, WHITE_10) && all_above(right, WHITE_10) {
        return true;
    }

    let black = frame.px(points.center_black.y, points.center_black.x);
    if all_above(mid, GRAY)
        && diff_below(mid, left, M_P_DIFF_TH)
        && diff_below(mid, right, M_P_DIFF_TH)
        && diff_below(left, right, M_P_DIFF_TH)
        && all_below(black, GRAY)
    {
        return true;
    }

    false
}

/// 此幀是否處於 2 倍速播放
///
/// 預設視為加速，只有在速度圖示呈現「未加速」的樣子
/// （右點純白、左點未達白）時才回傳 false
#[must_use]
pub fn is_acceleration(frame: &Frame, points: &SamplePointSet) -> bool {
    let acc_right = frame.px(points.acc_right.y, points.acc_right.x);
    let acc_left = frame.px(points.acc_left.y, points.acc_left.x);
    !(all_above(acc_right, WHITE_9) && any_below(acc_left, WHITE_9))
}

/// 此幀是否為有效暫停（控制面板可見）
///
/// 取樣列允許 ±1 列的渲染抖動，四個 x 全部落在灰帶內才算命中
#[must_use]
pub fn is_valid_pause(frame: &Frame, points: &SamplePointSet) -> bool {
    for dy in [0i64, -1, 1] {
        let row = i64::from(points.valid_pause_y) + dy;
        let Ok(row) = u32::try_from(row) else {
            continue;
        };
        if points
            .valid_pause_x
            .iter()
            .all(|&x| in_gray_band(frame.px(row, x)))
        {
            return true;
        }
    }
    false
}
