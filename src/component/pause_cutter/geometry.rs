use crate::config::{DetectionPoints, Margins};

// 校準常數表：針對目標遊戲 UI 在 1920x1080 基準下實測擬合的偏移係數。
// 這些數值是校準資料，不要重新推導或調整。
const P_M_Y_CO: f64 = 0.074;
const P_M_X_CO: f64 = 0.112;
const P_L_X_CO: f64 = 0.125;
const M_P_M_Y_2_CO: f64 = 0.5;
const M_P_M_X_2_CO: f64 = 0.5;
const M_P_L_Y_CO: f64 = 0.007;
const M_P_L_X_CO: f64 = 0.19;
const M_P_M_Y_CO: f64 = 0.043;
const M_P_R_Y_CO: f64 = 0.023;
const M_P_R_X_CO: f64 = 0.149;

const ACC_L_Y_CO: f64 = 0.095;
const ACC_L_X_CO: f64 = 0.262;
const ACC_R_X_CO: f64 = 0.247;

const VP_Y_CO: f64 = 0.5;
const VP_X_1_CO: f64 = 0.046;
const VP_X_2_CO: f64 = 0.093;
const VP_X_3_CO: f64 = 0.139;
const VP_X_4_CO: f64 = 0.185;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePoint {
    pub y: u32,
    pub x: u32,
}

impl SamplePoint {
    const fn new(y: u32, x: u32) -> Self {
        Self { y, x }
    }
}

/// 一次執行用到的全部取樣座標
///
/// 右上暫停點對、畫面中央的黑點與三個白點、加速圖示點對，
/// 以及共用同一列的四個有效暫停取樣 x
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePointSet {
    pub pause_mid: SamplePoint,
    pub pause_left: SamplePoint,
    pub center_black: SamplePoint,
    pub center_left: SamplePoint,
    pub center_mid: SamplePoint,
    pub center_right: SamplePoint,
    pub acc_left: SamplePoint,
    pub acc_right: SamplePoint,
    pub valid_pause_y: u32,
    pub valid_pause_x: [u32; 4],
}

fn round_coord(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

impl SamplePointSet {
    /// 由解析度與黑邊推算取樣座標；有手動偵測點時直接採用（不縮放）
    #[must_use]
    pub fn resolve(
        width: u32,
        height: u32,
        margins: &Margins,
        manual: Option<&DetectionPoints>,
    ) -> Self {
        if let Some(points) = manual {
            return Self::from_manual(points);
        }

        let lgt = f64::from(width);
        let hgt = f64::from(height);
        let top = f64::from(margins.top);
        let bottom = f64::from(margins.bottom);
        let left = f64::from(margins.left);
        let right = f64::from(margins.right);

        let act_hgt = hgt - top - bottom;
        let act_lgt = lgt - left - right;

        // 比 16:9 窄的畫面把高度換算回 1080 等效值，偏移係數才對得上
        let mdf_hgt = if act_lgt * 1080.0 < act_hgt * 1920.0 {
            (act_lgt / 1920.0 * 1080.0).round()
        } else {
            act_hgt
        };

        let pause_mid_y = round_coord(P_M_Y_CO * mdf_hgt + top);
        let pause_mid = SamplePoint::new(pause_mid_y, round_coord(lgt - P_M_X_CO * mdf_hgt - right));
        let pause_left =
            SamplePoint::new(pause_mid_y, round_coord(lgt - P_L_X_CO * mdf_hgt - right));

        // 中央各點以「先取整的黑點座標」為基準再偏移，與校準時的算法一致
        let center_black = SamplePoint::new(
            round_coord(M_P_M_Y_2_CO * act_hgt + top),
            round_coord(M_P_M_X_2_CO * act_lgt + left),
        );
        let center_left = SamplePoint::new(
            round_coord(f64::from(center_black.y) + M_P_L_Y_CO * mdf_hgt),
            round_coord(f64::from(center_black.x) - M_P_L_X_CO * mdf_hgt),
        );
        let center_mid = SamplePoint::new(
            round_coord(f64::from(center_black.y) + M_P_M_Y_CO * mdf_hgt),
            center_black.x,
        );
        let center_right = SamplePoint::new(
            round_coord(f64::from(center_black.y) - M_P_R_Y_CO * mdf_hgt),
            round_coord(f64::from(center_black.x) + M_P_R_X_CO * mdf_hgt),
        );

        let acc_y = round_coord(ACC_L_Y_CO * mdf_hgt + top);
        let acc_left = SamplePoint::new(acc_y, round_coord(lgt - ACC_L_X_CO * mdf_hgt - right));
        let acc_right = SamplePoint::new(acc_y, round_coord(lgt - ACC_R_X_CO * mdf_hgt - right));

        let valid_pause_y = round_coord(VP_Y_CO * act_hgt + top);
        let valid_pause_x = [
            round_coord(VP_X_1_CO * mdf_hgt + left),
            round_coord(VP_X_2_CO * mdf_hgt + left),
            round_coord(VP_X_3_CO * mdf_hgt + left),
            round_coord(VP_X_4_CO * mdf_hgt + left),
        ];

        Self {
            pause_mid,
            pause_left,
            center_black,
            center_left,
            center_mid,
            center_right,
            acc_left,
            acc_right,
            valid_pause_y,
            valid_pause_x,
        }
    }

    fn from_manual(points: &DetectionPoints) -> Self {
        let [acc_r, acc_l, p_m, p_l] = points.group_1;
        let [m_p_l, m_p_m_2, m_p_m, m_p_r] = points.group_2;

        Self {
            pause_mid: SamplePoint::new(p_m[0], p_m[1]),
            pause_left: SamplePoint::new(p_l[0], p_l[1]),
            center_black: SamplePoint::new(m_p_m_2[0], m_p_m_2[1]),
            center_left: SamplePoint::new(m_p_l[0], m_p_l[1]),
            center_mid: SamplePoint::new(m_p_m[0], m_p_m[1]),
            center_right: SamplePoint::new(m_p_r[0], m_p_r[1]),
            acc_left: SamplePoint::new(acc_l[0], acc_l[1]),
            acc_right: SamplePoint::new(acc_r[0], acc_r[1]),
            valid_pause_y: points.valid_pause_y,
            valid_pause_x: points.valid_pause_x,
        }
    }

    /// 所有座標是否都落在畫面範圍內
    #[must_use]
    pub fn within_bounds(&self, width: u32, height: u32) -> bool {
        let points = [
            self.pause_mid,
            self.pause_left,
            self.center_black,
            self.center_left,
            self.center_mid,
            self.center_right,
            self.acc_left,
            self.acc_right,
        ];
        points.iter().all(|p| p.y < height && p.x < width)
            && self.valid_pause_y < height
            && self.valid_pause_x.iter().all(|&x| x < width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_1080p_no_margin() {
        let set = SamplePointSet::resolve(1920, 1080, &Margins::default(), None);

        assert_eq!(set.pause_mid, SamplePoint::new(80, 1799));
        assert_eq!(set.pause_left, SamplePoint::new(80, 1785));
        assert_eq!(set.center_black, SamplePoint::new(540, 960));
        assert_eq!(set.valid_pause_y, 540);
        assert_eq!(set.valid_pause_x, [50, 100, 150, 200]);
        assert!(set.within_bounds(1920, 1080));
    }

    #[test]
    fn test_resolve_always_within_bounds() {
        let cases = [
            (1920u32, 1080u32, Margins::default()),
            (1280, 720, Margins::default()),
            (3840, 2160, Margins::default()),
            (
                1920,
                1080,
                Margins {
                    top: 20,
                    bottom: 30,
                    left: 40,
                    right: 50,
                },
            ),
            // 4:3 畫面觸發 16:9 等效高度換算
            (1440, 1080, Margins::default()),
            (
                1600,
                1200,
                Margins {
                    top: 8,
                    bottom: 8,
                    left: 0,
                    right: 0,
                },
            ),
        ];

        for (w, h, margins) in cases {
            let set = SamplePointSet::resolve(w, h, &margins, None);
            assert!(set.within_bounds(w, h), "{w}x{h} {margins:?}");
        }
    }

    #[test]
    fn test_narrow_aspect_uses_equivalent_height() {
        // 1440x1080 (4:3)：mdf = round(1440/1920*1080) = 810
        let set = SamplePointSet::resolve(1440, 1080, &Margins::default(), None);
        // p_m_y = round(0.074 * 810) = 60
        assert_eq!(set.pause_mid.y, 60);
        // vp_y 用的是實際高度而非等效高度
        assert_eq!(set.valid_pause_y, 540);
    }

    #[test]
    fn test_manual_points_pass_through_unscaled() {
        let points = DetectionPoints {
            group_1: [[10, 1700], [10, 1680], [80, 1799], [80, 1785]],
            group_2: [[545, 755], [540, 960], [586, 960], [515, 1120]],
            valid_pause_y: 540,
            valid_pause_x: [50, 100, 150, 200],
        };
        let set = SamplePointSet::resolve(1920, 1080, &Margins::default(), Some(&points));

        assert_eq!(set.acc_right, SamplePoint::new(10, 1700));
        assert_eq!(set.acc_left, SamplePoint::new(10, 1680));
        assert_eq!(set.pause_mid, SamplePoint::new(80, 1799));
        assert_eq!(set.pause_left, SamplePoint::new(80, 1785));
        assert_eq!(set.center_left, SamplePoint::new(545, 755));
        assert_eq!(set.center_black, SamplePoint::new(540, 960));
        assert_eq!(set.center_mid, SamplePoint::new(586, 960));
        assert_eq!(set.center_right, SamplePoint::new(515, 1120));
        assert_eq!(set.valid_pause_y, 540);
        assert_eq!(set.valid_pause_x, [50, 100, 150, 200]);
    }
}
