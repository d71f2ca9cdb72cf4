use std::ops::Range;

/// 分析階段的平均切分：每段 `frame_count / workers`（向下取整），
/// 餘數併入最後一段
#[must_use]
pub fn split_even(frame_count: usize, workers: usize) -> Vec<Range<usize>> {
    assert!(workers > 0);
    let per_worker = frame_count / workers;
    (0..workers)
        .map(|i| {
            let start = i * per_worker;
            let end = if i == workers - 1 {
                frame_count
            } else {
                (i + 1) * per_worker
            };
            start..end
        })
        .collect()
}

/// 一段輸出工作的起點：幀編號加上此前累計的換段次數，
/// 後者讓各 worker 能直接算出穩定的輸出檔編號
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentBoundary {
    pub frame: usize,
    pub segment_offset: usize,
}

/// 一般模式輸出前的邊界計算
///
/// 從頭走一遍 pause 時間軸並數換段次數；每當走過一個
/// worker 對齊點（`frame_per_worker * 已有邊界數`）且標籤尚未變化，
/// 便開始等待下一次翻轉，翻轉處即為邊界。邊界永遠落在真正的
/// 標籤轉換點上，絕不把一個段落切成兩半；負載平均是其次。
#[must_use]
pub fn segment_bounds(
    pause: &[bool],
    frame_per_worker: usize,
    max_workers: usize,
) -> Vec<SegmentBoundary> {
    let mut bounds = vec![SegmentBoundary {
        frame: 0,
        segment_offset: 0,
    }];
    let mut segment_cnt = 0usize;
    let mut armed = false;

    for i in 1..pause.len() {
        if bounds.len() == max_workers {
            break;
        }
        let flipped = pause[i] != pause[i - 1];
        if flipped {
            segment_cnt += 1;
        }
        if !flipped && i >= frame_per_worker * bounds.len() {
            armed = true;
        } else if armed && flipped {
            bounds.push(SegmentBoundary {
                frame: i,
                segment_offset: segment_cnt,
            });
            armed = false;
        }
    }

    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_even_exact() {
        // 100 幀 4 worker：四段各 25 幀
        let ranges = split_even(100, 4);
        assert_eq!(ranges, vec![0..25, 25..50, 50..75, 75..100]);
    }

    #[test]
    fn test_split_even_remainder_to_last() {
        let ranges = split_even(103, 4);
        assert_eq!(ranges, vec![0..25, 25..50, 50..75, 75..103]);
    }

    #[test]
    fn test_split_even_single_worker() {
        assert_eq!(split_even(42, 1), vec![0..42]);
    }

    #[test]
    fn test_split_even_fewer_frames_than_workers() {
        let ranges = split_even(3, 4);
        assert_eq!(ranges, vec![0..0, 0..0, 0..0, 0..3]);
    }

    fn label_constant_between(pause: &[bool], bounds: &[SegmentBoundary]) {
        for w in bounds.windows(2) {
            let (a, b) = (w[0].frame, w[1].frame);
            assert!(a < b, "邊界必須嚴格遞增");
            // 邊界與邊界之間可以有換段，但邊界本身必須落在轉換點
            assert_ne!(pause[b], pause[b - 1], "邊界 {b} 不在標籤轉換點");
        }
    }

    #[test]
    fn test_segment_bounds_fall_on_transitions() {
        // 20 幀、4 worker：每 5 幀對齊一次
        let pause: Vec<bool> = [
            false, false, false, false, false, false, true, true, true, false, false, false,
            false, true, true, true, false, false, true, true,
        ]
        .to_vec();
        let bounds = segment_bounds(&pause, 5, 4);

        assert_eq!(bounds[0].frame, 0);
        assert_eq!(bounds[0].segment_offset, 0);
        assert!(bounds.len() <= 4);
        label_constant_between(&pause, &bounds);

        // 第一個對齊點 5 之後的下一個翻轉在 6
        assert_eq!(bounds[1].frame, 6);
        assert_eq!(bounds[1].segment_offset, 1);
    }

    #[test]
    fn test_segment_bounds_capped_by_worker_count() {
        // 標籤每幀翻轉：邊界數仍不超過 worker 數
        let pause: Vec<bool> = (0..100).map(|i| i % 2 == 0).collect();
        let bounds = segment_bounds(&pause, 10, 4);
        assert!(bounds.len() <= 4);
        label_constant_between(&pause, &bounds);
    }

    #[test]
    fn test_segment_bounds_constant_label_yields_single_bound() {
        let pause = vec![false; 50];
        let bounds = segment_bounds(&pause, 10, 4);
        assert_eq!(bounds.len(), 1);
        assert_eq!(bounds[0].frame, 0);
    }

    #[test]
    fn test_segment_offsets_count_flips() {
        let pause = vec![
            false, true, false, false, false, false, false, true, true, false, false, false,
        ];
        let bounds = segment_bounds(&pause, 4, 3);
        for w in bounds.windows(2) {
            let flips: usize = (1..=w[1].frame)
                .filter(|&i| pause[i] != pause[i - 1])
                .count();
            assert_eq!(w[1].segment_offset, flips);
        }
    }
}
