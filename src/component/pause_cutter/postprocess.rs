//! 時間軸後處理：所有分析 worker 會合之後、輸出之前執行

/// 把有效暫停區段往兩側擴張，涵蓋相鄰的普通暫停幀
///
/// 有效暫停的 UI 特徵只在暫停的中段短暫可見，擴張後整段暫停
/// 才會被保留而不是只剩中間幾幀。此操作是冪等的。
pub fn expand_valid_pause_range(pause: &[bool], valid_pause: &mut [bool]) {
    let n = pause.len();
    debug_assert_eq!(n, valid_pause.len());
    if n < 2 {
        return;
    }

    for i in 1..n - 1 {
        if valid_pause[i] && !valid_pause[i - 1] && pause[i - 1] {
            let mut a = i - 1;
            while pause[a] {
                valid_pause[a] = true;
                if a == 0 {
                    break;
                }
                a -= 1;
            }
        }
        if valid_pause[i] && !valid_pause[i + 1] && pause[i + 1] {
            let mut a = i + 1;
            while a < n && pause[a] {
                valid_pause[a] = true;
                a += 1;
            }
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum RunClass {
    Keep,
    ValidPause,
}

/// 抑制取樣雜訊造成的閃爍短區段（只用於懶人保留模式）
///
/// 把 keep 與 valid_pause 視為兩個交替出現的類別掃過去，
/// 一段剛結束的連續區段長度小於等於門檻時，整段在自己的
/// 陣列中清為 false。門檻為 0 時不做任何事。
pub fn suppress_short_runs(keep: &mut [bool], valid_pause: &mut [bool], threshold: usize) {
    debug_assert_eq!(keep.len(), valid_pause.len());
    if threshold == 0 {
        return;
    }

    let mut run_len = 0usize;
    let mut start = 0usize;
    let mut current = RunClass::Keep;

    for i in 0..keep.len() {
        if keep[i] {
            if current == RunClass::Keep {
                run_len += 1;
            } else {
                if run_len <= threshold {
                    for flag in &mut valid_pause[start..i] {
                        *flag = false;
                    }
                }
                run_len = 1;
                start = i;
                current = RunClass::Keep;
            }
        } else if valid_pause[i] {
            if current == RunClass::ValidPause {
                run_len += 1;
            } else {
                if run_len <= threshold && run_len > 0 {
                    for flag in &mut keep[start..i] {
                        *flag = false;
                    }
                }
                run_len = 1;
                start = i;
                current = RunClass::ValidPause;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_promotes_adjacent_pause_frames() {
        let pause = vec![false, false, true, true, true, false, false];
        let mut valid = vec![false, false, false, true, false, false, false];
        expand_valid_pause_range(&pause, &mut valid);
        assert_eq!(valid, vec![false, false, true, true, true, false, false]);
    }

    #[test]
    fn test_expand_stops_at_non_pause() {
        let pause = vec![true, false, true, true, false];
        let mut valid = vec![false, false, false, true, false];
        expand_valid_pause_range(&pause, &mut valid);
        // 擴張只會越過連續的暫停幀，index 0 被 index 1 擋住
        assert_eq!(valid, vec![false, false, true, true, false]);
    }

    #[test]
    fn test_expand_reaches_array_edges() {
        let pause = vec![true, true, true, true];
        let mut valid = vec![false, true, false, false];
        expand_valid_pause_range(&pause, &mut valid);
        assert_eq!(valid, vec![true, true, true, true]);
    }

    #[test]
    fn test_expand_is_idempotent() {
        let pause = vec![false, true, true, true, true, false, true, true, false];
        let mut valid = vec![false, false, true, false, false, false, false, true, false];
        expand_valid_pause_range(&pause, &mut valid);
        let once = valid.clone();
        expand_valid_pause_range(&pause, &mut valid);
        assert_eq!(valid, once);
    }

    #[test]
    fn test_expand_no_valid_pause_is_noop() {
        let pause = vec![true, true, false, true];
        let mut valid = vec![false, false, false, false];
        expand_valid_pause_range(&pause, &mut valid);
        assert_eq!(valid, vec![false, false, false, false]);
    }

    #[test]
    fn test_suppress_threshold_zero_is_noop() {
        let mut keep = vec![true, false, true, false, true];
        let mut valid = vec![false, true, false, true, false];
        let keep_before = keep.clone();
        let valid_before = valid.clone();
        suppress_short_runs(&mut keep, &mut valid, 0);
        assert_eq!(keep, keep_before);
        assert_eq!(valid, valid_before);
    }

    #[test]
    fn test_suppress_short_valid_run() {
        // keep 長段、valid 兩幀、keep 長段：valid 短段被清掉
        let mut keep = vec![true, true, true, false, false, true, true, true];
        let mut valid = vec![false, false, false, true, true, false, false, false];
        suppress_short_runs(&mut keep, &mut valid, 2);
        assert_eq!(valid, vec![false; 8]);
        assert_eq!(
            keep,
            vec![true, true, true, false, false, true, true, true]
        );
    }

    #[test]
    fn test_suppress_short_keep_run() {
        let mut keep = vec![false, false, false, true, true, false, false, false];
        let mut valid = vec![true, true, true, false, false, true, true, true];
        suppress_short_runs(&mut keep, &mut valid, 2);
        assert_eq!(keep, vec![false; 8]);
        assert_eq!(
            valid,
            vec![true, true, true, false, false, true, true, true]
        );
    }

    #[test]
    fn test_suppress_keeps_runs_above_threshold() {
        let mut keep = vec![true, true, true, false, false, false, true, true, true];
        let mut valid = vec![false, false, false, true, true, true, false, false, false];
        suppress_short_runs(&mut keep, &mut valid, 2);
        // 三幀的 valid 區段超過門檻，保持不動
        assert_eq!(
            valid,
            vec![false, false, false, true, true, true, false, false, false]
        );
    }

    #[test]
    fn test_suppress_never_adds_true_entries() {
        let mut keep = vec![true, false, true, true, false, true];
        let mut valid = vec![false, true, false, false, true, false];
        let keep_count = keep.iter().filter(|&&b| b).count();
        let valid_count = valid.iter().filter(|&&b| b).count();
        suppress_short_runs(&mut keep, &mut valid, 1);
        assert!(keep.iter().filter(|&&b| b).count() <= keep_count);
        assert!(valid.iter().filter(|&&b| b).count() <= valid_count);
    }
}
