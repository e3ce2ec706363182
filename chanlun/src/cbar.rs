//! K 线包含处理与分型标记。
//!
//! 包含关系只打标记不删除，后续所有相邻关系都跳过 `enclosed` 的 K 线，
//! 因此输出与输入按下标一一对齐。

use crate::bar::{MergedBar, PriceBar};
use crate::config::TrendSeeding;
use crate::constant::{Direction, FractalType};

/// 处理包含关系并标记顶底分型。
pub fn merge_bars(bars: &[PriceBar], seeding: TrendSeeding) -> Vec<MergedBar> {
    let mut rows: Vec<MergedBar> = bars.iter().map(MergedBar::from_price_bar).collect();
    resolve_inclusion(&mut rows, seeding);
    label_fractals(&mut rows);
    rows
}

fn resolve_inclusion(rows: &mut [MergedBar], seeding: TrendSeeding) {
    let mut i = 0;
    let mut j = 1;
    while j < rows.len() {
        if seeding == TrendSeeding::Directional {
            if let Some(direction) = seed_direction(&rows[i], &rows[j]) {
                rows[j].trend = Some(direction);
            }
        }

        if rows[i].contains(&rows[j]) {
            // 锚点包含探针：按锚点走势的反方向收缩锚点
            let inner = rows[j].clone();
            let anchor = &mut rows[i];
            if anchor.trend == Some(Direction::Up) {
                anchor.low = anchor.low.max(inner.low);
            } else {
                anchor.high = anchor.high.min(inner.high);
            }
            rows[j].enclosed = true;
            j += 1;
        } else if rows[j].contains(&rows[i]) {
            let inner = rows[i].clone();
            let outer = &mut rows[j];
            let up = inner.trend == Some(Direction::Up);
            match seeding {
                // 与既有图表输出保持一致：向上压低高点，否则抬高低点
                TrendSeeding::Literal if up => outer.high = outer.high.min(inner.high),
                TrendSeeding::Literal => outer.low = outer.low.max(inner.low),
                // 与锚点包含探针时同向收缩
                TrendSeeding::Directional if up => outer.low = outer.low.max(inner.low),
                TrendSeeding::Directional => outer.high = outer.high.min(inner.high),
            }
            outer.trend = inner.trend;
            rows[i].enclosed = true;
            i = j;
            j += 1;
        } else {
            i = j;
            j += 1;
        }
    }
}

fn seed_direction(anchor: &MergedBar, probe: &MergedBar) -> Option<Direction> {
    if probe.high > anchor.high && probe.low > anchor.low {
        Some(Direction::Up)
    } else if probe.high < anchor.high && probe.low < anchor.low {
        Some(Direction::Down)
    } else {
        None
    }
}

/// 对每根非包含 K 线，与左右最近的非包含 K 线比较高低点。
///
/// 两侧都严格更高记为顶分型，两侧都严格更低记为底分型；两者同时成立时取顶。
pub(crate) fn label_fractals(rows: &mut [MergedBar]) {
    for idx in 0..rows.len() {
        rows[idx].fractal = None;
        if rows[idx].enclosed {
            continue;
        }
        let (Some(prev), Some(next)) = (prev_active(rows, idx), next_active(rows, idx)) else {
            continue;
        };
        let (left, middle, right) = (&rows[prev], &rows[idx], &rows[next]);
        let fractal = if middle.high > left.high && middle.high > right.high {
            Some(FractalType::Top)
        } else if middle.low < left.low && middle.low < right.low {
            Some(FractalType::Bottom)
        } else {
            None
        };
        rows[idx].fractal = fractal;
    }
}

pub(crate) fn prev_active(rows: &[MergedBar], idx: usize) -> Option<usize> {
    (0..idx).rev().find(|&k| rows[k].is_active())
}

pub(crate) fn next_active(rows: &[MergedBar], idx: usize) -> Option<usize> {
    (idx + 1..rows.len()).find(|&k| rows[k].is_active())
}

/// 闭区间 `[min(a, b), max(a, b)]` 内非包含 K 线的数量。
pub(crate) fn active_count_between(rows: &[MergedBar], a: usize, b: usize) -> usize {
    let (lo, hi) = (a.min(b), a.max(b));
    rows[lo..=hi].iter().filter(|x| x.is_active()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(ranges: &[(f64, f64)]) -> Vec<PriceBar> {
        ranges
            .iter()
            .enumerate()
            .map(|(i, &(high, low))| PriceBar::new(i as i64, low, high, low, high))
            .collect()
    }

    fn raw(high: f64, low: f64) -> MergedBar {
        MergedBar {
            timestamp: 0,
            high,
            low,
            enclosed: false,
            fractal: None,
            trend: None,
        }
    }

    #[test]
    fn anchor_containing_probe_lowers_anchor_high() {
        let rows = merge_bars(&bars(&[(10.0, 5.0), (9.0, 6.0)]), TrendSeeding::Literal);
        assert!(!rows[0].enclosed);
        assert!(rows[1].enclosed);
        assert_eq!(rows[0].high, 9.0);
        assert_eq!(rows[0].low, 5.0);
    }

    #[test]
    fn probe_containing_anchor_takes_over_as_anchor() {
        let rows = merge_bars(&bars(&[(9.0, 6.0), (10.0, 5.0)]), TrendSeeding::Literal);
        assert!(rows[0].enclosed);
        assert!(!rows[1].enclosed);
        // 无走势时抬高低点
        assert_eq!(rows[1].high, 10.0);
        assert_eq!(rows[1].low, 6.0);
    }

    #[test]
    fn directional_probe_containing_anchor_lowers_high_without_up_trend() {
        let rows = merge_bars(&bars(&[(9.0, 6.0), (10.0, 5.0)]), TrendSeeding::Directional);
        assert!(rows[0].enclosed);
        assert_eq!(rows[1].trend, None);
        assert_eq!(rows[1].high, 9.0);
        assert_eq!(rows[1].low, 5.0);
    }

    #[test]
    fn identical_bars_enclose_the_later_one() {
        let rows = merge_bars(&bars(&[(10.0, 5.0), (10.0, 5.0)]), TrendSeeding::Literal);
        assert!(!rows[0].enclosed);
        assert!(rows[1].enclosed);
    }

    #[test]
    fn literal_seeding_never_marks_a_trend() {
        let rows = merge_bars(
            &bars(&[(10.0, 5.0), (12.0, 7.0), (11.0, 8.0), (9.0, 4.0)]),
            TrendSeeding::Literal,
        );
        assert!(rows.iter().all(|x| x.trend.is_none()));
        // 无走势时按向下收缩
        assert_eq!(rows[1].high, 11.0);
        assert_eq!(rows[1].low, 7.0);
    }

    #[test]
    fn directional_seeding_shrinks_upward_inside_a_rise() {
        let rows = merge_bars(
            &bars(&[(10.0, 5.0), (12.0, 7.0), (11.0, 8.0)]),
            TrendSeeding::Directional,
        );
        assert_eq!(rows[1].trend, Some(Direction::Up));
        assert!(rows[2].enclosed);
        assert_eq!(rows[1].high, 12.0);
        assert_eq!(rows[1].low, 8.0);
    }

    #[test]
    fn directional_seeding_shrinks_downward_inside_a_fall() {
        let rows = merge_bars(
            &bars(&[(12.0, 7.0), (10.0, 5.0), (9.0, 6.0)]),
            TrendSeeding::Directional,
        );
        assert_eq!(rows[1].trend, Some(Direction::Down));
        assert!(rows[2].enclosed);
        assert_eq!(rows[1].high, 9.0);
        assert_eq!(rows[1].low, 5.0);
    }

    #[test]
    fn directional_trend_propagates_to_containing_bar() {
        let rows = merge_bars(
            &bars(&[(10.0, 5.0), (12.0, 7.0), (13.0, 6.0)]),
            TrendSeeding::Directional,
        );
        assert!(rows[1].enclosed);
        assert_eq!(rows[2].trend, Some(Direction::Up));
        assert_eq!(rows[2].low, 7.0);
        assert_eq!(rows[2].high, 13.0);
    }

    #[test]
    fn flat_v_marks_single_bottom() {
        let rows = merge_bars(
            &bars(&[(10.0, 8.0), (9.0, 5.0), (11.0, 9.0)]),
            TrendSeeding::Literal,
        );
        assert_eq!(rows[0].fractal, None);
        assert_eq!(rows[1].fractal, Some(FractalType::Bottom));
        assert_eq!(rows[2].fractal, None);
    }

    #[test]
    fn enclosed_bars_are_skipped_when_finding_neighbours() {
        // 下标 2 被下标 1 包含，下标 1 的右邻居应为下标 3
        let rows = merge_bars(
            &bars(&[(8.0, 6.0), (12.0, 9.0), (11.0, 10.0), (10.0, 7.0)]),
            TrendSeeding::Literal,
        );
        assert!(rows[2].enclosed);
        assert_eq!(rows[2].fractal, None);
        assert_eq!(rows[1].fractal, Some(FractalType::Top));
        assert_eq!(next_active(&rows, 1), Some(3));
        assert_eq!(active_count_between(&rows, 0, 3), 3);
    }

    #[test]
    fn top_wins_when_both_conditions_hold() {
        // 合并阶段不会产生这种形态，直接构造以覆盖优先级
        let mut rows = vec![raw(10.0, 5.0), raw(12.0, 3.0), raw(11.0, 4.0)];
        label_fractals(&mut rows);
        assert_eq!(rows[1].fractal, Some(FractalType::Top));
    }

    #[test]
    fn boundary_bars_never_carry_fractals() {
        let mut rows = vec![raw(12.0, 4.0), raw(10.0, 3.0), raw(13.0, 5.0)];
        label_fractals(&mut rows);
        assert_eq!(rows[0].fractal, None);
        assert_eq!(rows[2].fractal, None);
        assert_eq!(rows[1].fractal, Some(FractalType::Bottom));
    }
}
