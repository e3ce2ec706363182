//! 中枢构建。
//!
//! 以每一笔为突破笔向前枚举同向的进入笔，区间 `[low, high]` 由两者之间
//! （含进入笔）的笔端点收窄：向下笔抬高下沿，向上笔压低上沿。区间一旦
//! 闭合即停止向前枚举。所有可行中枢再做一次“不重叠、覆盖笔数最多”的
//! 动态规划，最后沿回溯指针输出。

use serde::{Deserialize, Serialize};

use crate::constant::Direction;
use crate::stroke::Stroke;

/// 中枢：`start`/`end` 为进入笔终点与突破笔起点的时间戳。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    #[serde(rename = "type")]
    pub direction: Direction,
    pub start: i64,
    pub end: i64,
    pub low: f64,
    pub high: f64,
}

impl Pivot {
    pub fn height(&self) -> f64 {
        self.high - self.low
    }
}

#[derive(Debug, Clone)]
struct PivotDpCell {
    direction: Direction,
    start: usize,
    end: usize,
    low: f64,
    high: f64,
    count: usize,
    prev: Option<usize>,
}

/// 返回覆盖笔数最多的一组不重叠中枢，按回溯顺序（时间倒序）排列。
pub fn pivots_dp(strokes: &[Stroke], min_span: usize) -> Vec<Pivot> {
    let mut dp: Vec<PivotDpCell> = Vec::new();

    for i in 0..strokes.len() {
        let breakout = &strokes[i];
        // 突破笔自身的终点参与限定区间，保证中枢未被突破笔提前打穿
        let mut low = match breakout.direction {
            Direction::Down => breakout.end.price,
            Direction::Up => f64::NEG_INFINITY,
        };
        let mut high = match breakout.direction {
            Direction::Up => breakout.end.price,
            Direction::Down => f64::INFINITY,
        };

        for j in (0..i).rev() {
            let stroke = &strokes[j];
            match stroke.direction {
                Direction::Down => low = low.max(stroke.end.price),
                Direction::Up => high = high.min(stroke.end.price),
            }
            if low >= high {
                break;
            }
            if stroke.direction != breakout.direction || i - j < min_span {
                continue;
            }
            // 非交替输入时可能有一侧从未被收窄
            if !low.is_finite() || !high.is_finite() {
                continue;
            }

            let stroke_count = i - j - 1;
            let mut cell = PivotDpCell {
                direction: breakout.direction,
                start: j,
                end: i,
                low,
                high,
                count: stroke_count,
                prev: None,
            };
            for (k, prior) in dp.iter().enumerate().rev() {
                if prior.end <= cell.start && prior.count + stroke_count > cell.count {
                    cell.count = prior.count + stroke_count;
                    cell.prev = Some(k);
                }
            }
            dp.push(cell);
        }
    }

    let mut best: Option<usize> = None;
    for (idx, cell) in dp.iter().enumerate() {
        let current = best.map_or(0, |b| dp[b].count);
        if cell.count > current {
            best = Some(idx);
        }
    }

    let mut pivots = Vec::new();
    let mut cursor = best;
    while let Some(idx) = cursor {
        let cell = &dp[idx];
        pivots.push(Pivot {
            direction: cell.direction,
            start: strokes[cell.start].end.timestamp,
            end: strokes[cell.end].start.timestamp,
            low: cell.low,
            high: cell.high,
        });
        cursor = cell.prev;
    }
    pivots
}
