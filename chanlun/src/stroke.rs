use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bar::MergedBar;
use crate::cbar::active_count_between;
use crate::constant::{DataError, Direction, FractalType};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub timestamp: i64,
    pub price: f64,
}

/// 笔：连接两个相反分型的一段单向走势。
///
/// 向上笔 `start` 为低点、`end` 为高点，向下笔相反。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    #[serde(rename = "type")]
    pub direction: Direction,
    pub start: StrokePoint,
    pub end: StrokePoint,
}

impl Stroke {
    /// 以 `rows[end]` 的分型决定方向；`end` 必须带分型。
    fn between(rows: &[MergedBar], start: usize, end: usize, kind: FractalType) -> Self {
        let (from, to) = (&rows[start], &rows[end]);
        let direction = kind.stroke_direction();
        let (start_price, end_price) = match direction {
            Direction::Up => (from.low, to.high),
            Direction::Down => (from.high, to.low),
        };
        Self {
            direction,
            start: StrokePoint {
                timestamp: from.timestamp,
                price: start_price,
            },
            end: StrokePoint {
                timestamp: to.timestamp,
                price: end_price,
            },
        }
    }

    pub fn high_price(&self) -> f64 {
        self.start.price.max(self.end.price)
    }

    pub fn low_price(&self) -> f64 {
        self.start.price.min(self.end.price)
    }
}

/// 贪心画笔。
///
/// 三个游标 `i < j < k`：先为 `i` 找到能成笔的 `j`，再看 `j` 之后能否接出
/// 反向笔 `(j, k)`；能则确认 `(i, j)`，否则若 `k` 是与 `j` 同类且更极端的
/// 分型，则用 `k` 延伸 `j`。下标 0 视为第一笔的隐含起点。
pub fn strokes_greedy(rows: &[MergedBar], min_stroke_bars: usize) -> Vec<Stroke> {
    let n = rows.len();
    let mut strokes = Vec::new();
    let (mut i, mut j, mut k) = (0, 1, 2);

    while k < n {
        let Some(kind) = stroke_end_kind(rows, i, j, min_stroke_bars) else {
            j += 1;
            k = j + 1;
            continue;
        };

        if stroke_end_kind(rows, j, k, min_stroke_bars).is_some() {
            strokes.push(Stroke::between(rows, i, j, kind));
            i = j;
            j = k;
            k = j + 1;
            continue;
        }

        if supersedes(&rows[j], &rows[k]) {
            j = k;
            k = j + 1;
            continue;
        }

        k += 1;
    }

    if let Some(kind) = stroke_end_kind(rows, i, j, min_stroke_bars) {
        strokes.push(Stroke::between(rows, i, j, kind));
    }
    strokes
}

/// `(a, b)` 能成笔时返回终点 `b` 的分型。
fn stroke_end_kind(
    rows: &[MergedBar],
    a: usize,
    b: usize,
    min_stroke_bars: usize,
) -> Option<FractalType> {
    if a >= rows.len() || b >= rows.len() || a == b {
        return None;
    }
    let end_kind = rows[b].fractal?;
    // 首根 K 线作为与终点相反的隐含分型
    let start_kind = if a == 0 {
        end_kind.opposite()
    } else {
        rows[a].fractal?
    };
    if start_kind == end_kind {
        return None;
    }
    if active_count_between(rows, a, b) < min_stroke_bars {
        return None;
    }
    let priced = match (start_kind, end_kind) {
        (FractalType::Top, FractalType::Bottom) => rows[a].high > rows[b].low,
        (FractalType::Bottom, FractalType::Top) => rows[a].low < rows[b].high,
        _ => false,
    };
    priced.then_some(end_kind)
}

/// `candidate` 与 `current` 同为顶（底）且更高（更低）。
fn supersedes(current: &MergedBar, candidate: &MergedBar) -> bool {
    match (current.fractal, candidate.fractal) {
        (Some(FractalType::Top), Some(FractalType::Top)) => candidate.high > current.high,
        (Some(FractalType::Bottom), Some(FractalType::Bottom)) => candidate.low < current.low,
        _ => false,
    }
}

#[derive(Debug, Clone)]
struct StrokeDpCell {
    target: usize,
    kind: FractalType,
    count: usize,
    prev: Option<usize>,
    dif: f64,
}

/// 动态规划画笔：在所有合法的相反分型链中取笔数最多者，笔数相同取总振幅最大者。
///
/// 返回按时间正序排列的笔。
pub fn strokes_optimal(rows: &[MergedBar], min_gap: usize, lookback: usize) -> Vec<Stroke> {
    let mut dp: Vec<StrokeDpCell> = rows
        .iter()
        .enumerate()
        .filter_map(|(target, row)| {
            row.fractal.map(|kind| StrokeDpCell {
                target,
                kind,
                count: 0,
                prev: None,
                dif: 0.0,
            })
        })
        .collect();

    for i in 0..dp.len() {
        for j in (i.saturating_sub(lookback)..i).rev() {
            if dp[j].kind == dp[i].kind {
                continue;
            }
            if dp[i].target - dp[j].target < min_gap {
                continue;
            }
            let (curr, prev) = (&rows[dp[i].target], &rows[dp[j].target]);
            let reachable = match dp[i].kind {
                FractalType::Bottom => curr.low <= prev.high,
                FractalType::Top => curr.high >= prev.low,
            };
            if !reachable {
                continue;
            }

            let count = dp[j].count + 1;
            let dif = dp[j].dif + excursion(curr, prev, dp[i].kind);
            if count > dp[i].count || (count == dp[i].count && dif > dp[i].dif) {
                dp[i].count = count;
                dp[i].prev = Some(j);
                dp[i].dif = dif;
            }
        }
    }

    let mut best: Option<usize> = None;
    for (idx, cell) in dp.iter().enumerate() {
        let current = best.map_or(0, |b| dp[b].count);
        if cell.count > current {
            best = Some(idx);
        }
    }

    let mut strokes = Vec::new();
    let mut cursor = best;
    while let Some(idx) = cursor {
        let cell = &dp[idx];
        if let Some(prev) = cell.prev {
            strokes.push(Stroke::between(rows, dp[prev].target, cell.target, cell.kind));
        }
        cursor = cell.prev;
    }
    strokes.reverse();
    strokes
}

fn excursion(curr: &MergedBar, prev: &MergedBar, kind: FractalType) -> f64 {
    match kind {
        FractalType::Top => curr.high - prev.low,
        FractalType::Bottom => prev.high - curr.low,
    }
}

pub fn validate_strokes(strokes: &[Stroke]) -> Result<(), DataError> {
    for (index, stroke) in strokes.iter().enumerate() {
        if !stroke.start.price.is_finite() || !stroke.end.price.is_finite() {
            warn!(index, "rejecting stroke with non-finite price");
            return Err(DataError::invalid_input(index, "stroke price must be a finite number"));
        }
        if stroke.start.timestamp >= stroke.end.timestamp {
            warn!(index, "rejecting stroke that does not move forward in time");
            return Err(DataError::invalid_input(
                index,
                "stroke start timestamp must be before its end timestamp",
            ));
        }
        if index > 0 && stroke.start.timestamp < strokes[index - 1].end.timestamp {
            warn!(index, "rejecting stroke that starts before the previous one ends");
            return Err(DataError::invalid_input(
                index,
                "stroke starts before the previous stroke ends",
            ));
        }
    }
    Ok(())
}
