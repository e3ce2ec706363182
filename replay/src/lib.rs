//! 回放工具：把一份 CSV 跑完整条分析流水线，导出图表数据或做结构自检。

use std::collections::HashMap;

use chanlun::{AnalysisSnapshot, Const, FractalType, MergedBar, PriceBar};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ExportPayload {
    pub symbol: String,
    pub candles: Vec<CandlePoint>,
    pub merged_candles: Vec<MergedCandlePoint>,
    pub fractals: Vec<FractalMarker>,
    pub strokes: Vec<StrokeSegment>,
    pub pivots: Vec<PivotRange>,
}

#[derive(Debug, Serialize)]
pub struct CandlePoint {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Serialize)]
pub struct MergedCandlePoint {
    pub time: i64,
    pub high: f64,
    pub low: f64,
    pub enclosed: bool,
}

#[derive(Debug, Serialize)]
pub struct FractalMarker {
    pub time: i64,
    pub price: f64,
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StrokeSegment {
    pub direction: &'static str,
    pub t0: i64,
    pub t1: i64,
    pub v0: f64,
    pub v1: f64,
}

#[derive(Debug, Serialize)]
pub struct PivotRange {
    pub direction: &'static str,
    pub t0: i64,
    pub t1: i64,
    pub upper: f64,
    pub lower: f64,
}

pub fn build_payload(
    symbol: impl Into<String>,
    bars: &[PriceBar],
    snapshot: &AnalysisSnapshot,
) -> ExportPayload {
    let candles = bars
        .iter()
        .map(|bar| CandlePoint {
            time: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        })
        .collect();

    let merged_candles = snapshot
        .merged
        .iter()
        .map(|row| MergedCandlePoint {
            time: row.timestamp,
            high: row.high,
            low: row.low,
            enclosed: row.enclosed,
        })
        .collect();

    let fractals = snapshot
        .merged
        .iter()
        .filter_map(|row| {
            let kind = row.fractal?;
            Some(FractalMarker {
                time: row.timestamp,
                price: row.extreme_price()?,
                kind: fractal_label(kind),
            })
        })
        .collect();

    let strokes = snapshot
        .strokes
        .iter()
        .map(|s| StrokeSegment {
            direction: s.direction.as_str(),
            t0: s.start.timestamp,
            t1: s.end.timestamp,
            v0: s.start.price,
            v1: s.end.price,
        })
        .collect();

    // 图表按时间顺序绘制
    let mut pivots: Vec<PivotRange> = snapshot
        .pivots
        .iter()
        .map(|p| PivotRange {
            direction: p.direction.as_str(),
            t0: p.start,
            t1: p.end,
            upper: p.high,
            lower: p.low,
        })
        .collect();
    pivots.sort_by_key(|x| x.t0);

    ExportPayload {
        symbol: symbol.into(),
        candles,
        merged_candles,
        fractals,
        strokes,
        pivots,
    }
}

fn fractal_label(kind: FractalType) -> &'static str {
    match kind {
        FractalType::Top => "Top",
        FractalType::Bottom => "Bottom",
    }
}

/// 检查分析结果的结构约束，返回全部违例描述；空表示通过。
///
/// 笔跨度按默认阈值检查，自定义配置下的回放不要用它判定。
pub fn audit(snapshot: &AnalysisSnapshot) -> Vec<String> {
    let mut violations = Vec::new();
    audit_fractals(&snapshot.merged, &mut violations);
    audit_strokes(snapshot, &mut violations);
    audit_pivots(snapshot, &mut violations);
    violations
}

fn audit_fractals(merged: &[MergedBar], violations: &mut Vec<String>) {
    let active: Vec<usize> = (0..merged.len()).filter(|&i| !merged[i].enclosed).collect();

    for row in merged.iter().filter(|x| x.enclosed && x.fractal.is_some()) {
        violations.push(format!(
            "FRACTAL on enclosed bar at ts={}",
            row.timestamp
        ));
    }

    for (pos, &idx) in active.iter().enumerate() {
        let expected = match (pos.checked_sub(1), active.get(pos + 1)) {
            (Some(prev), Some(&next)) => {
                let (l, m, r) = (&merged[active[prev]], &merged[idx], &merged[next]);
                if m.high > l.high && m.high > r.high {
                    Some(FractalType::Top)
                } else if m.low < l.low && m.low < r.low {
                    Some(FractalType::Bottom)
                } else {
                    None
                }
            }
            _ => None,
        };
        if merged[idx].fractal != expected {
            violations.push(format!(
                "FRACTAL mismatch at ts={}: got {:?}, expected {:?}",
                merged[idx].timestamp, merged[idx].fractal, expected
            ));
        }
    }
}

fn audit_strokes(snapshot: &AnalysisSnapshot, violations: &mut Vec<String>) {
    let index: HashMap<i64, usize> = snapshot
        .merged
        .iter()
        .enumerate()
        .map(|(i, row)| (row.timestamp, i))
        .collect();

    for pair in snapshot.strokes.windows(2) {
        if pair[0].direction == pair[1].direction {
            violations.push(format!(
                "STROKE direction repeats at ts={}",
                pair[1].start.timestamp
            ));
        }
        if pair[0].end != pair[1].start {
            violations.push(format!(
                "STROKE chain broken between ts={} and ts={}",
                pair[0].end.timestamp, pair[1].start.timestamp
            ));
        }
    }

    for stroke in &snapshot.strokes {
        let (Some(&a), Some(&b)) = (
            index.get(&stroke.start.timestamp),
            index.get(&stroke.end.timestamp),
        ) else {
            violations.push(format!(
                "STROKE endpoint not on a bar: ts={}..{}",
                stroke.start.timestamp, stroke.end.timestamp
            ));
            continue;
        };

        let end_kind = snapshot.merged[b].fractal;
        if end_kind.map(|k| k.stroke_direction()) != Some(stroke.direction) {
            violations.push(format!(
                "STROKE end ts={} carries {:?} for a {} stroke",
                stroke.end.timestamp,
                end_kind,
                stroke.direction.as_str()
            ));
        }

        let active = snapshot.merged[a..=b].iter().filter(|x| !x.enclosed).count();
        if active < Const::MIN_STROKE_BARS {
            violations.push(format!(
                "STROKE ts={}..{} spans only {} active bars",
                stroke.start.timestamp, stroke.end.timestamp, active
            ));
        }
    }
}

fn audit_pivots(snapshot: &AnalysisSnapshot, violations: &mut Vec<String>) {
    for pivot in &snapshot.pivots {
        if pivot.height() <= 0.0 {
            violations.push(format!(
                "PIVOT ts={}..{} has empty zone [{}, {}]",
                pivot.start, pivot.end, pivot.low, pivot.high
            ));
        }
        for stroke in snapshot
            .strokes
            .iter()
            .filter(|s| s.start.timestamp >= pivot.start && s.end.timestamp <= pivot.end)
        {
            if stroke.low_price() > pivot.low || stroke.high_price() < pivot.high {
                violations.push(format!(
                    "PIVOT ts={}..{} interior stroke ts={} does not cross the zone",
                    pivot.start, pivot.end, stroke.start.timestamp
                ));
            }
        }
    }

    for pair in snapshot.pivots.windows(2) {
        if pair[0].start <= pair[1].end {
            violations.push(format!(
                "PIVOT overlap or order error: ts={} then ts={}",
                pair[0].start, pair[1].start
            ));
        }
    }
}
