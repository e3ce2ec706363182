#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use chanlun::{MergedBar, PriceBar, Stroke};

pub const BASE_TS: i64 = 1_700_000_000_000;
pub const MINUTE: i64 = 60_000;

/// 按转折价线性插值生成宽度为 1 的 K 线，转折点恰好落在 `leg` 的整数倍下标。
pub fn zigzag(turns: &[f64], leg: usize) -> Vec<PriceBar> {
    let mut mids = Vec::new();
    for pair in turns.windows(2) {
        for off in 0..leg {
            mids.push(pair[0] + (pair[1] - pair[0]) * off as f64 / leg as f64);
        }
    }
    if let Some(last) = turns.last() {
        mids.push(*last);
    }
    mids.iter()
        .enumerate()
        .map(|(i, &mid)| bar_at(i, mid + 0.5, mid - 0.5))
        .collect()
}

/// 腿长不等的长锯齿，每隔若干根插入一根内包 K 线。
pub fn noisy_zigzag() -> Vec<PriceBar> {
    let turns = [
        100.0, 110.0, 103.0, 115.0, 106.0, 112.0, 98.0, 108.0, 95.0, 104.0, 90.0, 101.0, 94.0,
        109.0, 99.0, 118.0, 105.0, 111.0, 100.0, 107.0,
    ];
    let legs = [6_usize, 7, 8, 9];

    let mut ranges: Vec<(f64, f64)> = Vec::new();
    for (n, pair) in turns.windows(2).enumerate() {
        let leg = legs[n % legs.len()];
        for off in 0..leg {
            let mid = pair[0] + (pair[1] - pair[0]) * off as f64 / leg as f64;
            ranges.push((mid + 0.5, mid - 0.5));
            if ranges.len() % 11 == 0 {
                ranges.push((mid + 0.4, mid - 0.4));
            }
        }
    }
    if let Some(last) = turns.last() {
        ranges.push((last + 0.5, last - 0.5));
    }

    ranges
        .iter()
        .enumerate()
        .map(|(i, &(high, low))| bar_at(i, high, low))
        .collect()
}

pub fn bar_at(i: usize, high: f64, low: f64) -> PriceBar {
    let open = if i % 2 == 0 { low } else { high };
    let close = if i % 2 == 0 { high } else { low };
    PriceBar::new(BASE_TS + i as i64 * MINUTE, open, high, low, close)
}

/// 固定周期涨跌叠加缓慢上漂，高低点各向外扩 0.9。
pub fn cycle_bars(count: usize) -> Vec<PriceBar> {
    let mut bars = Vec::with_capacity(count);
    let mut price = 100.0_f64;
    let cycle = [0.0_f64, 3.1, -2.9, 4.2, -3.3, 2.0, -1.7, 3.5, -2.6, 1.4];
    for i in 0..count {
        let open = price;
        let drift = (i as f64) * 0.02;
        let close = (100.0 + drift + cycle[i % cycle.len()]).max(1.0);
        let high = open.max(close) + 0.9;
        let low = open.min(close) - 0.9;
        price = close;
        bars.push(PriceBar::new(BASE_TS + i as i64 * 15 * MINUTE, open, high, low, close));
    }
    bars
}

pub fn index_by_timestamp(merged: &[MergedBar]) -> HashMap<i64, usize> {
    merged
        .iter()
        .enumerate()
        .map(|(i, row)| (row.timestamp, i))
        .collect()
}

pub fn active_between(merged: &[MergedBar], a: usize, b: usize) -> usize {
    merged[a.min(b)..=a.max(b)]
        .iter()
        .filter(|x| !x.enclosed)
        .count()
}

pub fn assert_alternating_chain(strokes: &[Stroke]) {
    for pair in strokes.windows(2) {
        assert_ne!(
            pair[0].direction, pair[1].direction,
            "consecutive strokes must alternate: {:?} then {:?}",
            pair[0], pair[1]
        );
        assert_eq!(
            pair[0].end, pair[1].start,
            "stroke must start where the previous one ends"
        );
    }
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("data")
        .join(name)
}
