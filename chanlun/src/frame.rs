use polars::df;
use polars::prelude::DataFrame;

use crate::bar::MergedBar;
use crate::constant::{DataError, FractalType};
use crate::pivot::Pivot;
use crate::stroke::Stroke;

pub fn merged_bars_frame(rows: &[MergedBar]) -> Result<DataFrame, DataError> {
    let timestamp: Vec<i64> = rows.iter().map(|x| x.timestamp).collect();
    let high: Vec<f64> = rows.iter().map(|x| x.high).collect();
    let low: Vec<f64> = rows.iter().map(|x| x.low).collect();
    let enclosed: Vec<bool> = rows.iter().map(|x| x.enclosed).collect();
    let fractal: Vec<i32> = rows
        .iter()
        .map(|x| match x.fractal {
            Some(FractalType::Top) => 1,
            Some(FractalType::Bottom) => -1,
            None => 0,
        })
        .collect();
    let trend: Vec<i32> = rows
        .iter()
        .map(|x| x.trend.map_or(0, |d| i32::from(d.as_i8())))
        .collect();

    let frame = df!(
        "timestamp" => timestamp,
        "high" => high,
        "low" => low,
        "enclosed" => enclosed,
        "fractal" => fractal,
        "trend" => trend
    )?;
    Ok(frame)
}

pub fn strokes_frame(strokes: &[Stroke]) -> Result<DataFrame, DataError> {
    let direction: Vec<i32> = strokes
        .iter()
        .map(|x| i32::from(x.direction.as_i8()))
        .collect();
    let start_timestamp: Vec<i64> = strokes.iter().map(|x| x.start.timestamp).collect();
    let start_price: Vec<f64> = strokes.iter().map(|x| x.start.price).collect();
    let end_timestamp: Vec<i64> = strokes.iter().map(|x| x.end.timestamp).collect();
    let end_price: Vec<f64> = strokes.iter().map(|x| x.end.price).collect();

    let frame = df!(
        "direction" => direction,
        "start_timestamp" => start_timestamp,
        "start_price" => start_price,
        "end_timestamp" => end_timestamp,
        "end_price" => end_price
    )?;
    Ok(frame)
}

pub fn pivots_frame(pivots: &[Pivot]) -> Result<DataFrame, DataError> {
    let direction: Vec<i32> = pivots
        .iter()
        .map(|x| i32::from(x.direction.as_i8()))
        .collect();
    let start: Vec<i64> = pivots.iter().map(|x| x.start).collect();
    let end: Vec<i64> = pivots.iter().map(|x| x.end).collect();
    let low: Vec<f64> = pivots.iter().map(|x| x.low).collect();
    let high: Vec<f64> = pivots.iter().map(|x| x.high).collect();

    let frame = df!(
        "direction" => direction,
        "start" => start,
        "end" => end,
        "low" => low,
        "high" => high
    )?;
    Ok(frame)
}
