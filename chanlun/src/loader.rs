use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::bar::PriceBar;
use crate::constant::DataError;

#[derive(Debug, Deserialize)]
struct CsvBarRow {
    #[serde(alias = "timestamp", alias = "time")]
    datetime: String,
    #[serde(alias = "open_price")]
    open: f64,
    #[serde(alias = "high_price")]
    high: f64,
    #[serde(alias = "low_price")]
    low: f64,
    #[serde(alias = "close_price")]
    close: f64,
}

/// 从 CSV 文件读取 K 线，时间列可为日期字符串或毫秒时间戳。
pub fn load_price_bars(file_path: impl AsRef<Path>) -> Result<Vec<PriceBar>, DataError> {
    let file_path = file_path.as_ref();
    let reader = csv::Reader::from_path(file_path)?;
    let bars = collect_rows(reader)?;
    debug!(path = %file_path.display(), bars = bars.len(), "loaded price bars");
    Ok(bars)
}

pub fn read_price_bars<R: Read>(reader: R) -> Result<Vec<PriceBar>, DataError> {
    collect_rows(csv::Reader::from_reader(reader))
}

fn collect_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<PriceBar>, DataError> {
    let mut out = Vec::new();
    for row in reader.deserialize::<CsvBarRow>() {
        let row = row?;
        out.push(PriceBar {
            timestamp: parse_timestamp(&row.datetime)?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
        });
    }
    Ok(out)
}

/// 解析为毫秒时间戳。
pub fn parse_timestamp(value: &str) -> Result<i64, DataError> {
    let value = value.trim();
    if let Ok(millis) = value.parse::<i64>() {
        return Ok(millis);
    }
    parse_datetime(value).map(|dt| dt.timestamp_millis())
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, DataError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let patterns = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S%.f",
        "%Y%m%d%H%M%S%.f",
    ];

    for pattern in patterns {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
        }
    }

    Err(DataError::InvalidDatetime(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_price_suffixed_columns() {
        let text = "datetime,open_price,high_price,low_price,close_price,volume\n\
                    2024-01-02 09:00:00,10.0,11.0,9.5,10.5,100\n\
                    2024-01-02 09:15:00,10.5,12.0,10.0,11.5,120\n";
        let bars = read_price_bars(text.as_bytes()).expect("valid csv");
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].high, 11.0);
        assert_eq!(bars[1].timestamp - bars[0].timestamp, 15 * 60 * 1000);
    }

    #[test]
    fn reads_numeric_timestamps() {
        let text = "timestamp,open,high,low,close\n1700000000000,1,2,0.5,1.5\n";
        let bars = read_price_bars(text.as_bytes()).expect("valid csv");
        assert_eq!(bars[0].timestamp, 1_700_000_000_000);
    }

    #[test]
    fn date_only_and_rfc3339_are_accepted() {
        assert_eq!(
            parse_timestamp("2024-01-02").expect("date"),
            parse_timestamp("2024-01-02T00:00:00Z").expect("rfc3339")
        );
    }

    #[test]
    fn garbage_datetime_is_reported() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, DataError::InvalidDatetime(_)));
    }
}
