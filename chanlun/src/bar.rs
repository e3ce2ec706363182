use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constant::{DataError, Direction, FractalType};

/// 原始 K 线，时间戳为毫秒。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }
}

/// 处理包含关系后的 K 线，与输入一一对应。
///
/// 被包含的 K 线不会被删除，只打上 `enclosed` 标记，保证下标稳定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedBar {
    pub timestamp: i64,
    pub high: f64,
    pub low: f64,
    pub enclosed: bool,
    pub fractal: Option<FractalType>,
    pub trend: Option<Direction>,
}

impl MergedBar {
    pub fn from_price_bar(bar: &PriceBar) -> Self {
        Self {
            timestamp: bar.timestamp,
            high: bar.high,
            low: bar.low,
            enclosed: false,
            fractal: None,
            trend: None,
        }
    }

    /// `self` 的区间完全覆盖 `other`。
    pub fn contains(&self, other: &Self) -> bool {
        self.high >= other.high && self.low <= other.low
    }

    pub fn is_active(&self) -> bool {
        !self.enclosed
    }

    /// 分型所在的极值价：顶取最高价，底取最低价。
    pub fn extreme_price(&self) -> Option<f64> {
        self.fractal.map(|kind| match kind {
            FractalType::Top => self.high,
            FractalType::Bottom => self.low,
        })
    }
}

pub fn validate_bars(bars: &[PriceBar]) -> Result<(), DataError> {
    for (index, bar) in bars.iter().enumerate() {
        let prices = [bar.open, bar.high, bar.low, bar.close];
        if prices.iter().any(|x| !x.is_finite()) {
            warn!(index, timestamp = bar.timestamp, "rejecting bar with non-finite price");
            return Err(DataError::invalid_input(index, "price must be a finite number"));
        }
        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            warn!(
                index,
                timestamp = bar.timestamp,
                previous = bars[index - 1].timestamp,
                "rejecting bar with non-increasing timestamp"
            );
            return Err(DataError::invalid_input(
                index,
                format!(
                    "timestamp {} is not after previous timestamp {}",
                    bar.timestamp,
                    bars[index - 1].timestamp
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64, high: f64, low: f64) -> PriceBar {
        PriceBar::new(ts, low, high, low, high)
    }

    #[test]
    fn validate_accepts_empty_and_ordered_input() {
        assert!(validate_bars(&[]).is_ok());
        assert!(validate_bars(&[bar(1, 10.0, 9.0), bar(2, 11.0, 10.0)]).is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_timestamp() {
        let err = validate_bars(&[bar(1, 10.0, 9.0), bar(1, 11.0, 10.0)]).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(matches!(err, DataError::InvalidInput { index: 1, .. }));
    }

    #[test]
    fn validate_rejects_nan_price() {
        let err = validate_bars(&[bar(1, f64::NAN, 9.0)]).unwrap_err();
        assert!(matches!(err, DataError::InvalidInput { index: 0, .. }));
    }

    #[test]
    fn validate_keeps_inverted_range_as_degenerate_input() {
        assert!(validate_bars(&[bar(1, 9.0, 10.0)]).is_ok());
    }

    #[test]
    fn containment_is_inclusive_on_both_edges() {
        let outer = MergedBar::from_price_bar(&bar(1, 10.0, 5.0));
        let inner = MergedBar::from_price_bar(&bar(2, 10.0, 6.0));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }
}
