use serde::Serialize;
use tracing::debug;

use crate::bar::{MergedBar, PriceBar, validate_bars};
use crate::cbar::merge_bars;
use crate::config::{EngineConfig, StrokeMode};
use crate::constant::DataError;
use crate::pivot::{Pivot, pivots_dp};
use crate::stroke::{Stroke, strokes_greedy, strokes_optimal, validate_strokes};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSnapshot {
    pub merged: Vec<MergedBar>,
    pub strokes: Vec<Stroke>,
    pub pivots: Vec<Pivot>,
}

impl AnalysisSnapshot {
    pub fn fractal_count(&self) -> usize {
        self.merged.iter().filter(|x| x.fractal.is_some()).count()
    }
}

/// 无状态分析引擎，每次调用都从完整输入重新计算。
#[derive(Debug, Clone, Default)]
pub struct ChanlunEngine {
    config: EngineConfig,
}

impl ChanlunEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, DataError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn detect_fractals(&self, bars: &[PriceBar]) -> Result<Vec<MergedBar>, DataError> {
        validate_bars(bars)?;
        let merged = merge_bars(bars, self.config.trend_seeding);
        debug!(
            bars = bars.len(),
            enclosed = merged.iter().filter(|x| x.enclosed).count(),
            fractals = merged.iter().filter(|x| x.fractal.is_some()).count(),
            "merged bars"
        );
        Ok(merged)
    }

    pub fn build_strokes(&self, bars: &[PriceBar]) -> Result<Vec<Stroke>, DataError> {
        let merged = self.detect_fractals(bars)?;
        Ok(self.greedy(&merged))
    }

    pub fn build_strokes_optimal(&self, bars: &[PriceBar]) -> Result<Vec<Stroke>, DataError> {
        let merged = self.detect_fractals(bars)?;
        Ok(self.optimal(&merged))
    }

    pub fn build_pivots(&self, strokes: &[Stroke]) -> Result<Vec<Pivot>, DataError> {
        validate_strokes(strokes)?;
        let pivots = pivots_dp(strokes, self.config.min_pivot_span);
        debug!(strokes = strokes.len(), pivots = pivots.len(), "built pivots");
        Ok(pivots)
    }

    /// 合并、画笔、中枢一次完成，笔的算法由 `stroke_mode` 决定。
    pub fn analyze(&self, bars: &[PriceBar]) -> Result<AnalysisSnapshot, DataError> {
        let merged = self.detect_fractals(bars)?;
        let strokes = match self.config.stroke_mode {
            StrokeMode::Greedy => self.greedy(&merged),
            StrokeMode::Optimal => self.optimal(&merged),
        };
        let pivots = self.build_pivots(&strokes)?;
        Ok(AnalysisSnapshot {
            merged,
            strokes,
            pivots,
        })
    }

    fn greedy(&self, merged: &[MergedBar]) -> Vec<Stroke> {
        let strokes = strokes_greedy(merged, self.config.min_stroke_bars);
        debug!(strokes = strokes.len(), "built strokes (greedy)");
        strokes
    }

    fn optimal(&self, merged: &[MergedBar]) -> Vec<Stroke> {
        let strokes = strokes_optimal(
            merged,
            self.config.optimal_min_gap,
            self.config.optimal_lookback,
        );
        debug!(strokes = strokes.len(), "built strokes (optimal)");
        strokes
    }
}
