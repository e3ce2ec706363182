use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constant::{Const, DataError};

/// 包含处理时的走势种子规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendSeeding {
    /// 不主动标记走势，包含处理与既有图表输出逐根一致。
    #[default]
    Literal,
    /// 高低点同时抬高记为向上，同时降低记为向下。
    Directional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeMode {
    #[default]
    Greedy,
    Optimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub trend_seeding: TrendSeeding,
    pub stroke_mode: StrokeMode,
    pub min_stroke_bars: usize,
    pub optimal_min_gap: usize,
    pub optimal_lookback: usize,
    pub min_pivot_span: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfigPatch {
    pub trend_seeding: Option<TrendSeeding>,
    pub stroke_mode: Option<StrokeMode>,
    pub min_stroke_bars: Option<usize>,
    pub optimal_min_gap: Option<usize>,
    pub optimal_lookback: Option<usize>,
    pub min_pivot_span: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trend_seeding: TrendSeeding::Literal,
            stroke_mode: StrokeMode::Greedy,
            min_stroke_bars: Const::MIN_STROKE_BARS,
            optimal_min_gap: Const::OPTIMAL_MIN_GAP,
            optimal_lookback: Const::OPTIMAL_LOOKBACK,
            min_pivot_span: Const::MIN_PIVOT_SPAN,
        }
    }
}

impl EngineConfig {
    pub fn apply_patch(mut self, patch: EngineConfigPatch) -> Self {
        if let Some(v) = patch.trend_seeding {
            self.trend_seeding = v;
        }
        if let Some(v) = patch.stroke_mode {
            self.stroke_mode = v;
        }
        if let Some(v) = patch.min_stroke_bars {
            self.min_stroke_bars = v;
        }
        if let Some(v) = patch.optimal_min_gap {
            self.optimal_min_gap = v;
        }
        if let Some(v) = patch.optimal_lookback {
            self.optimal_lookback = v;
        }
        if let Some(v) = patch.min_pivot_span {
            self.min_pivot_span = v;
        }
        self
    }

    pub fn validate(&self) -> Result<(), DataError> {
        // 端点本身占两根 K 线，低于 2 时一笔退化为单点
        if self.min_stroke_bars < 2 {
            return Err(DataError::InvalidConfig(format!(
                "min_stroke_bars must be at least 2, got {}",
                self.min_stroke_bars
            )));
        }
        if self.optimal_min_gap == 0 {
            return Err(DataError::InvalidConfig(
                "optimal_min_gap must be positive".to_string(),
            ));
        }
        if self.optimal_lookback == 0 {
            return Err(DataError::InvalidConfig(
                "optimal_lookback must be positive".to_string(),
            ));
        }
        // 首尾两笔同向，中间至少夹一组反向笔
        if self.min_pivot_span < 2 || self.min_pivot_span % 2 != 0 {
            return Err(DataError::InvalidConfig(format!(
                "min_pivot_span must be an even number >= 2, got {}",
                self.min_pivot_span
            )));
        }
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, DataError> {
        let patch: EngineConfigPatch = serde_yaml::from_str(yaml)?;
        Self::from_patch(patch)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        let patch: EngineConfigPatch = serde_json::from_str(json)?;
        Self::from_patch(patch)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|x| x.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Err(DataError::InvalidConfig(format!(
                "unsupported config file format: {}",
                path.display()
            ))),
        }
    }

    fn from_patch(patch: EngineConfigPatch) -> Result<Self, DataError> {
        let config = Self::default().apply_patch(patch);
        config.validate()?;
        Ok(config)
    }
}
