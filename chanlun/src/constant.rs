use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractalType {
    Top,
    Bottom,
}

impl FractalType {
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    /// 以该分型为终点的笔的方向。
    pub fn stroke_direction(self) -> Direction {
        match self {
            Self::Top => Direction::Up,
            Self::Bottom => Direction::Down,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    pub(crate) fn as_i8(self) -> i8 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

pub struct Const;

impl Const {
    /// 一笔两端（含端点）之间至少需要的非包含 K 线数。
    pub const MIN_STROKE_BARS: usize = 4;
    /// 最优笔算法中两个分型的最小下标距离。
    pub const OPTIMAL_MIN_GAP: usize = 5;
    /// 最优笔算法向前枚举的分型个数。
    pub const OPTIMAL_LOOKBACK: usize = 20;
    /// 中枢首尾两笔的最小下标跨度。
    pub const MIN_PIVOT_SPAN: usize = 4;
}

#[derive(Debug)]
pub enum DataError {
    InvalidInput { index: usize, reason: String },
    InvalidDatetime(String),
    InvalidConfig(String),
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    Polars(polars::error::PolarsError),
}

impl DataError {
    pub(crate) fn invalid_input(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            index,
            reason: reason.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

impl Display for DataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { index, reason } => {
                write!(f, "invalid input at index {index}: {reason}")
            }
            Self::InvalidDatetime(v) => write!(f, "invalid datetime: {v}"),
            Self::InvalidConfig(v) => write!(f, "invalid config: {v}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
            Self::Yaml(e) => write!(f, "yaml error: {e}"),
            Self::Polars(e) => write!(f, "polars error: {e}"),
        }
    }
}

impl std::error::Error for DataError {}

impl From<std::io::Error> for DataError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for DataError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<serde_json::Error> for DataError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<serde_yaml::Error> for DataError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

impl From<polars::error::PolarsError> for DataError {
    fn from(value: polars::error::PolarsError) -> Self {
        Self::Polars(value)
    }
}
