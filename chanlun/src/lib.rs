pub mod bar;
pub mod cbar;
pub mod config;
pub mod constant;
pub mod engine;
pub mod frame;
pub mod loader;
pub mod logging;
pub mod pivot;
pub mod stroke;

pub use bar::{MergedBar, PriceBar, validate_bars};
pub use cbar::merge_bars;
pub use config::{EngineConfig, EngineConfigPatch, StrokeMode, TrendSeeding};
pub use constant::{Const, DataError, Direction, FractalType};
pub use engine::{AnalysisSnapshot, ChanlunEngine};
pub use frame::{merged_bars_frame, pivots_frame, strokes_frame};
pub use loader::{load_price_bars, read_price_bars};
pub use logging::{init_logging, init_logging_with_level};
pub use pivot::{Pivot, pivots_dp};
pub use stroke::{Stroke, StrokePoint, strokes_greedy, strokes_optimal, validate_strokes};

/// 合并 K 线并标记分型，输出与输入按下标对齐。
pub fn detect_fractals(bars: &[PriceBar]) -> Result<Vec<MergedBar>, DataError> {
    ChanlunEngine::new().detect_fractals(bars)
}

/// 贪心画笔，图表默认使用的路径。
pub fn build_strokes(bars: &[PriceBar]) -> Result<Vec<Stroke>, DataError> {
    ChanlunEngine::new().build_strokes(bars)
}

/// 动态规划画笔。
pub fn build_strokes_optimal(bars: &[PriceBar]) -> Result<Vec<Stroke>, DataError> {
    ChanlunEngine::new().build_strokes_optimal(bars)
}

/// 中枢按回溯顺序返回，即时间倒序。
pub fn build_pivots(strokes: &[Stroke]) -> Result<Vec<Pivot>, DataError> {
    ChanlunEngine::new().build_pivots(strokes)
}
