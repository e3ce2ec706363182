use std::path::PathBuf;

use chanlun::{ChanlunEngine, EngineConfig, StrokeMode, init_logging, load_price_bars};
use replay::audit;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "usage: cargo run -q -p replay --bin audit_structures -- <csv_path> [greedy|optimal] [max_rows]"
        );
        std::process::exit(2);
    }

    init_logging();

    let csv_path = PathBuf::from(&args[1]);
    let stroke_mode = match args.get(2).map(|x| x.to_ascii_lowercase()) {
        None => StrokeMode::Greedy,
        Some(raw) => match raw.as_str() {
            "greedy" => StrokeMode::Greedy,
            "optimal" => StrokeMode::Optimal,
            _ => return Err(format!("unsupported stroke mode: {raw}").into()),
        },
    };
    let max_rows = if args.len() >= 4 {
        args[3].parse::<usize>()?
    } else {
        usize::MAX
    };

    let mut bars = load_price_bars(&csv_path)?;
    bars.truncate(max_rows);

    let engine = ChanlunEngine::with_config(EngineConfig {
        stroke_mode,
        ..EngineConfig::default()
    })?;
    let snapshot = engine.analyze(&bars)?;
    let violations = audit(&snapshot);

    info!(
        bars = bars.len(),
        enclosed = snapshot.merged.iter().filter(|x| x.enclosed).count(),
        fractals = snapshot.fractal_count(),
        strokes = snapshot.strokes.len(),
        pivots = snapshot.pivots.len(),
        "audit finished"
    );

    if violations.is_empty() {
        println!("AUDIT result: PASS (no structural violations found)");
    } else {
        println!("AUDIT result: FAIL violations={}", violations.len());
        for item in violations.iter().take(30) {
            println!("- {item}");
        }
        if violations.len() > 30 {
            println!("- ... {} more", violations.len() - 30);
        }
    }

    Ok(())
}
