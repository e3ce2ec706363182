use std::fs;
use std::path::PathBuf;

use chanlun::{ChanlunEngine, EngineConfig, init_logging, load_price_bars};
use replay::build_payload;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "usage: cargo run -p replay --bin export_structures -- <csv_path> <symbol> [output_json] [config_yaml]"
        );
        std::process::exit(2);
    }

    init_logging();

    let csv_path = PathBuf::from(&args[1]);
    let symbol = args[2].clone();
    let output = if args.len() >= 4 {
        PathBuf::from(&args[3])
    } else {
        PathBuf::from(format!("replay/out/{}-structures.json", symbol))
    };
    let config = if args.len() >= 5 {
        EngineConfig::from_file(&args[4])?
    } else {
        EngineConfig::default()
    };

    let bars = load_price_bars(&csv_path)?;
    let engine = ChanlunEngine::with_config(config)?;
    let snapshot = engine.analyze(&bars)?;
    let payload = build_payload(symbol, &bars, &snapshot);

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, serde_json::to_vec_pretty(&payload)?)?;

    info!(
        bars = bars.len(),
        fractals = snapshot.fractal_count(),
        strokes = snapshot.strokes.len(),
        pivots = snapshot.pivots.len(),
        output = %output.display(),
        "exported structures"
    );
    Ok(())
}
