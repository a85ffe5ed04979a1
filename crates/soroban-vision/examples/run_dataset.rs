//! Runs the extraction pipeline over every image in a directory.
//!
//! Usage:
//! `cargo run -p soroban-vision --features dataset --example run_dataset -- <dir>`

use std::env;
use std::path::PathBuf;

use soroban_vision::{load_color_image, SorobanVision};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("testdata"));

    let mut entries: Vec<PathBuf> = std::fs::read_dir(&dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("png" | "jpg" | "jpeg" | "bmp")
            )
        })
        .collect();
    entries.sort();

    let mut vision = SorobanVision::default();
    let mut processed = 0usize;
    let mut detected = 0usize;

    for path in &entries {
        let image = match load_color_image(path) {
            Ok(image) => image,
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                continue;
            }
        };
        let result = vision.process_image(&image.view());
        processed += 1;
        if result.success {
            detected += 1;
            println!(
                "{}: {} lanes, {} cells, {:.1} ms",
                path.display(),
                result.frame.lane_count,
                result.total_cells,
                result.elapsed_ms
            );
        } else {
            let reason = result
                .error
                .as_ref()
                .map_or_else(|| "unknown".to_string(), |e| e.to_string());
            println!("{}: no extraction ({reason})", path.display());
        }
    }

    println!(
        "{detected}/{processed} frames extracted from {}",
        dir.display()
    );
    Ok(())
}
