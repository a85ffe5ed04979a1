//! Writes the C header for the FFI surface.
//!
//! Run with:
//! `cargo run -p soroban-vision-ffi --features generate-header --bin generate-ffi-header [OUT]`

use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let crate_dir = env!("CARGO_MANIFEST_DIR");
    let out = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(crate_dir).join("include/soroban_vision.h"));

    cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("SOROBAN_VISION_H")
        .with_cpp_compat(true)
        .generate()?
        .write_to_file(&out);

    println!("wrote {}", out.display());
    Ok(())
}
