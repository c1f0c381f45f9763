//! Locate candidate font files in the working directories.

use std::{
    fs::read_dir,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

/// Font files directly inside `dir`, sorted by path. Subdirectories are
/// not searched.
pub fn find_fonts(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut fonts: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_font_extension(path))
        .collect();
    fonts.sort();
    Ok(fonts)
}

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FONT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Extension for the output file, taken from the destination font so the
/// output format matches what was transformed.
pub fn output_extension(destination: &Path) -> String {
    destination
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "ttf".to_string())
}
