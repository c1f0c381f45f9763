//! Font file I/O.

use std::{
    fs::{create_dir_all, read, write},
    path::Path,
};

use anyhow::{Context, Result};

pub fn read_font(path: &Path) -> Result<Vec<u8>> {
    read(path).with_context(|| format!("Failed to read font: {}", path.display()))
}

/// Write font data, creating the parent directory if needed.
pub fn write_font(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    write(path, data).with_context(|| format!("Failed to write font: {}", path.display()))
}
