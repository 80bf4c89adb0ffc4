//! Persistence of the selected region between runs.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::Region;
use crate::log;

/// Loads the previously saved region, if any.
///
/// A missing file means "nothing saved". An unreadable or corrupt file is
/// reported and treated the same way, so the caller falls back to selection.
pub fn load_saved_region(path: &Path) -> Option<Region> {
    if !path.exists() {
        return None;
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            log(&format!("⚠️ Failed to load saved region: {}", e));
            return None;
        }
    };

    match serde_json::from_str::<Region>(&contents) {
        Ok(region) => Some(region),
        Err(e) => {
            log(&format!("⚠️ Failed to load saved region: {}", e));
            None
        }
    }
}

/// Writes the region to disk, replacing any earlier selection.
pub fn save_region(path: &Path, region: &Region) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create region directory")?;
        }
    }
    let json = serde_json::to_string(region).context("Failed to serialize region")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write region file: {}", path.display()))?;
    Ok(())
}
