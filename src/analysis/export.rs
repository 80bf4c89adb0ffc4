//! Writes `fan_stats.json`.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use super::gains::ClubStats;

/// Writes the club statistics as pretty JSON, replacing `path` in one step.
///
/// A reader of the previous report never sees a half-written file.
pub fn write_stats(stats: &ClubStats, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

    let temp = NamedTempFile::new_in(dir).context("Failed to create temporary stats file")?;
    let mut writer = BufWriter::new(temp);
    serde_json::to_writer_pretty(&mut writer, stats).context("Failed to serialize fan statistics")?;
    writer.write_all(b"\n")?;
    let temp = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush fan statistics: {}", e.error()))?;

    temp.persist(path)
        .map_err(|e| anyhow!("Failed to replace {}: {}", path.display(), e.error))?;
    Ok(())
}
