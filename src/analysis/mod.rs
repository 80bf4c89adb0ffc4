//! Fan report generation.
//!
//! This module provides:
//! - Fan gain statistics per player and for the club (`gains`)
//! - A line chart of fan counts over time (`charts`)
//! - JSON export of the statistics (`export`)

pub mod charts;
pub mod export;
pub mod gains;

pub use gains::ClubStats;

use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::paths::resolve;
use crate::table::HistoricalTable;
use crate::tracker::config::TrackerConfig;

/// Runs the report pipeline: load the table, compute gains, write the
/// statistics JSON and the history chart.
///
/// Returns (chart_path, json_path).
pub fn generate_report(config: &TrackerConfig) -> Result<(PathBuf, PathBuf)> {
    let table_path = resolve(&config.table_file);
    let chart_path = resolve(&config.report.chart_file);
    let json_path = resolve(&config.report.stats_file);

    let table = HistoricalTable::load(&table_path)?;
    if table.is_empty() || table.dates().is_empty() {
        return Err(anyhow!(
            "No fan data in '{}'. Run a capture first.",
            table_path.display()
        ));
    }

    crate::log(&format!(
        "Loaded {} players over {} dates",
        table.len(),
        table.dates().len()
    ));

    let stats = ClubStats::from_table(&table);

    export::write_stats(&stats, &json_path)?;
    crate::log(&format!("Fan statistics saved: {}", json_path.display()));

    charts::generate_history_chart(
        &table,
        &stats,
        config.report.top_players,
        &chart_path,
        (config.report.chart_width, config.report.chart_height),
    )?;
    crate::log(&format!("Fan history chart saved: {}", chart_path.display()));

    Ok((chart_path, json_path))
}
