//! Tracking run: window focus, region, scroll loop, table update.

use anyhow::Result;
use chrono::Local;
use std::io;
use std::path::Path;
use std::time::Duration;

use super::config::TrackerConfig;
use super::convergence::{run_scroll_loop, ConvergenceSettings, StopReason};
use super::prompt::confirm_reuse;
use crate::capture::{focus_game_window, ScreenPageSource};
use crate::log;
use crate::ocr::{ensure_tesseract, OcrPageReader, PairExtractor, TesseractEngine};
use crate::paths::{get_captures_dir, resolve};
use crate::region::{load_saved_region, save_region, select_region, Region};
use crate::table::update_history;

/// Runs one full capture of the club list and records it under today's date.
///
/// A missing game window aborts the run. Capture problems end the scroll loop
/// early; whatever was read up to that point is still recorded.
pub fn run_tracker(config: &TrackerConfig) -> Result<()> {
    focus_game_window(&config.window_title)?;
    std::thread::sleep(Duration::from_millis(config.focus_delay_ms));

    let region_path = resolve(&config.region_file);
    let Some(region) = choose_region(&region_path)? else {
        log("❌ No region selected. Nothing to capture.");
        return Ok(());
    };

    let tesseract = ensure_tesseract()?;
    let engine = TesseractEngine::new(tesseract, config.ocr_scale, config.tesseract_psm);
    let reader = OcrPageReader::new(engine, PairExtractor::from_config(config)?);
    let mut source = ScreenPageSource::new(
        region,
        get_captures_dir().join(&config.capture_file),
        config.scroll.clone(),
    );
    let settings = ConvergenceSettings {
        duplicate_limit: config.duplicate_limit,
        max_pages: config.max_pages,
    };

    let outcome = run_scroll_loop(&mut source, &reader, settings);
    log(&format!(
        "Scroll loop finished after {} page(s): {}",
        outcome.pages, outcome.stop
    ));
    if outcome.stop != StopReason::Converged {
        log("⚠️ The list may be incomplete.");
    }

    if outcome.all_pairs.is_empty() {
        log("❌ No name/fan pairs were read. The table was not changed.");
        return Ok(());
    }

    let date = Local::now().format("%Y-%m-%d").to_string();
    let table_path = resolve(&config.table_file);
    let summary = update_history(&table_path, &date, &outcome.all_pairs)?;
    log(&format!(
        "✅ Updated '{}' under {}.",
        table_path.display(),
        summary.date
    ));
    if !summary.new_column {
        log(&format!(
            "{} already had a column; {} value(s) changed.",
            summary.date, summary.updated_players
        ));
    }
    log(&format!(
        "{} player(s) in the table, {} new.",
        summary.total_players, summary.added_players
    ));

    Ok(())
}

/// Selects a new region and saves it, without capturing anything.
pub fn select_only(config: &TrackerConfig) -> Result<()> {
    let region_path = resolve(&config.region_file);
    match select_region()? {
        Some(region) => store_region(&region_path, &region),
        None => log("❌ No region selected."),
    }
    Ok(())
}

/// Offers the saved region for reuse, otherwise asks for a new selection.
fn choose_region(region_path: &Path) -> Result<Option<Region>> {
    if let Some(saved) = load_saved_region(region_path) {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        if confirm_reuse(&mut input, &mut output, &saved)? {
            log(&format!("Using saved region {}", saved));
            return Ok(Some(saved));
        }
    }

    let selected = select_region()?;
    if let Some(region) = &selected {
        store_region(region_path, region);
    }
    Ok(selected)
}

/// Saves the region; a failure only costs the reuse offer next time.
fn store_region(region_path: &Path, region: &Region) {
    match save_region(region_path, region) {
        Ok(()) => log(&format!(
            "💾 Saved region {} to '{}'",
            region,
            region_path.display()
        )),
        Err(e) => log(&format!("⚠️ Failed to save region: {}", e)),
    }
}
