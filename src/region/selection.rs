//! Interactive region selection.
//!
//! The operator hovers over the top-left corner of the member list and
//! presses F2, then hovers over the bottom-right corner and presses F3. No
//! mouse button is involved, so the game list is neither scrolled nor
//! clicked. The corners are collected in a `SelectionState` owned by the
//! selection loop.

use anyhow::{anyhow, Result};
use std::io;
use std::time::Duration;

use super::preview::show_selection_preview;
use super::Region;
use crate::capture::{cursor_position, SelectionHotkeys, SelectionKey};
use crate::log;
use crate::tracker::prompt::confirm_selection;

/// Polling interval for hotkey messages while selecting.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Corner capture state for one selection attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    /// Top-left corner waiting for its bottom-right partner.
    pending_top_left: Option<(i32, i32)>,
    /// Region completed by the last valid bottom-right corner.
    region: Option<Region>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// F2: records the top-left corner, replacing any earlier one.
    pub fn mark_top_left(&mut self, point: (i32, i32)) {
        self.pending_top_left = Some(point);
        self.region = None;
    }

    /// F3: completes the region at `point`.
    ///
    /// A corner that is not below and to the right of the top-left clears
    /// the pending top-left, so both corners have to be recorded again.
    pub fn mark_bottom_right(&mut self, point: (i32, i32)) -> Result<Region> {
        let (left, top) = self
            .pending_top_left
            .ok_or_else(|| anyhow!("Record the top-left corner (F2) first."))?;

        match Region::new(left, top, point.0 - left, point.1 - top) {
            Ok(region) => {
                self.pending_top_left = None;
                self.region = Some(region);
                Ok(region)
            }
            Err(_) => {
                self.pending_top_left = None;
                Err(anyhow!(
                    "Bottom-right must be below and to the right of top-left."
                ))
            }
        }
    }

    pub fn pending_top_left(&self) -> Option<(i32, i32)> {
        self.pending_top_left
    }

    /// Region from the last completed corner pair.
    pub fn region(&self) -> Option<Region> {
        self.region
    }
}

/// Lets the operator mark a region with hotkeys, shows it, then asks for
/// confirmation.
///
/// Returns `Ok(None)` when the operator cancels with Esc.
pub fn select_region() -> Result<Option<Region>> {
    loop {
        let Some(region) = capture_corners(SelectionState::new())? else {
            log("❌ No region selected.");
            return Ok(None);
        };

        match show_selection_preview(&region) {
            Ok(path) => log(&format!("Preview of {} saved to {}", region, path.display())),
            Err(e) => log(&format!("⚠️ Failed to show preview: {:#}", e)),
        }

        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        if confirm_selection(&mut input, &mut output, &region)? {
            return Ok(Some(region));
        }
        log("Redoing selection.");
    }
}

/// Waits for F2/F3 until a valid region is marked, or Esc.
///
/// The hotkeys are only held for the duration of this call, so they are
/// free again while the operator answers the confirmation prompt.
fn capture_corners(mut state: SelectionState) -> Result<Option<Region>> {
    let hotkeys = SelectionHotkeys::register()?;
    log("Hover over the TOP-LEFT corner of the member list and press F2. Esc cancels.");

    loop {
        let Some(key) = hotkeys.poll() else {
            std::thread::sleep(POLL_INTERVAL);
            continue;
        };

        match key {
            SelectionKey::TopLeft => {
                let point = cursor_position()?;
                state.mark_top_left(point);
                log(&format!("Top-left recorded: ({}, {})", point.0, point.1));
                log("Now hover over the BOTTOM-RIGHT corner and press F3.");
            }
            SelectionKey::BottomRight => match state.mark_bottom_right(cursor_position()?) {
                Ok(region) => {
                    log(&format!("Region recorded: {}", region));
                    return Ok(Some(region));
                }
                Err(e) => {
                    log(&format!("Error: {}", e));
                    log("Press F2 on the top-left corner, then F3 on the bottom-right.");
                }
            },
            SelectionKey::Cancel => return Ok(None),
        }
    }
}
