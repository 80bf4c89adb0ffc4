//! Stand-ins for platforms without capture support.

use anyhow::{anyhow, Result};
use image::RgbaImage;
use std::path::Path;
use std::time::Duration;

use super::SelectionKey;
use crate::region::Region;

fn unsupported() -> anyhow::Error {
    anyhow!("Screen capture and input are only supported on Windows")
}

pub fn focus_game_window(title: &str) -> Result<()> {
    Err(anyhow!("Couldn't find '{}' window: {}", title, unsupported()))
}

pub fn capture_region(_region: &Region) -> Result<RgbaImage> {
    Err(unsupported())
}

pub fn capture_region_to_file(_region: &Region, _path: &Path) -> Result<()> {
    Err(unsupported())
}

pub fn cursor_position() -> Result<(i32, i32)> {
    Err(unsupported())
}

pub fn drag_vertical(
    _start: (i32, i32),
    _end_y: i32,
    _approach: Duration,
    _drag: Duration,
    _hold: Duration,
) -> Result<()> {
    Err(unsupported())
}

/// Never constructed: registration always fails here.
pub struct SelectionHotkeys {
    _private: (),
}

impl SelectionHotkeys {
    pub fn register() -> Result<Self> {
        Err(unsupported())
    }

    pub fn poll(&self) -> Option<SelectionKey> {
        None
    }
}
