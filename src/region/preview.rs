//! Preview image of a selected region.
//!
//! A screenshot of the region plus a margin is taken, the region outline is
//! drawn on it and the image is opened in the default viewer, so the operator
//! can check the rectangle before accepting it.

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::Region;
use crate::capture::capture_region;
use crate::paths::get_captures_dir;

pub const COLOR_SELECTION: Rgba<u8> = Rgba([0, 255, 0, 255]); // Green

/// Screen pixels captured around the region.
pub const PREVIEW_MARGIN: i32 = 40;

const OUTLINE_THICKNESS: u32 = 2;
const PREVIEW_FILE: &str = "region_preview.png";

/// Screen area captured for the preview: the region grown by `margin` on
/// every side.
pub fn preview_area(region: &Region, margin: i32) -> Region {
    let margin = margin.max(0);
    Region {
        x: region.x.saturating_sub(margin),
        y: region.y.saturating_sub(margin),
        width: region.width.saturating_add(margin.saturating_mul(2)),
        height: region.height.saturating_add(margin.saturating_mul(2)),
    }
}

/// Outlines the selected region on a capture of `preview_area(region, margin)`.
pub fn render_selection(capture: &RgbaImage, region: &Region, margin: i32) -> RgbaImage {
    let mut img = capture.clone();
    let margin = margin.max(0) as u32;
    draw_outline(
        &mut img,
        (margin, margin),
        (region.width as u32, region.height as u32),
        COLOR_SELECTION,
        OUTLINE_THICKNESS,
    );
    img
}

/// Draws the border of a `size` rectangle at `origin`, clipped to the image.
pub fn draw_outline(
    img: &mut RgbaImage,
    origin: (u32, u32),
    size: (u32, u32),
    color: Rgba<u8>,
    thickness: u32,
) {
    let (x0, y0) = origin;
    let (w, h) = size;
    if w == 0 || h == 0 {
        return;
    }
    let x_end = x0.saturating_add(w).min(img.width());
    let y_end = y0.saturating_add(h).min(img.height());

    for y in y0..y_end {
        let from_top = y - y0;
        let from_bottom = h - 1 - from_top;
        let horizontal_edge = from_top < thickness || from_bottom < thickness;
        for x in x0..x_end {
            let from_left = x - x0;
            let from_right = w - 1 - from_left;
            if horizontal_edge || from_left < thickness || from_right < thickness {
                img.put_pixel(x, y, color);
            }
        }
    }
}

/// Captures the screen around `region`, outlines it and opens the result.
///
/// Returns the path of the saved preview image.
pub fn show_selection_preview(region: &Region) -> Result<PathBuf> {
    let capture = capture_region(&preview_area(region, PREVIEW_MARGIN))?;
    let img = render_selection(&capture, region, PREVIEW_MARGIN);

    let path = get_captures_dir().join(PREVIEW_FILE);
    img.save(&path)
        .with_context(|| format!("Failed to save preview to {}", path.display()))?;
    open_in_viewer(&path)?;
    Ok(path)
}

fn open_in_viewer(path: &Path) -> Result<()> {
    Command::new("cmd")
        .arg("/C")
        .arg("start")
        .arg("")
        .arg(path)
        .spawn()
        .context("Failed to open the preview image")?;
    Ok(())
}
