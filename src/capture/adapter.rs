//! Capture adapter used by the scroll loop.

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

use super::{capture_region_to_file, drag_vertical};
use crate::region::Region;
use crate::tracker::config::ScrollConfig;
use crate::tracker::convergence::PageSource;

/// Captures pages of the club list from a fixed screen region.
///
/// Every capture overwrites the same image file; each page is read before
/// the next one is taken.
pub struct ScreenPageSource {
    region: Region,
    capture_path: PathBuf,
    scroll: ScrollConfig,
}

impl ScreenPageSource {
    pub fn new(region: Region, capture_path: PathBuf, scroll: ScrollConfig) -> Self {
        Self {
            region,
            capture_path,
            scroll,
        }
    }

    fn capture(&self) -> Result<PathBuf> {
        capture_region_to_file(&self.region, &self.capture_path)?;
        Ok(self.capture_path.clone())
    }
}

impl PageSource for ScreenPageSource {
    fn capture_first(&mut self) -> Result<PathBuf> {
        let path = self.capture()?;
        crate::log(&format!("✅ Saved screenshot as '{}'", path.display()));
        crate::log(&format!("🧭 Region coordinates: {}", self.region));
        Ok(path)
    }

    fn scroll_and_capture(&mut self) -> Result<PathBuf> {
        let (start, end_y) = drag_path(&self.region, &self.scroll);

        crate::log("⬆️ Scrolling");
        drag_vertical(
            start,
            end_y,
            Duration::from_millis(self.scroll.approach_ms),
            Duration::from_millis(self.scroll.drag_ms),
            Duration::from_millis(self.scroll.hold_ms),
        )?;
        std::thread::sleep(Duration::from_millis(self.scroll.settle_ms));

        self.capture()
    }
}

/// Computes where the scroll drag starts and the y coordinate it ends at.
///
/// The anchor is given as a fraction of the region size, so it may lie
/// outside the region (the default grabs the list to the right of the
/// captured names).
pub fn drag_path(region: &Region, scroll: &ScrollConfig) -> ((i32, i32), i32) {
    let start_x = (region.x as f32 + scroll.anchor_x_factor * region.width as f32) as i32;
    let start_y = (region.y as f32 + scroll.anchor_y_factor * region.height as f32) as i32;
    let end_y = start_y - scroll.drag_distance;
    ((start_x, start_y), end_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_path_defaults() {
        let region = Region::new(100, 200, 400, 800).unwrap();
        let (start, end_y) = drag_path(&region, &ScrollConfig::default());

        // x + 1.5w, y + 0.75h, then 233px upwards
        assert_eq!(start, (700, 800));
        assert_eq!(end_y, 567);
    }

    #[test]
    fn test_drag_path_custom_distance() {
        let region = Region::new(0, 0, 100, 100).unwrap();
        let scroll = ScrollConfig {
            drag_distance: 50,
            anchor_x_factor: 0.5,
            anchor_y_factor: 0.5,
            ..ScrollConfig::default()
        };
        assert_eq!(drag_path(&region, &scroll), ((50, 50), 0));
    }
}
