//! Screen capture and input for the game client.
//!
//! This module provides:
//! - Window discovery and focusing (`focus_game_window`)
//! - Screenshot capture of a screen region (`capture_region`, `capture_region_to_file`)
//! - Cursor polling and selection hotkeys for choosing a region
//! - The drag gesture used to scroll the list
//! - `ScreenPageSource`, which ties these together for the scroll loop
//!
//! Only Windows is supported; other platforms get stubs that report the
//! platform as unsupported so the rest of the tool still builds.

mod adapter;

#[cfg(windows)]
mod hotkeys;
#[cfg(windows)]
mod input;
#[cfg(windows)]
mod screenshot;
#[cfg(windows)]
mod window;

#[cfg(not(windows))]
mod unsupported;

pub use adapter::ScreenPageSource;

#[cfg(windows)]
pub use hotkeys::SelectionHotkeys;
#[cfg(windows)]
pub use input::{cursor_position, drag_vertical};
#[cfg(windows)]
pub use screenshot::{capture_region, capture_region_to_file};
#[cfg(windows)]
pub use window::focus_game_window;

#[cfg(not(windows))]
pub use unsupported::{
    capture_region, capture_region_to_file, cursor_position, drag_vertical, focus_game_window,
    SelectionHotkeys,
};

/// Hotkey pressed during region selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKey {
    /// F2: the cursor marks the top-left corner
    TopLeft,
    /// F3: the cursor marks the bottom-right corner
    BottomRight,
    /// Esc: give up without a region
    Cancel,
}
