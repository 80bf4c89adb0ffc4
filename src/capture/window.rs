//! Window discovery for the game client.

use anyhow::{anyhow, Result};

use windows::Win32::Foundation::{BOOL, HWND, LPARAM, TRUE};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowTextLengthW, GetWindowTextW, IsIconic, IsWindowVisible,
    SetForegroundWindow, ShowWindow, SW_RESTORE,
};

/// Finds the first visible window whose title contains `title`.
fn find_window_by_title(title: &str) -> Result<(HWND, String)> {
    struct EnumData<'a> {
        needle: &'a str,
        found: Option<(HWND, String)>,
    }

    unsafe extern "system" fn enum_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
        unsafe {
            let data = &mut *(lparam.0 as *mut EnumData);

            if !IsWindowVisible(hwnd).as_bool() {
                return TRUE;
            }

            let title_len = GetWindowTextLengthW(hwnd);
            if title_len <= 0 {
                return TRUE;
            }

            let mut title_buf: Vec<u16> = vec![0; (title_len + 1) as usize];
            let copied = GetWindowTextW(hwnd, &mut title_buf);
            let window_title = String::from_utf16_lossy(&title_buf[..copied.max(0) as usize]);

            if window_title.contains(data.needle) {
                data.found = Some((hwnd, window_title));
                return BOOL(0); // Stop enumeration
            }

            TRUE
        }
    }

    let mut data = EnumData {
        needle: title,
        found: None,
    };
    unsafe {
        // EnumWindows reports an error when the callback stops it early,
        // which is the success case here.
        let _ = EnumWindows(Some(enum_callback), LPARAM(&mut data as *mut _ as isize));
    }

    data.found
        .ok_or_else(|| anyhow!("Couldn't find '{}' window. Make sure it's open.", title))
}

/// Brings the game window to the foreground, restoring it if minimized.
pub fn focus_game_window(title: &str) -> Result<()> {
    let (hwnd, window_title) = find_window_by_title(title)?;

    unsafe {
        if IsIconic(hwnd).as_bool() {
            let _ = ShowWindow(hwnd, SW_RESTORE);
        }
        if !SetForegroundWindow(hwnd).as_bool() {
            crate::log(&format!(
                "⚠️ Could not bring '{}' to the foreground",
                window_title
            ));
        }
    }

    crate::log(&format!("✅ Focused '{}' window.", window_title));
    Ok(())
}
