//! Mouse input simulation and cursor polling.
//!
//! Cursor movement uses SetCursorPos in small timed steps so the game sees a
//! continuous drag. Button presses go through SendInput, which the game's
//! input layer accepts as hardware input.

use anyhow::{anyhow, Result};
use std::time::Duration;

use windows::Win32::Foundation::POINT;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEINPUT, MOUSE_EVENT_FLAGS,
};
use windows::Win32::UI::WindowsAndMessaging::{GetCursorPos, SetCursorPos};

/// Interval between cursor steps during a glide.
const STEP_INTERVAL_MS: u64 = 10;

/// Gets the current cursor position in screen coordinates.
pub fn cursor_position() -> Result<(i32, i32)> {
    let mut pt = POINT::default();
    unsafe {
        GetCursorPos(&mut pt)?;
    }
    Ok((pt.x, pt.y))
}

/// Moves the cursor from its current position to `target` over `duration`.
fn glide_cursor(target: (i32, i32), duration: Duration) -> Result<()> {
    let (from_x, from_y) = cursor_position()?;
    let steps = (duration.as_millis() as u64 / STEP_INTERVAL_MS).max(1);

    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        let x = from_x + ((target.0 - from_x) as f32 * t).round() as i32;
        let y = from_y + ((target.1 - from_y) as f32 * t).round() as i32;
        unsafe { SetCursorPos(x, y)? };
        std::thread::sleep(duration / steps as u32);
    }

    Ok(())
}

/// Sends a single left-button event at the current cursor position.
fn send_button(flags: MOUSE_EVENT_FLAGS) -> Result<()> {
    let input = INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dwFlags: flags,
                ..Default::default()
            },
        },
    };
    let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
    if sent != 1 {
        return Err(anyhow!("SendInput rejected mouse event {:?}", flags));
    }
    Ok(())
}

/// Presses at `start`, drags vertically to `end_y`, holds, then releases.
///
/// The hold before release stops the list from flinging past the drag distance.
pub fn drag_vertical(
    start: (i32, i32),
    end_y: i32,
    approach: Duration,
    drag: Duration,
    hold: Duration,
) -> Result<()> {
    glide_cursor(start, approach)?;
    send_button(MOUSEEVENTF_LEFTDOWN)?;

    let dragged = glide_cursor((start.0, end_y), drag);
    std::thread::sleep(hold);

    // Always release, even if the glide failed halfway.
    send_button(MOUSEEVENTF_LEFTUP)?;
    dragged
}
