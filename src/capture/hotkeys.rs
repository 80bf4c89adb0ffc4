//! Global hotkeys for click-free region selection.
//!
//! The keys are registered for the calling thread only (no window handle),
//! so `WM_HOTKEY` arrives in that thread's message queue and is drained with
//! `PeekMessageW`. The game never sees the key presses.

use anyhow::{anyhow, Result};
use std::marker::PhantomData;

use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, MOD_NOREPEAT, VK_ESCAPE, VK_F2, VK_F3,
};
use windows::Win32::UI::WindowsAndMessaging::{PeekMessageW, MSG, PM_REMOVE, WM_HOTKEY};

use super::SelectionKey;

const HOTKEY_TOP_LEFT: i32 = 201;
const HOTKEY_BOTTOM_RIGHT: i32 = 202;
const HOTKEY_CANCEL: i32 = 203;

const KEYS: [(i32, u32, SelectionKey); 3] = [
    (HOTKEY_TOP_LEFT, VK_F2.0 as u32, SelectionKey::TopLeft),
    (HOTKEY_BOTTOM_RIGHT, VK_F3.0 as u32, SelectionKey::BottomRight),
    (HOTKEY_CANCEL, VK_ESCAPE.0 as u32, SelectionKey::Cancel),
];

/// F2, F3 and Esc, registered while this value lives.
///
/// Bound to the registering thread.
pub struct SelectionHotkeys {
    _thread: PhantomData<*const ()>,
}

impl SelectionHotkeys {
    pub fn register() -> Result<Self> {
        for (index, (id, vk, key)) in KEYS.iter().enumerate() {
            if let Err(e) = unsafe { RegisterHotKey(HWND::default(), *id, MOD_NOREPEAT, *vk) } {
                unregister(&KEYS[..index]);
                return Err(anyhow!("Failed to register hotkey for {:?}: {}", key, e));
            }
        }
        Ok(Self {
            _thread: PhantomData,
        })
    }

    /// Takes the next pending hotkey press, if any. Never blocks.
    pub fn poll(&self) -> Option<SelectionKey> {
        let mut msg = MSG::default();
        while unsafe { PeekMessageW(&mut msg, HWND::default(), WM_HOTKEY, WM_HOTKEY, PM_REMOVE) }
            .as_bool()
        {
            let id = msg.wParam.0 as i32;
            if let Some((.., key)) = KEYS.iter().find(|(hotkey, ..)| *hotkey == id) {
                return Some(*key);
            }
        }
        None
    }
}

impl Drop for SelectionHotkeys {
    fn drop(&mut self) {
        unregister(&KEYS);
    }
}

fn unregister(keys: &[(i32, u32, SelectionKey)]) {
    for (id, ..) in keys {
        unsafe {
            let _ = UnregisterHotKey(HWND::default(), *id);
        }
    }
}
