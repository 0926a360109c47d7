//! Windows key injection via `SendInput`.

use rfid_core::{HidKeyCode, KeyMapper};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP,
    VIRTUAL_KEY,
};

use super::{EmulationError, KeystrokeEmitter};

pub struct WindowsKeystrokeEmitter;

impl WindowsKeystrokeEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsKeystrokeEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl KeystrokeEmitter for WindowsKeystrokeEmitter {
    fn key_down(&self, key: HidKeyCode) -> Result<(), EmulationError> {
        send_key(KeyMapper::hid_to_windows_vk(key), false)
    }

    fn key_up(&self, key: HidKeyCode) -> Result<(), EmulationError> {
        send_key(KeyMapper::hid_to_windows_vk(key), true)
    }
}

fn send_key(vk: u8, key_up: bool) -> Result<(), EmulationError> {
    let flags = if key_up {
        KEYEVENTF_KEYUP
    } else {
        KEYBD_EVENT_FLAGS(0)
    };
    let input = INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(u16::from(vk)),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };
    // SAFETY: input is a valid KEYBDINPUT structure on the stack
    let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
    if sent == 0 {
        return Err(EmulationError::Platform(format!(
            "SendInput failed: {}",
            windows::core::Error::from_win32()
        )));
    }
    Ok(())
}
