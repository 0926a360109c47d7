//! HID Usage ID to Windows Virtual Key translation for `SendInput`.
//!
//! Windows VK codes for letters and digits equal the uppercase ASCII value
//! (`VK_A` = 0x41, `VK_0` = 0x30).  Punctuation uses the `VK_OEM_*` codes of a
//! US layout.

use super::hid::HidKeyCode;

/// Translates a [`HidKeyCode`] to a Windows Virtual Key code.
pub fn hid_to_vk(hid: HidKeyCode) -> u8 {
    match hid {
        HidKeyCode::KeyA => 0x41,
        HidKeyCode::KeyB => 0x42,
        HidKeyCode::KeyC => 0x43,
        HidKeyCode::KeyD => 0x44,
        HidKeyCode::KeyE => 0x45,
        HidKeyCode::KeyF => 0x46,
        HidKeyCode::KeyG => 0x47,
        HidKeyCode::KeyH => 0x48,
        HidKeyCode::KeyI => 0x49,
        HidKeyCode::KeyJ => 0x4A,
        HidKeyCode::KeyK => 0x4B,
        HidKeyCode::KeyL => 0x4C,
        HidKeyCode::KeyM => 0x4D,
        HidKeyCode::KeyN => 0x4E,
        HidKeyCode::KeyO => 0x4F,
        HidKeyCode::KeyP => 0x50,
        HidKeyCode::KeyQ => 0x51,
        HidKeyCode::KeyR => 0x52,
        HidKeyCode::KeyS => 0x53,
        HidKeyCode::KeyT => 0x54,
        HidKeyCode::KeyU => 0x55,
        HidKeyCode::KeyV => 0x56,
        HidKeyCode::KeyW => 0x57,
        HidKeyCode::KeyX => 0x58,
        HidKeyCode::KeyY => 0x59,
        HidKeyCode::KeyZ => 0x5A,

        HidKeyCode::Digit0 => 0x30,
        HidKeyCode::Digit1 => 0x31,
        HidKeyCode::Digit2 => 0x32,
        HidKeyCode::Digit3 => 0x33,
        HidKeyCode::Digit4 => 0x34,
        HidKeyCode::Digit5 => 0x35,
        HidKeyCode::Digit6 => 0x36,
        HidKeyCode::Digit7 => 0x37,
        HidKeyCode::Digit8 => 0x38,
        HidKeyCode::Digit9 => 0x39,

        HidKeyCode::Enter => 0x0D,     // VK_RETURN
        HidKeyCode::Space => 0x20,     // VK_SPACE
        HidKeyCode::Minus => 0xBD,     // VK_OEM_MINUS
        HidKeyCode::Period => 0xBE,    // VK_OEM_PERIOD
        HidKeyCode::Slash => 0xBF,     // VK_OEM_2
        HidKeyCode::ShiftLeft => 0xA0, // VK_LSHIFT
    }
}
