//! HID Usage ID to macOS `CGKeyCode` translation (ANSI layout).
//!
//! Unlike Windows and X11, CoreGraphics key codes follow the physical ANSI
//! keyboard rather than any character order, so the table is irregular.
//!
//! Reference: `HIToolbox/Events.h` (`kVK_ANSI_*`).

use super::hid::HidKeyCode;

/// Translates a [`HidKeyCode`] to a macOS virtual key code.
pub fn hid_to_cgkeycode(hid: HidKeyCode) -> u16 {
    match hid {
        HidKeyCode::KeyA => 0x00,
        HidKeyCode::KeyB => 0x0B,
        HidKeyCode::KeyC => 0x08,
        HidKeyCode::KeyD => 0x02,
        HidKeyCode::KeyE => 0x0E,
        HidKeyCode::KeyF => 0x03,
        HidKeyCode::KeyG => 0x05,
        HidKeyCode::KeyH => 0x04,
        HidKeyCode::KeyI => 0x22,
        HidKeyCode::KeyJ => 0x26,
        HidKeyCode::KeyK => 0x28,
        HidKeyCode::KeyL => 0x25,
        HidKeyCode::KeyM => 0x2E,
        HidKeyCode::KeyN => 0x2D,
        HidKeyCode::KeyO => 0x1F,
        HidKeyCode::KeyP => 0x23,
        HidKeyCode::KeyQ => 0x0C,
        HidKeyCode::KeyR => 0x0F,
        HidKeyCode::KeyS => 0x01,
        HidKeyCode::KeyT => 0x11,
        HidKeyCode::KeyU => 0x20,
        HidKeyCode::KeyV => 0x09,
        HidKeyCode::KeyW => 0x0D,
        HidKeyCode::KeyX => 0x07,
        HidKeyCode::KeyY => 0x10,
        HidKeyCode::KeyZ => 0x06,

        HidKeyCode::Digit0 => 0x1D,
        HidKeyCode::Digit1 => 0x12,
        HidKeyCode::Digit2 => 0x13,
        HidKeyCode::Digit3 => 0x14,
        HidKeyCode::Digit4 => 0x15,
        HidKeyCode::Digit5 => 0x17,
        HidKeyCode::Digit6 => 0x16,
        HidKeyCode::Digit7 => 0x1A,
        HidKeyCode::Digit8 => 0x1C,
        HidKeyCode::Digit9 => 0x19,

        HidKeyCode::Enter => 0x24,     // kVK_Return
        HidKeyCode::Space => 0x31,     // kVK_Space
        HidKeyCode::Minus => 0x1B,     // kVK_ANSI_Minus
        HidKeyCode::Period => 0x2F,    // kVK_ANSI_Period
        HidKeyCode::Slash => 0x2C,     // kVK_ANSI_Slash
        HidKeyCode::ShiftLeft => 0x38, // kVK_Shift
    }
}
