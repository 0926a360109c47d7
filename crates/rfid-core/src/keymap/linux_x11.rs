//! HID Usage ID to X11 KeySym translation for the Linux keyboard emitter.
//!
//! X11 KeySyms for letters and digits are their ASCII values.  Letters map to
//! the lowercase KeySym; the emitter presses Shift itself when a
//! [`super::KeyStroke`] asks for it.
//!
//! Reference: X11/keysymdef.h

use super::hid::HidKeyCode;

/// Translates a [`HidKeyCode`] to an X11 KeySym.
pub fn hid_to_keysym(hid: HidKeyCode) -> u32 {
    match hid {
        HidKeyCode::KeyA => 0x0061, // XK_a
        HidKeyCode::KeyB => 0x0062,
        HidKeyCode::KeyC => 0x0063,
        HidKeyCode::KeyD => 0x0064,
        HidKeyCode::KeyE => 0x0065,
        HidKeyCode::KeyF => 0x0066,
        HidKeyCode::KeyG => 0x0067,
        HidKeyCode::KeyH => 0x0068,
        HidKeyCode::KeyI => 0x0069,
        HidKeyCode::KeyJ => 0x006A,
        HidKeyCode::KeyK => 0x006B,
        HidKeyCode::KeyL => 0x006C,
        HidKeyCode::KeyM => 0x006D,
        HidKeyCode::KeyN => 0x006E,
        HidKeyCode::KeyO => 0x006F,
        HidKeyCode::KeyP => 0x0070,
        HidKeyCode::KeyQ => 0x0071,
        HidKeyCode::KeyR => 0x0072,
        HidKeyCode::KeyS => 0x0073,
        HidKeyCode::KeyT => 0x0074,
        HidKeyCode::KeyU => 0x0075,
        HidKeyCode::KeyV => 0x0076,
        HidKeyCode::KeyW => 0x0077,
        HidKeyCode::KeyX => 0x0078,
        HidKeyCode::KeyY => 0x0079,
        HidKeyCode::KeyZ => 0x007A, // XK_z

        HidKeyCode::Digit0 => 0x0030, // XK_0
        HidKeyCode::Digit1 => 0x0031,
        HidKeyCode::Digit2 => 0x0032,
        HidKeyCode::Digit3 => 0x0033,
        HidKeyCode::Digit4 => 0x0034,
        HidKeyCode::Digit5 => 0x0035,
        HidKeyCode::Digit6 => 0x0036,
        HidKeyCode::Digit7 => 0x0037,
        HidKeyCode::Digit8 => 0x0038,
        HidKeyCode::Digit9 => 0x0039, // XK_9

        HidKeyCode::Enter => 0xFF0D,     // XK_Return
        HidKeyCode::Space => 0x0020,     // XK_space
        HidKeyCode::Minus => 0x002D,     // XK_minus
        HidKeyCode::Period => 0x002E,    // XK_period
        HidKeyCode::Slash => 0x002F,     // XK_slash
        HidKeyCode::ShiftLeft => 0xFFE1, // XK_Shift_L
    }
}
