//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page).
//!
//! The keyboard bridge types scan records, which only ever contain letters,
//! digits and a handful of separators, so this is the subset of the
//! keyboard page those characters need.  HID codes name *physical key
//! positions*; the character produced also depends on Shift, which is why
//! [`super::KeyStroke`] carries a separate `shift` flag.
//!
//! Reference: USB HID Usage Tables 1.3, Section 10.

/// USB HID Usage ID for a keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum HidKeyCode {
    // Letters (HID 0x04–0x1D)
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    // Digits (HID 0x1E–0x27, note 0 comes last)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    Enter = 0x28,
    Space = 0x2C,
    Minus = 0x2D,
    Period = 0x37,
    Slash = 0x38,

    ShiftLeft = 0xE1,
}

/// Letters in alphabetical order, indexed by `c - 'a'`.
pub(crate) const LETTERS: [HidKeyCode; 26] = [
    HidKeyCode::KeyA,
    HidKeyCode::KeyB,
    HidKeyCode::KeyC,
    HidKeyCode::KeyD,
    HidKeyCode::KeyE,
    HidKeyCode::KeyF,
    HidKeyCode::KeyG,
    HidKeyCode::KeyH,
    HidKeyCode::KeyI,
    HidKeyCode::KeyJ,
    HidKeyCode::KeyK,
    HidKeyCode::KeyL,
    HidKeyCode::KeyM,
    HidKeyCode::KeyN,
    HidKeyCode::KeyO,
    HidKeyCode::KeyP,
    HidKeyCode::KeyQ,
    HidKeyCode::KeyR,
    HidKeyCode::KeyS,
    HidKeyCode::KeyT,
    HidKeyCode::KeyU,
    HidKeyCode::KeyV,
    HidKeyCode::KeyW,
    HidKeyCode::KeyX,
    HidKeyCode::KeyY,
    HidKeyCode::KeyZ,
];

/// Digits indexed by their numeric value.
pub(crate) const DIGITS: [HidKeyCode; 10] = [
    HidKeyCode::Digit0,
    HidKeyCode::Digit1,
    HidKeyCode::Digit2,
    HidKeyCode::Digit3,
    HidKeyCode::Digit4,
    HidKeyCode::Digit5,
    HidKeyCode::Digit6,
    HidKeyCode::Digit7,
    HidKeyCode::Digit8,
    HidKeyCode::Digit9,
];

impl HidKeyCode {
    /// The numeric HID Usage ID.
    pub fn usage_id(self) -> u16 {
        self as u16
    }
}
