//! Key code translation for typing scan records as keystrokes.
//!
//! Characters are first mapped to a [`KeyStroke`] (a HID Usage ID plus a
//! Shift flag), then translated to the platform's native code at the
//! emulation boundary.

pub mod hid;
pub mod linux_x11;
pub mod macos_cg;
pub mod windows_vk;

pub use hid::HidKeyCode;

/// One physical key press needed to type a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyStroke {
    pub key: HidKeyCode,
    /// Hold Shift while pressing `key`.
    pub shift: bool,
}

impl KeyStroke {
    pub const fn plain(key: HidKeyCode) -> Self {
        Self { key, shift: false }
    }

    pub const fn shifted(key: HidKeyCode) -> Self {
        Self { key, shift: true }
    }
}

/// The Enter key, typed after a record when configured.
pub const ENTER: KeyStroke = KeyStroke::plain(HidKeyCode::Enter);

/// Unified key mapper providing all translation directions.
pub struct KeyMapper;

impl KeyMapper {
    /// Maps a character to the key stroke that types it on a US layout.
    ///
    /// Covers ASCII letters (uppercase via Shift), digits, space, `-`, `.`
    /// and `/`.  Returns `None` for anything else.
    pub fn char_to_keystroke(c: char) -> Option<KeyStroke> {
        match c {
            'a'..='z' => Some(KeyStroke::plain(hid::LETTERS[c as usize - 'a' as usize])),
            'A'..='Z' => Some(KeyStroke::shifted(
                hid::LETTERS[c as usize - 'A' as usize],
            )),
            '0'..='9' => Some(KeyStroke::plain(hid::DIGITS[c as usize - '0' as usize])),
            ' ' => Some(KeyStroke::plain(HidKeyCode::Space)),
            '-' => Some(KeyStroke::plain(HidKeyCode::Minus)),
            '.' => Some(KeyStroke::plain(HidKeyCode::Period)),
            '/' => Some(KeyStroke::plain(HidKeyCode::Slash)),
            _ => None,
        }
    }

    /// Maps a whole string, failing on the first character with no key.
    ///
    /// Nothing is typed for a record containing an unsupported character, so
    /// the caller never leaves half a record in the focused window.
    pub fn text_to_keystrokes(text: &str) -> Result<Vec<KeyStroke>, char> {
        text.chars()
            .map(|c| Self::char_to_keystroke(c).ok_or(c))
            .collect()
    }

    /// Translates a [`HidKeyCode`] to a Windows Virtual Key code.
    pub fn hid_to_windows_vk(hid: HidKeyCode) -> u8 {
        windows_vk::hid_to_vk(hid)
    }

    /// Translates a [`HidKeyCode`] to an X11 KeySym value.
    pub fn hid_to_x11_keysym(hid: HidKeyCode) -> u32 {
        linux_x11::hid_to_keysym(hid)
    }

    /// Translates a [`HidKeyCode`] to a macOS `CGKeyCode` value.
    pub fn hid_to_macos_cgkeycode(hid: HidKeyCode) -> u16 {
        macos_cg::hid_to_cgkeycode(hid)
    }
}
