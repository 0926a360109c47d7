//! # rfid-core
//!
//! Pure building blocks for the RFID / magstripe reader bridge: the record
//! type, the delimiter framer, the debounce filter and the key translation
//! tables used to type records as keystrokes.
//!
//! Nothing here touches a serial port, a clipboard, the network or an OS
//! input API.  Those live in `rfid-reader`.
//!
//! - **`framing`** – Turns the raw byte stream (`LF payload CR`) into
//!   [`ScanRecord`]s, rejecting records longer than a fixed bound.
//!
//! - **`domain`** – The [`ScanRecord`] value and the [`DebounceFilter`] that
//!   suppresses repeated reads of the same card inside a time window.
//!
//! - **`keymap`** – Character to USB HID translation plus HID to Windows VK,
//!   X11 KeySym and macOS `CGKeyCode` tables.

pub mod domain;
pub mod framing;
pub mod keymap;

pub use domain::debounce::{DebounceFilter, DEFAULT_DEBOUNCE_WINDOW};
pub use domain::record::ScanRecord;
pub use framing::{records, FramerState, FramingError, StreamFramer, DEFAULT_MAX_RECORD_LEN};
pub use keymap::hid::HidKeyCode;
pub use keymap::{KeyMapper, KeyStroke};
