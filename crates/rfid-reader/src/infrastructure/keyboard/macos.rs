//! macOS key injection via CoreGraphics.
//!
//! Each key becomes a `CGEvent` keyboard event posted at the HID tap.  The
//! process needs the Accessibility permission (System Settings → Privacy &
//! Security → Accessibility) or the events are silently dropped.

use std::sync::atomic::{AtomicBool, Ordering};

use core_graphics::event::{CGEvent, CGEventFlags, CGEventTapLocation};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use rfid_core::{HidKeyCode, KeyMapper};

use super::{EmulationError, KeystrokeEmitter};

#[derive(Default)]
pub struct MacosKeystrokeEmitter {
    /// Posted events carry the Shift flag while Shift is held.
    shift_held: AtomicBool,
}

impl MacosKeystrokeEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn post(&self, key: HidKeyCode, down: bool) -> Result<(), EmulationError> {
        let code = KeyMapper::hid_to_macos_cgkeycode(key);
        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
            .map_err(|_| EmulationError::Platform("could not create CGEventSource".into()))?;
        let event = CGEvent::new_keyboard_event(source, code, down)
            .map_err(|_| EmulationError::Platform("could not create keyboard event".into()))?;

        if key == HidKeyCode::ShiftLeft {
            self.shift_held.store(down, Ordering::Relaxed);
        }
        if self.shift_held.load(Ordering::Relaxed) {
            event.set_flags(CGEventFlags::CGEventFlagShift);
        }
        event.post(CGEventTapLocation::HID);
        Ok(())
    }
}

impl KeystrokeEmitter for MacosKeystrokeEmitter {
    fn key_down(&self, key: HidKeyCode) -> Result<(), EmulationError> {
        self.post(key, true)
    }

    fn key_up(&self, key: HidKeyCode) -> Result<(), EmulationError> {
        self.post(key, false)
    }
}
