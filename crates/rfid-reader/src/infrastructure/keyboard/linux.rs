//! Linux X11 key injection via the XTest extension.
//!
//! ```text
//! HID Usage ID → X11 KeySym → XKeysymToKeycode(display, keysym) → XTestFakeKeyEvent
//! ```
//!
//! XTest needs access to the X display of the user's session.  If `DISPLAY`
//! is unset or the server refuses the connection, [`LinuxXTestEmitter::new`]
//! fails and the keyboard output cannot start.

use std::ptr;
use std::sync::Mutex;

use rfid_core::{HidKeyCode, KeyMapper};
use x11::{xlib, xtest};

use super::{EmulationError, KeystrokeEmitter};

/// Passing `CurrentTime` (0) means "no delay".
const CURRENT_TIME: std::os::raw::c_ulong = 0;

struct Display(*mut xlib::Display);

// SAFETY: the display pointer is only dereferenced by Xlib while the
// emitter's mutex is held, so it is never used from two threads at once.
unsafe impl Send for Display {}

pub struct LinuxXTestEmitter {
    display: Mutex<Display>,
}

impl LinuxXTestEmitter {
    /// Opens the display named by `DISPLAY`.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::Platform`] if the display cannot be opened.
    pub fn new() -> Result<Self, EmulationError> {
        // SAFETY: a null name tells Xlib to read the DISPLAY variable.
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            return Err(EmulationError::Platform(
                "cannot open X display (is DISPLAY set?)".into(),
            ));
        }
        Ok(Self {
            display: Mutex::new(Display(display)),
        })
    }

    fn send(&self, key: HidKeyCode, press: bool) -> Result<(), EmulationError> {
        let keysym = KeyMapper::hid_to_x11_keysym(key);
        let guard = self
            .display
            .lock()
            .map_err(|_| EmulationError::Platform("display lock poisoned".into()))?;

        // SAFETY: guard.0 was returned non-null by XOpenDisplay and is only
        // closed in Drop, which cannot run while this borrow is alive.
        unsafe {
            let keycode = xlib::XKeysymToKeycode(guard.0, xlib::KeySym::from(keysym));
            if keycode == 0 {
                return Err(EmulationError::InvalidKeyCode(key));
            }
            let ok = xtest::XTestFakeKeyEvent(
                guard.0,
                u32::from(keycode),
                i32::from(press),
                CURRENT_TIME,
            );
            if ok == 0 {
                return Err(EmulationError::Platform("XTestFakeKeyEvent failed".into()));
            }
            xlib::XFlush(guard.0);
        }
        Ok(())
    }
}

impl KeystrokeEmitter for LinuxXTestEmitter {
    fn key_down(&self, key: HidKeyCode) -> Result<(), EmulationError> {
        self.send(key, true)
    }

    fn key_up(&self, key: HidKeyCode) -> Result<(), EmulationError> {
        self.send(key, false)
    }
}

impl Drop for LinuxXTestEmitter {
    fn drop(&mut self) {
        let display = match self.display.get_mut() {
            Ok(d) => d.0,
            Err(poisoned) => poisoned.into_inner().0,
        };
        // SAFETY: the pointer came from XOpenDisplay and is closed exactly once.
        unsafe {
            xlib::XCloseDisplay(display);
        }
    }
}
