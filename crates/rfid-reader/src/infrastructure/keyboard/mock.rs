//! Mock keystroke emitter for unit testing.
//!
//! Records every key event in order instead of touching the OS, so tests can
//! assert exactly what would have been typed.  Set `should_fail = true` to
//! exercise error paths.

use std::sync::Mutex;

use rfid_core::HidKeyCode;

use super::{EmulationError, KeystrokeEmitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(HidKeyCode),
    Up(HidKeyCode),
}

#[derive(Default)]
pub struct MockKeystrokeEmitter {
    pub recorded: Mutex<Vec<KeyEvent>>,
    /// When `true`, every method returns `EmulationError::Platform`.
    pub should_fail: bool,
}

impl MockKeystrokeEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<KeyEvent> {
        self.recorded
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn record(&self, event: KeyEvent) -> Result<(), EmulationError> {
        if self.should_fail {
            return Err(EmulationError::Platform("mock failure".into()));
        }
        self.recorded
            .lock()
            .map_err(|_| EmulationError::Platform("mock lock poisoned".into()))?
            .push(event);
        Ok(())
    }
}

impl KeystrokeEmitter for MockKeystrokeEmitter {
    fn key_down(&self, key: HidKeyCode) -> Result<(), EmulationError> {
        self.record(KeyEvent::Down(key))
    }

    fn key_up(&self, key: HidKeyCode) -> Result<(), EmulationError> {
        self.record(KeyEvent::Up(key))
    }
}
