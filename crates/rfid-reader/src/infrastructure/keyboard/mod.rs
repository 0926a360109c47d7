//! Keyboard output: types each scan into the focused window.
//!
//! Characters are mapped to [`KeyStroke`]s by `rfid_core::keymap`, then
//! injected through a platform [`KeystrokeEmitter`] selected at compile time
//! via `#[cfg(target_os = ...)]`.

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "macos")]
pub mod macos;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use rfid_core::keymap::{KeyMapper, KeyStroke, ENTER};
use rfid_core::{HidKeyCode, ScanRecord};

use crate::application::bridge::{RecordSink, SinkError};

/// Error type for key injection.
#[derive(Debug, Error)]
pub enum EmulationError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("no native key code for {0:?}")]
    InvalidKeyCode(HidKeyCode),
    #[error("keyboard emulation is not supported on this platform")]
    Unsupported,
}

/// OS-level key injection.
pub trait KeystrokeEmitter: Send + Sync {
    fn key_down(&self, key: HidKeyCode) -> Result<(), EmulationError>;
    fn key_up(&self, key: HidKeyCode) -> Result<(), EmulationError>;
}

/// Presses and releases each stroke in order, holding Shift where needed.
///
/// Shift is released even when the key itself fails.
pub fn type_strokes(
    emitter: &dyn KeystrokeEmitter,
    strokes: &[KeyStroke],
) -> Result<(), EmulationError> {
    for stroke in strokes {
        if stroke.shift {
            emitter.key_down(HidKeyCode::ShiftLeft)?;
        }
        let pressed = emitter
            .key_down(stroke.key)
            .and_then(|()| emitter.key_up(stroke.key));
        if stroke.shift {
            emitter.key_up(HidKeyCode::ShiftLeft)?;
        }
        pressed?;
    }
    Ok(())
}

/// The emitter for the platform this binary was built for.
///
/// # Errors
///
/// Returns [`EmulationError::Platform`] when the OS input API is unavailable
/// (e.g. no X display), or [`EmulationError::Unsupported`] on other targets.
pub fn platform_emitter() -> Result<Arc<dyn KeystrokeEmitter>, EmulationError> {
    #[cfg(target_os = "windows")]
    return Ok(Arc::new(windows::WindowsKeystrokeEmitter::new()));
    #[cfg(target_os = "linux")]
    return Ok(Arc::new(linux::LinuxXTestEmitter::new()?));
    #[cfg(target_os = "macos")]
    return Ok(Arc::new(macos::MacosKeystrokeEmitter::new()));
    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    return Err(EmulationError::Unsupported);
}

/// Bridge sink that types each scan.
pub struct KeyboardSink {
    emitter: Arc<dyn KeystrokeEmitter>,
    press_enter: bool,
    start_delay: Duration,
}

impl KeyboardSink {
    pub fn new(emitter: Arc<dyn KeystrokeEmitter>) -> Self {
        Self {
            emitter,
            press_enter: true,
            start_delay: Duration::ZERO,
        }
    }

    pub fn with_enter(mut self, press_enter: bool) -> Self {
        self.press_enter = press_enter;
        self
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    fn strokes_for(&self, record: &ScanRecord) -> Result<Vec<KeyStroke>, SinkError> {
        let mut strokes =
            KeyMapper::text_to_keystrokes(record.as_str()).map_err(SinkError::UnsupportedCharacter)?;
        if self.press_enter {
            strokes.push(ENTER);
        }
        Ok(strokes)
    }
}

#[async_trait]
impl RecordSink for KeyboardSink {
    fn name(&self) -> &str {
        "keyboard"
    }

    async fn prepare(&self) -> Result<(), SinkError> {
        if !self.start_delay.is_zero() {
            info!(
                "keyboard output starts in {:?}; focus the target window",
                self.start_delay
            );
            tokio::time::sleep(self.start_delay).await;
        }
        Ok(())
    }

    async fn deliver(&self, record: &ScanRecord) -> Result<(), SinkError> {
        let strokes = self.strokes_for(record)?;
        let emitter = Arc::clone(&self.emitter);
        tokio::task::spawn_blocking(move || type_strokes(emitter.as_ref(), &strokes))
            .await
            .map_err(|e| SinkError::Keyboard(e.to_string()))?
            .map_err(|e| SinkError::Keyboard(e.to_string()))?;
        info!("scan typed: {record}");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
