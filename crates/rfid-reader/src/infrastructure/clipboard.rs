//! Clipboard output: every scan replaces the clipboard contents.
//!
//! Overwriting is idempotent, so this bridge runs without a debounce filter.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use rfid_core::ScanRecord;

use crate::application::bridge::{RecordSink, SinkError};

/// Something that can hold text for the user to paste.
pub trait ClipboardBackend: Send + Sync {
    /// Replaces the clipboard contents with `text`.
    fn set_text(&self, text: &str) -> Result<(), SinkError>;
}

/// The OS clipboard via `arboard`.
///
/// The handle is kept for the life of the process: on X11 and Wayland the
/// owning process must stay alive for pasted content to remain available.
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    /// # Errors
    ///
    /// Returns [`SinkError::Clipboard`] when no clipboard is available, e.g.
    /// a headless session.
    pub fn new() -> Result<Self, SinkError> {
        let inner = arboard::Clipboard::new().map_err(|e| SinkError::Clipboard(e.to_string()))?;
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }
}

impl ClipboardBackend for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), SinkError> {
        let mut clipboard = self
            .inner
            .lock()
            .map_err(|_| SinkError::Clipboard("clipboard lock poisoned".into()))?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|e| SinkError::Clipboard(e.to_string()))
    }
}

/// In-memory clipboard for tests.
#[derive(Default)]
pub struct MockClipboard {
    /// Every value written, oldest first.
    pub writes: Mutex<Vec<String>>,
    /// When `true`, `set_text` fails.
    pub should_fail: bool,
}

impl MockClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current clipboard contents.
    pub fn contents(&self) -> Option<String> {
        self.writes.lock().ok()?.last().cloned()
    }
}

impl ClipboardBackend for MockClipboard {
    fn set_text(&self, text: &str) -> Result<(), SinkError> {
        if self.should_fail {
            return Err(SinkError::Clipboard("mock failure".into()));
        }
        self.writes
            .lock()
            .map_err(|_| SinkError::Clipboard("mock lock poisoned".into()))?
            .push(text.to_owned());
        Ok(())
    }
}

/// Bridge sink that copies each scan to a [`ClipboardBackend`].
pub struct ClipboardSink {
    backend: Arc<dyn ClipboardBackend>,
}

impl ClipboardSink {
    pub fn new(backend: Arc<dyn ClipboardBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl RecordSink for ClipboardSink {
    fn name(&self) -> &str {
        "clipboard"
    }

    async fn deliver(&self, record: &ScanRecord) -> Result<(), SinkError> {
        let backend = Arc::clone(&self.backend);
        let text = record.as_str().to_owned();
        tokio::task::spawn_blocking(move || backend.set_text(&text))
            .await
            .map_err(|e| SinkError::Clipboard(e.to_string()))??;
        info!("scan copied to clipboard: {record}");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
