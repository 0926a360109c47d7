//! Terminal handling: the exit key and raw-mode-safe log output.
//!
//! The reader quits when the user presses the exit key (default `q`) in its
//! console window.  Reading single keys needs raw mode, and raw mode stops
//! the terminal from turning `\n` into a carriage return, so log lines are
//! written through [`CrLfStdout`] to keep them left-aligned.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::fmt::MakeWriter;

/// How long each blocking poll for input may take.
const TICK: Duration = Duration::from_millis(100);

/// Why [`wait_for_exit_key`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The configured exit key was pressed.
    ExitKey,
    /// Ctrl+C was pressed while the terminal was in raw mode.
    Interrupt,
    /// The token was cancelled elsewhere.
    Cancelled,
}

/// Disables raw mode when dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("failed to restore terminal mode: {e}");
        }
    }
}

/// Waits until `key` (case-insensitive) or Ctrl+C is pressed, or `cancel`
/// fires.
///
/// When stdin is not a terminal raw mode cannot be enabled; the watcher then
/// only waits for `cancel`.
pub async fn wait_for_exit_key(key: char, cancel: CancellationToken) -> ExitReason {
    let _raw = match RawModeGuard::enable() {
        Ok(guard) => guard,
        Err(e) => {
            warn!("exit key unavailable ({e}); press Ctrl+C to exit");
            cancel.cancelled().await;
            return ExitReason::Cancelled;
        }
    };

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return ExitReason::Cancelled,
            next = next_event(TICK) => next,
        };
        if let Some(reason) = next.as_ref().and_then(|e| classify(e, key)) {
            debug!("exit requested: {reason:?}");
            return reason;
        }
    }
}

async fn next_event(tick: Duration) -> Option<Event> {
    tokio::task::spawn_blocking(move || {
        if event::poll(tick).unwrap_or(false) {
            event::read().ok()
        } else {
            None
        }
    })
    .await
    .unwrap_or(None)
}

fn classify(event: &Event, exit_key: char) -> Option<ExitReason> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let KeyCode::Char(c) = key.code else {
        return None;
    };
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return c.eq_ignore_ascii_case(&'c').then_some(ExitReason::Interrupt);
    }
    c.eq_ignore_ascii_case(&exit_key).then_some(ExitReason::ExitKey)
}

// ── Log output ────────────────────────────────────────────────────────────────

/// Writer that emits `\r\n` for every bare `\n`.
pub struct CrLf<W> {
    inner: W,
    last_was_cr: bool,
}

impl<W: Write> CrLf<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            last_was_cr: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CrLf<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut start = 0;
        for (i, &b) in buf.iter().enumerate() {
            if b == b'\n' && !self.last_was_cr {
                self.inner.write_all(&buf[start..i])?;
                self.inner.write_all(b"\r")?;
                start = i;
            }
            self.last_was_cr = b == b'\r';
        }
        self.inner.write_all(&buf[start..])?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// `MakeWriter` for `tracing_subscriber` that writes to stdout via [`CrLf`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CrLfStdout;

impl<'a> MakeWriter<'a> for CrLfStdout {
    type Writer = CrLf<io::Stdout>;

    fn make_writer(&'a self) -> Self::Writer {
        CrLf::new(io::stdout())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
