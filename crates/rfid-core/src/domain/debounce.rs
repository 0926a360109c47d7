//! Time-and-value debounce filter.
//!
//! A user holding a card near the reader makes it fire the same frame over
//! and over.  Bridges whose side effect has a cost (an outbound HTTP request,
//! a burst of typed characters) put a [`DebounceFilter`] in front of it so
//! that only the first record of such a burst gets through.
//!
//! # Rule
//!
//! ```text
//! duplicate = record == last_record  &&  now - last_time < window
//! last_record, last_time = record, now      (always, after comparing)
//! ```
//!
//! Because the state is refreshed on *every* call, a burst of identical
//! records arriving closer together than `window` is suppressed for as long
//! as it lasts, not just for `window` after its first record.
//!
//! # Ownership
//!
//! The filter takes `&mut self` and is not meant to be shared.  Each bridge
//! owns its own instance inside its own task, so two bridges fed the same
//! stream reach their verdicts independently and no lock is needed.

use std::time::{Duration, Instant};

use crate::domain::record::ScanRecord;

/// Default window used by the API bridge.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(1);

/// Stateful duplicate detector with a fixed time window.
#[derive(Debug, Clone)]
pub struct DebounceFilter {
    window: Duration,
    last: Option<(ScanRecord, Instant)>,
}

impl DebounceFilter {
    /// Creates a filter that has seen nothing yet.
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// The configured window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Judges `record` against the previous call using the current time.
    pub fn is_duplicate(&mut self, record: &ScanRecord) -> bool {
        self.is_duplicate_at(record, Instant::now())
    }

    /// Judges `record` as if it arrived at `now`.
    ///
    /// `now` is expected to be monotonic across calls.  A `now` earlier than
    /// the previous timestamp counts as zero elapsed time.
    pub fn is_duplicate_at(&mut self, record: &ScanRecord, now: Instant) -> bool {
        let duplicate = match &self.last {
            Some((last_record, last_time)) => {
                last_record == record && now.saturating_duration_since(*last_time) < self.window
            }
            None => false,
        };
        self.last = Some((record.clone(), now));
        duplicate
    }

    /// Forgets the last record, so the next call is never a duplicate.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for DebounceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
