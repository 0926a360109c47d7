//! Consumer bridges: one fan-out output, an optional debounce filter and a
//! side effect.
//!
//! The side effect lives behind [`RecordSink`], implemented in the
//! infrastructure layer (clipboard, HTTP API, keyboard).  A sink failure is
//! reported and contained here; it never reaches the other bridges or the
//! framing stage.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use rfid_core::{DebounceFilter, ScanRecord};

/// Failure of a single side effect.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("clipboard error: {0}")]
    Clipboard(String),
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("endpoint answered with status {status}")]
    Status { status: u16 },
    #[error("keyboard emulation error: {0}")]
    Keyboard(String),
    /// The record contains a character with no key on the emulated layout.
    #[error("cannot type character {0:?}")]
    UnsupportedCharacter(char),
}

/// The side effect a bridge performs for each accepted record.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Called once before the first record.
    async fn prepare(&self) -> Result<(), SinkError> {
        Ok(())
    }

    async fn deliver(&self, record: &ScanRecord) -> Result<(), SinkError>;
}

/// What a bridge does after a failed delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SinkFailurePolicy {
    /// Log and keep consuming.
    #[default]
    Continue,
    /// Stop this bridge.  The rest of the pipeline keeps running.
    Stop,
}

/// Result of handling one record.
#[derive(Debug)]
pub enum BridgeOutcome {
    Delivered,
    /// The debounce filter judged it a duplicate.
    Suppressed,
    Failed(SinkError),
}

/// Counters returned when a bridge finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeReport {
    pub name: String,
    pub received: u64,
    pub delivered: u64,
    pub suppressed: u64,
    pub failed: u64,
    /// The bridge ended early because of [`SinkFailurePolicy::Stop`] or a
    /// failed [`RecordSink::prepare`].
    pub stopped_on_failure: bool,
}

pub struct Bridge {
    sink: Box<dyn RecordSink>,
    debounce: Option<DebounceFilter>,
    failure_policy: SinkFailurePolicy,
}

impl Bridge {
    pub fn new(sink: impl RecordSink + 'static) -> Self {
        Self::from_boxed(Box::new(sink))
    }

    pub fn from_boxed(sink: Box<dyn RecordSink>) -> Self {
        Self {
            sink,
            debounce: None,
            failure_policy: SinkFailurePolicy::default(),
        }
    }

    /// Gives this bridge its own debounce filter.
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = Some(DebounceFilter::new(window));
        self
    }

    pub fn with_failure_policy(mut self, policy: SinkFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        self.sink.name()
    }

    /// Runs one record through the debounce filter and the sink.
    pub async fn handle(&mut self, record: &ScanRecord) -> BridgeOutcome {
        if let Some(filter) = self.debounce.as_mut() {
            if filter.is_duplicate(record) {
                debug!("[{}] duplicate scan suppressed: {record}", self.sink.name());
                return BridgeOutcome::Suppressed;
            }
        }
        match self.sink.deliver(record).await {
            Ok(()) => BridgeOutcome::Delivered,
            Err(e) => BridgeOutcome::Failed(e),
        }
    }

    /// Consumes records until the queue closes or `cancel` fires.
    ///
    /// Records already queued when the producer goes away are still handled;
    /// cancellation stops immediately.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<ScanRecord>,
        cancel: CancellationToken,
    ) -> BridgeReport {
        let mut report = BridgeReport {
            name: self.sink.name().to_string(),
            ..Default::default()
        };

        let prepared = tokio::select! {
            _ = cancel.cancelled() => return report,
            r = self.sink.prepare() => r,
        };
        if let Err(e) = prepared {
            error!("[{}] bridge could not start: {e}", report.name);
            report.stopped_on_failure = true;
            return report;
        }
        info!("[{}] bridge started", report.name);

        loop {
            let record = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                r = rx.recv() => match r {
                    Some(record) => record,
                    None => break,
                },
            };
            report.received += 1;

            match self.handle(&record).await {
                BridgeOutcome::Delivered => report.delivered += 1,
                BridgeOutcome::Suppressed => report.suppressed += 1,
                BridgeOutcome::Failed(e) => {
                    report.failed += 1;
                    warn!("[{}] could not deliver scan {record:?}: {e}", report.name);
                    if self.failure_policy == SinkFailurePolicy::Stop {
                        error!("[{}] stopping bridge after failure", report.name);
                        report.stopped_on_failure = true;
                        break;
                    }
                }
            }
        }

        info!(
            "[{}] bridge stopped: {} received, {} delivered, {} suppressed, {} failed",
            report.name, report.received, report.delivered, report.suppressed, report.failed
        );
        report
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
