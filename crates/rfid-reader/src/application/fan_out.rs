//! One-producer, many-consumer record distribution.
//!
//! Every registered output gets its own bounded queue and receives every
//! published record, in publish order.  Outputs are visited in registration
//! order.  Nothing is filtered or transformed here; debouncing belongs to the
//! bridges.

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use rfid_core::ScanRecord;

pub use crate::domain::config::OverflowPolicy;

/// Errors returned by [`FanOut::publish`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FanOutError {
    #[error("no outputs are registered")]
    NoOutputs,
    /// Every consumer has stopped, so there is nobody left to deliver to.
    #[error("all {count} outputs have closed")]
    AllOutputsClosed { count: usize },
}

/// Per-output counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputStats {
    pub name: String,
    pub delivered: u64,
    pub dropped: u64,
    pub closed: bool,
}

/// What happened to one published record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub dropped: usize,
    /// Outputs that were found closed during this publish.
    pub newly_closed: usize,
}

struct Output {
    tx: mpsc::Sender<ScanRecord>,
    policy: OverflowPolicy,
    stats: OutputStats,
}

/// The distributor.  Owned by the framing task; not shared.
#[derive(Default)]
pub struct FanOut {
    outputs: Vec<Output>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an output and returns the receiving end of its queue.
    ///
    /// A `capacity` of zero is raised to one.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        capacity: usize,
        policy: OverflowPolicy,
    ) -> mpsc::Receiver<ScanRecord> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.outputs.push(Output {
            tx,
            policy,
            stats: OutputStats {
                name: name.into(),
                delivered: 0,
                dropped: 0,
                closed: false,
            },
        });
        rx
    }

    /// Delivers `record` to every open output.
    ///
    /// An output whose receiver has been dropped is marked closed and skipped
    /// from then on.
    ///
    /// # Errors
    ///
    /// [`FanOutError::NoOutputs`] when nothing is registered, and
    /// [`FanOutError::AllOutputsClosed`] once no open output remains.
    pub async fn publish(&mut self, record: ScanRecord) -> Result<PublishReport, FanOutError> {
        if self.outputs.is_empty() {
            return Err(FanOutError::NoOutputs);
        }

        let mut report = PublishReport::default();
        for output in self.outputs.iter_mut().filter(|o| !o.stats.closed) {
            let delivered = match output.policy {
                OverflowPolicy::Block => output.tx.send(record.clone()).await.is_ok(),
                OverflowPolicy::DropNewest => match output.tx.try_send(record.clone()) {
                    Ok(()) => true,
                    Err(TrySendError::Full(_)) => {
                        output.stats.dropped += 1;
                        report.dropped += 1;
                        warn!(
                            "output '{}' is full; dropped record ({} dropped so far)",
                            output.stats.name, output.stats.dropped
                        );
                        continue;
                    }
                    Err(TrySendError::Closed(_)) => false,
                },
            };

            if delivered {
                output.stats.delivered += 1;
                report.delivered += 1;
            } else {
                output.stats.closed = true;
                report.newly_closed += 1;
                warn!("output '{}' has closed; it will be skipped", output.stats.name);
            }
        }

        debug!(
            delivered = report.delivered,
            dropped = report.dropped,
            "record published"
        );

        if self.open_outputs() == 0 {
            return Err(FanOutError::AllOutputsClosed {
                count: self.outputs.len(),
            });
        }
        Ok(report)
    }

    pub fn stats(&self) -> Vec<OutputStats> {
        self.outputs.iter().map(|o| o.stats.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn open_outputs(&self) -> usize {
        self.outputs.iter().filter(|o| !o.stats.closed).count()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
