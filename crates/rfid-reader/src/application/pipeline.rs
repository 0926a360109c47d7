//! The framing-and-fan-out pipeline.
//!
//! ```text
//! source task ──chunks──▶ framer + fan-out ──records──▶ bridge task × N
//! ```
//!
//! - The **source task** opens a [`ByteSource`] through its connector and
//!   forwards raw chunks.  Failing to open the source the first time ends the
//!   session.  Once it has been open, a failure either reconnects after
//!   `reconnect_interval` (telling the framer to drop any partial record) or
//!   ends the session.
//! - The **framing loop** runs on the caller's task.  It pushes every byte
//!   through the [`StreamFramer`] and publishes each record the moment it
//!   completes.  A framing overflow is fatal.
//! - Each **bridge task** drains its own queue.  When the framing loop ends
//!   the fan-out is dropped, so bridges finish whatever is already queued and
//!   return their reports.
//!
//! Cancelling the token stops every stage promptly.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use rfid_core::{FramingError, ScanRecord, StreamFramer, DEFAULT_MAX_RECORD_LEN};

use crate::application::bridge::{Bridge, BridgeReport};
use crate::application::fan_out::{FanOut, FanOutError, OutputStats, OverflowPolicy};
use crate::application::source::{ByteSource, SourceConnector, SourceError};
use crate::domain::config::ReaderConfig;

/// Size of each read from the source.
pub const READ_BUFFER_SIZE: usize = 128;

/// Chunks buffered between the source task and the framer.
const CHUNK_QUEUE_CAPACITY: usize = 32;

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no bridges are configured")]
    NoBridges,
    #[error(transparent)]
    Framing(#[from] FramingError),
    #[error("byte source failed: {0}")]
    Source(#[from] SourceError),
    #[error(transparent)]
    FanOut(#[from] FanOutError),
    #[error("pipeline task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_record_len: usize,
    pub reconnect: bool,
    pub reconnect_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_record_len: DEFAULT_MAX_RECORD_LEN,
            reconnect: true,
            reconnect_interval: Duration::from_secs(5),
        }
    }
}

impl From<&ReaderConfig> for PipelineConfig {
    fn from(cfg: &ReaderConfig) -> Self {
        Self {
            max_record_len: cfg.max_record_len,
            reconnect: cfg.reconnect,
            reconnect_interval: cfg.reconnect_interval,
        }
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Records produced by the framer.
    pub records: u64,
    pub reconnects: u64,
    pub outputs: Vec<OutputStats>,
    pub bridges: Vec<BridgeReport>,
}

enum SourceChunk {
    Data(Vec<u8>),
    /// The source was reopened; any partial record is stale.
    Reset,
}

enum PumpEnd {
    Stopped,
    EndOfStream,
}

pub struct Pipeline {
    config: PipelineConfig,
    fan_out: FanOut,
    bridges: Vec<(Bridge, mpsc::Receiver<ScanRecord>)>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            fan_out: FanOut::new(),
            bridges: Vec::new(),
        }
    }

    /// Registers a bridge behind its own queue.
    pub fn add_bridge(
        &mut self,
        bridge: Bridge,
        capacity: usize,
        policy: OverflowPolicy,
    ) -> &mut Self {
        let rx = self.fan_out.register(bridge.name(), capacity, policy);
        self.bridges.push((bridge, rx));
        self
    }

    pub fn bridge_count(&self) -> usize {
        self.bridges.len()
    }

    /// Runs until the source ends, a fatal error occurs or `cancel` fires.
    ///
    /// Bridge tasks are always awaited before returning, so every record
    /// framed before a failure has been handed to its bridges.
    ///
    /// # Errors
    ///
    /// [`PipelineError::NoBridges`] before starting; otherwise a framing
    /// overflow, a source that never opened, a source failure with reconnect
    /// disabled, or every bridge having stopped.
    pub async fn run<C>(
        self,
        connector: C,
        cancel: CancellationToken,
    ) -> Result<PipelineReport, PipelineError>
    where
        C: SourceConnector,
    {
        let Pipeline {
            config,
            mut fan_out,
            bridges,
        } = self;
        if bridges.is_empty() {
            return Err(PipelineError::NoBridges);
        }

        let bridge_tasks: Vec<JoinHandle<BridgeReport>> = bridges
            .into_iter()
            .map(|(bridge, rx)| tokio::spawn(bridge.run(rx, cancel.clone())))
            .collect();

        let stop_source = cancel.child_token();
        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_QUEUE_CAPACITY);
        let source_task = tokio::spawn(read_source(
            connector,
            config.clone(),
            chunk_tx,
            stop_source.clone(),
        ));

        let mut framer = StreamFramer::with_max_len(config.max_record_len);
        let framed = frame_and_publish(chunk_rx, &mut framer, &mut fan_out, &cancel).await;

        stop_source.cancel();
        let sourced = source_task.await;

        let outputs = fan_out.stats();
        drop(fan_out);

        let mut bridge_reports = Vec::with_capacity(bridge_tasks.len());
        for task in bridge_tasks {
            bridge_reports.push(task.await?);
        }

        let records = framed?;
        let reconnects = sourced??;
        Ok(PipelineReport {
            records,
            reconnects,
            outputs,
            bridges: bridge_reports,
        })
    }
}

async fn frame_and_publish(
    mut chunks: mpsc::Receiver<SourceChunk>,
    framer: &mut StreamFramer,
    fan_out: &mut FanOut,
    cancel: &CancellationToken,
) -> Result<u64, PipelineError> {
    let mut records = 0u64;
    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(records),
            c = chunks.recv() => c,
        };
        let bytes = match chunk {
            None => return Ok(records),
            Some(SourceChunk::Reset) => {
                if framer.buffered_len() > 0 {
                    debug!("discarding {} buffered bytes after reconnect", framer.buffered_len());
                }
                framer.reset();
                continue;
            }
            Some(SourceChunk::Data(bytes)) => bytes,
        };

        for byte in bytes {
            let record = match framer.push(byte) {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) => {
                    error!("framing failed: {e}");
                    return Err(e.into());
                }
            };
            records += 1;
            info!("scan received: {record}");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(records),
                published = fan_out.publish(record) => {
                    published?;
                }
            }
        }
    }
}

async fn read_source<C>(
    mut connector: C,
    config: PipelineConfig,
    chunks: mpsc::Sender<SourceChunk>,
    cancel: CancellationToken,
) -> Result<u64, SourceError>
where
    C: SourceConnector,
{
    let mut reconnects = 0u64;
    let mut ever_opened = false;
    loop {
        let opened = tokio::select! {
            _ = cancel.cancelled() => return Ok(reconnects),
            r = connector.connect() => r,
        };

        let failure = match opened {
            // A device that never opened is a startup failure, not a disconnect.
            Err(e) if !ever_opened => {
                error!("{}: {e}", connector.describe());
                return Err(e);
            }
            Ok(mut source) => {
                ever_opened = true;
                info!("connected to {}", connector.describe());
                match pump(&mut source, &chunks, &cancel).await {
                    Ok(PumpEnd::Stopped) => return Ok(reconnects),
                    Ok(PumpEnd::EndOfStream) if !config.reconnect => {
                        info!("{} reached end of stream", connector.describe());
                        return Ok(reconnects);
                    }
                    Ok(PumpEnd::EndOfStream) => SourceError::Closed,
                    Err(e) => e,
                }
            }
            Err(e) => e,
        };

        if !config.reconnect {
            error!("{}: {failure}", connector.describe());
            return Err(failure);
        }
        warn!(
            "{}: {failure}; reconnecting in {:?}",
            connector.describe(),
            config.reconnect_interval
        );

        if chunks.send(SourceChunk::Reset).await.is_err() {
            return Ok(reconnects);
        }
        tokio::select! {
            _ = cancel.cancelled() => return Ok(reconnects),
            _ = tokio::time::sleep(config.reconnect_interval) => {}
        }
        reconnects += 1;
    }
}

async fn pump<S>(
    source: &mut S,
    chunks: &mpsc::Sender<SourceChunk>,
    cancel: &CancellationToken,
) -> Result<PumpEnd, SourceError>
where
    S: ByteSource,
{
    let mut buf = [0u8; READ_BUFFER_SIZE];
    loop {
        let n = tokio::select! {
            _ = cancel.cancelled() => return Ok(PumpEnd::Stopped),
            r = source.read(&mut buf) => r?,
        };
        if n == 0 {
            return Ok(PumpEnd::EndOfStream);
        }
        debug!(bytes = n, "read chunk");

        let sent = tokio::select! {
            _ = cancel.cancelled() => return Ok(PumpEnd::Stopped),
            r = chunks.send(SourceChunk::Data(buf[..n].to_vec())) => r,
        };
        if sent.is_err() {
            return Ok(PumpEnd::Stopped);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::{RecordingSink, ScriptedConnector, ScriptedSource};

    fn quick_config(reconnect: bool) -> PipelineConfig {
        PipelineConfig {
            reconnect,
            reconnect_interval: Duration::from_millis(10),
            ..Default::default()
        }
    }

    fn texts(sink: &RecordingSink) -> Vec<String> {
        sink.delivered().iter().map(|r| r.to_string()).collect()
    }

    #[tokio::test]
    async fn test_run_without_bridges_fails() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let result = pipeline
            .run(ScriptedConnector::new(vec![]), CancellationToken::new())
            .await;
        assert!(matches!(result, Err(PipelineError::NoBridges)));
    }

    #[tokio::test]
    async fn test_records_split_across_chunks_reach_every_bridge() {
        // Arrange
        let a = RecordingSink::new("a");
        let b = RecordingSink::new("b");
        let mut pipeline = Pipeline::new(quick_config(false));
        pipeline
            .add_bridge(Bridge::new(a.clone()), 4, OverflowPolicy::Block)
            .add_bridge(Bridge::new(b.clone()), 4, OverflowPolicy::Block);
        let source = ScriptedSource::from_chunks(["\n34", "56\r\n78", "\r"]);

        // Act
        let report = pipeline
            .run(ScriptedConnector::new(vec![Ok(source)]), CancellationToken::new())
            .await
            .unwrap();

        // Assert
        assert_eq!(report.records, 2);
        assert_eq!(texts(&a), vec!["3456", "78"]);
        assert_eq!(texts(&b), vec!["3456", "78"]);
        assert_eq!(report.bridges.len(), 2);
        assert!(report.outputs.iter().all(|o| o.delivered == 2));
    }

    #[tokio::test]
    async fn test_overflow_is_fatal_after_delivering_earlier_records() {
        // Arrange
        let sink = RecordingSink::new("sink");
        let mut pipeline = Pipeline::new(PipelineConfig {
            max_record_len: 4,
            ..quick_config(true)
        });
        pipeline.add_bridge(Bridge::new(sink.clone()), 4, OverflowPolicy::Block);
        let source = ScriptedSource::from_chunks(["\nOK\r\nTOOLONG\r"]);

        // Act
        let result = pipeline
            .run(ScriptedConnector::new(vec![Ok(source)]), CancellationToken::new())
            .await;

        // Assert
        assert!(matches!(
            result,
            Err(PipelineError::Framing(FramingError::Overflow { limit: 4 }))
        ));
        assert_eq!(texts(&sink), vec!["OK"]);
    }

    #[tokio::test]
    async fn test_source_failure_without_reconnect_is_fatal() {
        let sink = RecordingSink::new("sink");
        let mut pipeline = Pipeline::new(quick_config(false));
        pipeline.add_bridge(Bridge::new(sink.clone()), 4, OverflowPolicy::Block);
        let source = ScriptedSource::from_chunks(["\nA\r"]).then_fail();

        let result = pipeline
            .run(ScriptedConnector::new(vec![Ok(source)]), CancellationToken::new())
            .await;

        assert!(matches!(result, Err(PipelineError::Source(SourceError::Io(_)))));
        assert_eq!(texts(&sink), vec!["A"]);
    }

    #[tokio::test]
    async fn test_open_failure_without_reconnect_is_fatal() {
        let mut pipeline = Pipeline::new(quick_config(false));
        pipeline.add_bridge(
            Bridge::new(RecordingSink::new("sink")),
            4,
            OverflowPolicy::Block,
        );
        let connector = ScriptedConnector::new(vec![Err(SourceError::Open {
            device: "COM5".into(),
            reason: "not found".into(),
        })]);

        let result = pipeline.run(connector, CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(PipelineError::Source(SourceError::Open { .. }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_open_failure_is_fatal_even_with_reconnect() {
        // Arrange
        let mut pipeline = Pipeline::new(PipelineConfig::default());
        pipeline.add_bridge(
            Bridge::new(RecordingSink::new("sink")),
            4,
            OverflowPolicy::Block,
        );
        let connector = ScriptedConnector::new(vec![Err(SourceError::Open {
            device: "COM9".into(),
            reason: "not found".into(),
        })]);

        // Act
        let result = tokio::time::timeout(
            Duration::from_secs(3600),
            pipeline.run(connector, CancellationToken::new()),
        )
        .await
        .expect("pipeline should stop instead of retrying");

        // Assert
        assert!(matches!(
            result,
            Err(PipelineError::Source(SourceError::Open { .. }))
        ));
    }

    #[tokio::test]
    async fn test_reopen_failure_after_a_disconnect_keeps_retrying() {
        // Arrange: connected once, then one failed reopen, then a good source.
        let sink = RecordingSink::new("sink");
        let mut pipeline = Pipeline::new(quick_config(true));
        pipeline.add_bridge(Bridge::new(sink.clone()), 4, OverflowPolicy::Block);
        let connector = ScriptedConnector::new(vec![
            Ok(ScriptedSource::from_chunks(["\nA\r"]).then_fail()),
            Err(SourceError::Open {
                device: "COM5".into(),
                reason: "busy".into(),
            }),
            Ok(ScriptedSource::from_chunks(["\nB\r"]).then_hang()),
        ]);
        let cancel = CancellationToken::new();
        let run = tokio::spawn(pipeline.run(connector, cancel.clone()));

        // Act
        tokio::time::timeout(Duration::from_secs(5), async {
            while sink.delivered().len() < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        cancel.cancel();

        // Assert
        let report = run.await.unwrap().unwrap();
        assert_eq!(texts(&sink), vec!["A", "B"]);
        assert_eq!(report.reconnects, 2);
    }

    #[tokio::test]
    async fn test_reconnect_discards_partial_record() {
        // Arrange: the first source dies mid-record, the second starts fresh.
        let sink = RecordingSink::new("sink");
        let mut pipeline = Pipeline::new(quick_config(true));
        pipeline.add_bridge(Bridge::new(sink.clone()), 4, OverflowPolicy::Block);
        let connector = ScriptedConnector::new(vec![
            Ok(ScriptedSource::from_chunks(["\nAB"]).then_fail()),
            Ok(ScriptedSource::from_chunks(["C\r\nD\r"]).then_hang()),
        ]);
        let cancel = CancellationToken::new();
        let run = tokio::spawn(pipeline.run(connector, cancel.clone()));

        // Act
        tokio::time::timeout(Duration::from_secs(5), async {
            while sink.delivered().len() < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        cancel.cancel();

        // Assert
        let report = run.await.unwrap().unwrap();
        assert_eq!(texts(&sink), vec!["C", "D"]);
        assert_eq!(report.reconnects, 1);
    }

    #[tokio::test]
    async fn test_cancel_stops_a_silent_source() {
        let mut pipeline = Pipeline::new(quick_config(true));
        pipeline.add_bridge(
            Bridge::new(RecordingSink::new("sink")),
            4,
            OverflowPolicy::Block,
        );
        let connector = ScriptedConnector::new(vec![Ok(ScriptedSource::hanging())]);
        let cancel = CancellationToken::new();
        let run = tokio::spawn(pipeline.run(connector, cancel.clone()));

        cancel.cancel();

        let report = run.await.unwrap().unwrap();
        assert_eq!(report.records, 0);
    }

    #[tokio::test]
    async fn test_all_bridges_stopped_ends_the_run() {
        // Arrange: the only bridge stops on its first failure.
        let sink = RecordingSink::new("sink").fail_on("1");
        let mut pipeline = Pipeline::new(quick_config(false));
        pipeline.add_bridge(
            Bridge::new(sink).with_failure_policy(crate::application::bridge::SinkFailurePolicy::Stop),
            1,
            OverflowPolicy::Block,
        );
        let mut input = Vec::new();
        for i in 0..20 {
            input.extend_from_slice(format!("\n{i}\r").as_bytes());
        }
        let source = ScriptedSource::from_chunks([input.as_slice()]);

        // Act
        let result = pipeline
            .run(ScriptedConnector::new(vec![Ok(source)]), CancellationToken::new())
            .await;

        // Assert
        assert!(matches!(
            result,
            Err(PipelineError::FanOut(FanOutError::AllOutputsClosed { count: 1 }))
        ));
    }
}
