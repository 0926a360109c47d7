//! In-memory sinks and sources for tests.
//!
//! The real adapters need a serial device, a desktop session or a network.
//! These stand-ins record what they are given into `Mutex<Vec<...>>` fields
//! or replay scripted bytes, so pipeline behaviour can be asserted exactly.
//!
//! ```ignore
//! let sink = RecordingSink::new("clipboard");
//! pipeline.add_bridge(Bridge::new(sink.clone()), 16, OverflowPolicy::Block);
//! pipeline.run(ScriptedConnector::new(vec![Ok(source)]), cancel).await?;
//! assert_eq!(sink.delivered().len(), 3);
//! ```

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use rfid_core::ScanRecord;

use crate::application::bridge::{RecordSink, SinkError};
use crate::application::source::{ByteSource, SourceConnector, SourceError};

/// A sink that keeps every record it is given.
///
/// Clones share the same record list, so a test can keep one clone and move
/// the other into a bridge.
#[derive(Clone)]
pub struct RecordingSink {
    name: String,
    delivered: Arc<Mutex<Vec<ScanRecord>>>,
    fail_on: Option<String>,
}

impl RecordingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delivered: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
        }
    }

    /// Fails delivery of any record whose text equals `text`.
    pub fn fail_on(mut self, text: impl Into<String>) -> Self {
        self.fail_on = Some(text.into());
        self
    }

    pub fn delivered(&self) -> MutexGuard<'_, Vec<ScanRecord>> {
        self.delivered.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, record: &ScanRecord) -> Result<(), SinkError> {
        if self.fail_on.as_deref() == Some(record.as_str()) {
            return Err(SinkError::Http("mock failure".into()));
        }
        self.delivered().push(record.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptEnd {
    EndOfStream,
    Fail,
    Hang,
}

/// A byte source that replays fixed chunks, then ends, fails or hangs.
pub struct ScriptedSource {
    chunks: VecDeque<Vec<u8>>,
    end: ScriptEnd,
}

impl ScriptedSource {
    /// Empty chunks are dropped; a zero-length read means end of stream.
    pub fn from_chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        Self {
            chunks: chunks
                .into_iter()
                .map(|c| c.as_ref().to_vec())
                .filter(|c| !c.is_empty())
                .collect(),
            end: ScriptEnd::EndOfStream,
        }
    }

    /// A source that never produces anything.
    pub fn hanging() -> Self {
        Self::from_chunks(Vec::<Vec<u8>>::new()).then_hang()
    }

    /// After the chunks, return an I/O error as an unplugged device would.
    pub fn then_fail(mut self) -> Self {
        self.end = ScriptEnd::Fail;
        self
    }

    /// After the chunks, block forever.
    pub fn then_hang(mut self) -> Self {
        self.end = ScriptEnd::Hang;
        self
    }
}

#[async_trait]
impl ByteSource for ScriptedSource {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if let Some(mut chunk) = self.chunks.pop_front() {
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.chunks.push_front(chunk.split_off(n));
            }
            return Ok(n);
        }
        match self.end {
            ScriptEnd::EndOfStream => Ok(0),
            ScriptEnd::Fail => Err(SourceError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "device unplugged",
            ))),
            ScriptEnd::Hang => std::future::pending().await,
        }
    }
}

/// Hands out scripted connection attempts in order.
///
/// Once the script is used up every further attempt fails to open.
pub struct ScriptedConnector {
    attempts: VecDeque<Result<ScriptedSource, SourceError>>,
}

impl ScriptedConnector {
    pub fn new(attempts: Vec<Result<ScriptedSource, SourceError>>) -> Self {
        Self {
            attempts: attempts.into(),
        }
    }
}

#[async_trait]
impl SourceConnector for ScriptedConnector {
    type Source = ScriptedSource;

    fn describe(&self) -> String {
        "scripted source".to_string()
    }

    async fn connect(&mut self) -> Result<ScriptedSource, SourceError> {
        self.attempts.pop_front().unwrap_or_else(|| {
            Err(SourceError::Open {
                device: self.describe(),
                reason: "script exhausted".to_string(),
            })
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
