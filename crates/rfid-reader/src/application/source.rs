//! Byte source abstraction.
//!
//! A [`SourceConnector`] opens a fresh [`ByteSource`] on demand, which lets
//! the pipeline reconnect after a device is unplugged without knowing what
//! kind of device it is.  Implementations live in
//! `infrastructure::source`.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while opening or reading a source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not open {device}: {reason}")]
    Open { device: String, reason: String },
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
    /// The source ended or was torn down while a read was in flight.
    #[error("source closed")]
    Closed,
}

/// A stream of raw bytes.
#[async_trait]
pub trait ByteSource: Send {
    /// Reads up to `buf.len()` bytes.  `Ok(0)` means end of stream.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;
}

/// Opens byte sources.
#[async_trait]
pub trait SourceConnector: Send + 'static {
    type Source: ByteSource + 'static;

    /// Human-readable description for logs, e.g. the device path.
    fn describe(&self) -> String;

    async fn connect(&mut self) -> Result<Self::Source, SourceError>;
}
