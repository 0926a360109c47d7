//! Serial device source built on the `serialport` crate.
//!
//! `serialport` is blocking, so opening and every read run on the blocking
//! thread pool.  Reads use a short port timeout and loop on `TimedOut`, which
//! keeps each blocking call brief enough that a cancelled read releases the
//! port quickly.

use std::io::{self, Read};
use std::time::Duration;

use async_trait::async_trait;
use serialport::SerialPort;
use tracing::debug;

use crate::application::pipeline::READ_BUFFER_SIZE;
use crate::application::source::{ByteSource, SourceConnector, SourceError};

/// Upper bound on how long one blocking read may wait for data.
const PORT_READ_TIMEOUT: Duration = Duration::from_millis(200);

/// Opens `device` at `baud`, 8N1, no flow control.
#[derive(Debug, Clone)]
pub struct SerialConnector {
    device: String,
    baud: u32,
}

impl SerialConnector {
    pub fn new(device: impl Into<String>, baud: u32) -> Self {
        Self {
            device: device.into(),
            baud,
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn baud(&self) -> u32 {
        self.baud
    }
}

#[async_trait]
impl SourceConnector for SerialConnector {
    type Source = SerialSource;

    fn describe(&self) -> String {
        format!("serial device '{}' at {} baud", self.device, self.baud)
    }

    async fn connect(&mut self) -> Result<SerialSource, SourceError> {
        let device = self.device.clone();
        let baud = self.baud;
        let opened = tokio::task::spawn_blocking(move || {
            serialport::new(device, baud)
                .timeout(PORT_READ_TIMEOUT)
                .open()
        })
        .await
        .map_err(|e| SourceError::Io(io::Error::other(e)))?;

        let port = opened.map_err(|e| SourceError::Open {
            device: self.device.clone(),
            reason: e.to_string(),
        })?;
        Ok(SerialSource {
            port: Some(port),
            device: self.device.clone(),
        })
    }
}

/// An open serial port.
pub struct SerialSource {
    /// `None` while a blocking read owns the port.
    port: Option<Box<dyn SerialPort>>,
    device: String,
}

#[async_trait]
impl ByteSource for SerialSource {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        let want = buf.len().min(READ_BUFFER_SIZE);
        loop {
            // A read cancelled mid-flight leaves the port on the blocking
            // thread, and this source is unusable afterwards.
            let mut port = self.port.take().ok_or(SourceError::Closed)?;
            let (port, result) = tokio::task::spawn_blocking(move || {
                let mut chunk = vec![0u8; want];
                let result = port.read(&mut chunk).map(|n| {
                    chunk.truncate(n);
                    chunk
                });
                (port, result)
            })
            .await
            .map_err(|e| SourceError::Io(io::Error::other(e)))?;
            self.port = Some(port);

            match result {
                Ok(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    return Ok(chunk.len());
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("read from {} failed: {e}", self.device);
                    return Err(SourceError::Io(e));
                }
            }
        }
    }
}
