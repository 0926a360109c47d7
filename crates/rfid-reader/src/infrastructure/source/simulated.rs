//! Simulated reader for development without hardware.
//!
//! Cycles through [`SAMPLE_READINGS`] forever.  The first reading is
//! available immediately; each later one arrives `interval` after the
//! previous.

use std::time::Duration;

use async_trait::async_trait;

use rfid_core::framing::{END_BYTE, START_BYTE};

use crate::application::source::{ByteSource, SourceConnector, SourceError};

/// Card and magstripe IDs the simulator replays.
pub const SAMPLE_READINGS: [&str; 3] = ["3456GA8680", "3001BFFFC1", "397EBBBBBKHOB1"];

pub const DEFAULT_SIMULATOR_INTERVAL: Duration = Duration::from_secs(5);

/// Wraps `payload` in the reader's frame delimiters.
pub fn frame(payload: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 2);
    out.push(START_BYTE);
    out.extend_from_slice(payload.as_bytes());
    out.push(END_BYTE);
    out
}

#[derive(Debug, Clone)]
pub struct SimulatedConnector {
    interval: Duration,
}

impl SimulatedConnector {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for SimulatedConnector {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATOR_INTERVAL)
    }
}

#[async_trait]
impl SourceConnector for SimulatedConnector {
    type Source = SimulatedSource;

    fn describe(&self) -> String {
        "simulated device".to_string()
    }

    async fn connect(&mut self) -> Result<SimulatedSource, SourceError> {
        Ok(SimulatedSource::new(self.interval))
    }
}

pub struct SimulatedSource {
    interval: Duration,
    next_reading: usize,
    pending: Vec<u8>,
    emitted_any: bool,
}

impl SimulatedSource {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_reading: 0,
            pending: Vec::new(),
            emitted_any: false,
        }
    }
}

#[async_trait]
impl ByteSource for SimulatedSource {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pending.is_empty() {
            if self.emitted_any {
                tokio::time::sleep(self.interval).await;
            }
            let reading = SAMPLE_READINGS[self.next_reading];
            self.next_reading = (self.next_reading + 1) % SAMPLE_READINGS.len();
            self.pending = frame(reading);
            self.emitted_any = true;
        }

        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rfid_core::records;

    async fn read_frames(source: &mut SimulatedSource, count: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 128];
        let mut frames = 0;
        while frames < count {
            let n = source.read(&mut buf).await.unwrap();
            frames += buf[..n].iter().filter(|b| **b == END_BYTE).count();
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[test]
    fn test_frame_wraps_payload_in_delimiters() {
        assert_eq!(frame("34"), vec![START_BYTE, b'3', b'4', END_BYTE]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulator_cycles_through_sample_readings() {
        // Arrange
        let mut source = SimulatedSource::new(Duration::from_secs(5));

        // Act
        let bytes = read_frames(&mut source, 4).await;

        // Assert
        let texts: Vec<String> = records(bytes)
            .map(|r| r.unwrap().to_string())
            .collect();
        assert_eq!(
            texts,
            vec!["3456GA8680", "3001BFFFC1", "397EBBBBBKHOB1", "3456GA8680"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_reading_is_immediate_and_later_ones_wait() {
        // Arrange
        let mut source = SimulatedSource::new(Duration::from_secs(5));
        let start = tokio::time::Instant::now();

        // Act / Assert
        read_frames(&mut source, 1).await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        read_frames(&mut source, 1).await;
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_small_buffers_receive_the_frame_in_pieces() {
        let mut source = SimulatedSource::new(Duration::from_secs(5));
        let mut buf = [0u8; 4];

        let n = source.read(&mut buf).await.unwrap();

        assert_eq!(n, 4);
        assert_eq!(&buf, &[START_BYTE, b'3', b'4', b'5']);
    }

    #[tokio::test]
    async fn test_connector_always_opens() {
        let mut connector = SimulatedConnector::default();
        assert!(connector.connect().await.is_ok());
        assert_eq!(connector.describe(), "simulated device");
    }
}
