//! Delimiter-based stream framer.
//!
//! Wire format produced by the reader:
//! ```text
//! [LF=0x0A][payload bytes ...][CR=0x0D]
//! ```
//! There is no length prefix and no checksum.  A frame is everything strictly
//! between a START and the next END.
//!
//! # Rules
//!
//! | Incoming byte | Effect                                                      |
//! |---------------|-------------------------------------------------------------|
//! | END (CR)      | buffer (possibly empty) becomes a record; buffer cleared    |
//! | START (LF)    | buffer cleared, nothing emitted ("last START wins")        |
//! | anything else | appended; exceeding the bound is a fatal overflow           |
//!
//! An overflow almost always means the serial port is running at the wrong
//! baud rate, so the delimiters never decode.  It is not retried: the framer
//! stays poisoned until [`StreamFramer::reset`] is called.

use thiserror::Error;

use crate::domain::record::ScanRecord;

/// ASCII LF, opens a frame.
pub const START_BYTE: u8 = 0x0A;

/// ASCII CR, closes a frame.
pub const END_BYTE: u8 = 0x0D;

/// Largest record, in raw bytes, the framer accepts.
pub const DEFAULT_MAX_RECORD_LEN: usize = 1024;

/// Errors produced by the framer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FramingError {
    /// The in-progress record grew past the configured bound.
    #[error("scan record exceeded {limit} bytes without an end delimiter (is the baud rate set correctly?)")]
    Overflow { limit: usize },
}

/// Observable state of the framer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramerState {
    /// Nothing buffered since the last END (or since construction/reset).
    Idle,
    /// A START or payload byte was seen; waiting for END.
    Accumulating,
    /// An overflow occurred; every further byte is rejected until reset.
    Failed,
}

/// Incremental framer: push bytes in, get completed records out.
#[derive(Debug, Clone)]
pub struct StreamFramer {
    buffer: Vec<u8>,
    max_len: usize,
    state: FramerState,
}

impl StreamFramer {
    /// Creates a framer with the default 1024-byte bound.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_RECORD_LEN)
    }

    /// Creates a framer with a custom record-length bound.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_len,
            state: FramerState::Idle,
        }
    }

    /// Feeds one byte.
    ///
    /// Returns `Ok(Some(record))` when `byte` completes a frame.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::Overflow`] when the buffered record exceeds the
    /// bound, and keeps returning it for every later byte until [`reset`].
    ///
    /// [`reset`]: StreamFramer::reset
    pub fn push(&mut self, byte: u8) -> Result<Option<ScanRecord>, FramingError> {
        if self.state == FramerState::Failed {
            return Err(self.overflow());
        }

        match byte {
            END_BYTE => {
                let record = ScanRecord::from_bytes(&self.buffer);
                self.buffer.clear();
                self.state = FramerState::Idle;
                Ok(Some(record))
            }
            START_BYTE => {
                self.buffer.clear();
                self.state = FramerState::Accumulating;
                Ok(None)
            }
            other => {
                self.buffer.push(other);
                self.state = FramerState::Accumulating;
                if self.buffer.len() > self.max_len {
                    self.buffer.clear();
                    self.state = FramerState::Failed;
                    return Err(self.overflow());
                }
                Ok(None)
            }
        }
    }

    /// Discards any partial record and clears a previous overflow.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = FramerState::Idle;
    }

    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Bytes currently held for the in-progress record.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    fn overflow(&self) -> FramingError {
        FramingError::Overflow {
            limit: self.max_len,
        }
    }
}

impl Default for StreamFramer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy record sequence over any byte iterator.
///
/// Yields each completed record in order.  After the first error it yields
/// that error once and then ends.
pub struct Records<I> {
    bytes: I,
    framer: StreamFramer,
    done: bool,
}

impl<I> Records<I>
where
    I: Iterator<Item = u8>,
{
    pub fn new(bytes: I, framer: StreamFramer) -> Self {
        Self {
            bytes,
            framer,
            done: false,
        }
    }
}

impl<I> Iterator for Records<I>
where
    I: Iterator<Item = u8>,
{
    type Item = Result<ScanRecord, FramingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        for byte in self.bytes.by_ref() {
            match self.framer.push(byte) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        self.done = true;
        None
    }
}

impl<I> std::iter::FusedIterator for Records<I> where I: Iterator<Item = u8> {}

/// Frames `bytes` with the default bound.
///
/// ```rust
/// use rfid_core::framing::records;
///
/// let out: Vec<_> = records(*b"\n34\r").collect();
/// assert_eq!(out.len(), 1);
/// assert_eq!(out[0].as_ref().unwrap().as_str(), "34");
/// ```
pub fn records<B>(bytes: B) -> Records<B::IntoIter>
where
    B: IntoIterator<Item = u8>,
{
    Records::new(bytes.into_iter(), StreamFramer::new())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_all(bytes: &[u8]) -> Vec<Result<ScanRecord, FramingError>> {
        records(bytes.iter().copied()).collect()
    }

    #[test]
    fn test_single_frame_emits_payload() {
        // Arrange
        let input = [START_BYTE, b'3', b'4', END_BYTE];

        // Act
        let out = frame_all(&input);

        // Assert
        assert_eq!(out, vec![Ok(ScanRecord::from("34"))]);
    }

    #[test]
    fn test_second_start_discards_partial_record() {
        let input = [START_BYTE, b'A', START_BYTE, b'B', END_BYTE];
        assert_eq!(frame_all(&input), vec![Ok(ScanRecord::from("B"))]);
    }

    #[test]
    fn test_start_then_end_emits_empty_record() {
        let out = frame_all(&[START_BYTE, END_BYTE]);
        assert_eq!(out.len(), 1);
        assert!(out[0].as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_consecutive_end_bytes_each_emit_a_record() {
        let out = frame_all(&[START_BYTE, b'7', END_BYTE, END_BYTE]);
        assert_eq!(
            out,
            vec![Ok(ScanRecord::from("7")), Ok(ScanRecord::from(""))]
        );
    }

    #[test]
    fn test_no_delimiters_emits_nothing() {
        assert!(frame_all(b"3456GA8680").is_empty());
    }

    #[test]
    fn test_bytes_before_first_start_are_accumulated() {
        // The framer does not require a START; END alone closes the buffer.
        assert_eq!(frame_all(b"AB\r"), vec![Ok(ScanRecord::from("AB"))]);
    }

    #[test]
    fn test_non_printable_bytes_are_kept_verbatim() {
        let out = frame_all(&[START_BYTE, 0x00, 0x7F, 0xFF, END_BYTE]);
        let record = out[0].as_ref().unwrap();
        assert_eq!(record.raw_len(), 3);
        assert_eq!(record.as_str(), "\u{0}\u{7F}\u{FF}");
    }

    #[test]
    fn test_record_at_exact_bound_is_accepted() {
        // Arrange
        let mut input = vec![START_BYTE];
        input.extend(std::iter::repeat(b'9').take(DEFAULT_MAX_RECORD_LEN));
        input.push(END_BYTE);

        // Act
        let out = frame_all(&input);

        // Assert
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_ref().unwrap().raw_len(), DEFAULT_MAX_RECORD_LEN);
    }

    #[test]
    fn test_record_over_bound_overflows_without_emitting() {
        // Arrange
        let mut input = vec![b'9'; DEFAULT_MAX_RECORD_LEN + 1];
        input.push(END_BYTE);

        // Act
        let out = frame_all(&input);

        // Assert: one error, then the iterator is finished.
        assert_eq!(
            out,
            vec![Err(FramingError::Overflow {
                limit: DEFAULT_MAX_RECORD_LEN
            })]
        );
    }

    #[test]
    fn test_framer_stays_failed_after_overflow_until_reset() {
        // Arrange
        let mut framer = StreamFramer::with_max_len(2);
        framer.push(b'a').unwrap();
        framer.push(b'b').unwrap();
        assert!(framer.push(b'c').is_err());

        // Act / Assert: delimiters no longer complete anything.
        assert_eq!(framer.state(), FramerState::Failed);
        assert!(framer.push(START_BYTE).is_err());
        assert!(framer.push(END_BYTE).is_err());

        framer.reset();
        assert_eq!(framer.state(), FramerState::Idle);
        framer.push(START_BYTE).unwrap();
        framer.push(b'x').unwrap();
        assert_eq!(
            framer.push(END_BYTE).unwrap(),
            Some(ScanRecord::from("x"))
        );
    }

    #[test]
    fn test_start_resets_length_count() {
        // Two halves each under the bound, separated by START, never overflow.
        let mut framer = StreamFramer::with_max_len(4);
        for b in b"abcd" {
            framer.push(*b).unwrap();
        }
        framer.push(START_BYTE).unwrap();
        for b in b"efgh" {
            framer.push(*b).unwrap();
        }
        assert_eq!(framer.push(END_BYTE).unwrap(), Some(ScanRecord::from("efgh")));
    }

    #[test]
    fn test_state_transitions_follow_delimiters() {
        let mut framer = StreamFramer::new();
        assert_eq!(framer.state(), FramerState::Idle);

        framer.push(START_BYTE).unwrap();
        assert_eq!(framer.state(), FramerState::Accumulating);

        framer.push(b'1').unwrap();
        assert_eq!(framer.state(), FramerState::Accumulating);
        assert_eq!(framer.buffered_len(), 1);

        framer.push(END_BYTE).unwrap();
        assert_eq!(framer.state(), FramerState::Idle);
        assert_eq!(framer.buffered_len(), 0);
    }

    #[test]
    fn test_reset_discards_partial_record() {
        let mut framer = StreamFramer::new();
        framer.push(START_BYTE).unwrap();
        framer.push(b'Z').unwrap();

        framer.reset();

        assert_eq!(framer.push(END_BYTE).unwrap(), Some(ScanRecord::from("")));
    }

    #[test]
    fn test_records_are_emitted_lazily() {
        // Arrange: an infinite byte source repeating one frame.
        let endless = [START_BYTE, b'4', b'2', END_BYTE].into_iter().cycle();

        // Act
        let first_three: Vec<_> = Records::new(endless, StreamFramer::new())
            .take(3)
            .collect();

        // Assert
        assert_eq!(first_three.len(), 3);
        assert!(first_three
            .iter()
            .all(|r| r.as_ref().unwrap().as_str() == "42"));
    }

    #[test]
    fn test_overflow_error_message_mentions_baud() {
        let err = FramingError::Overflow { limit: 1024 };
        assert!(err.to_string().contains("baud"));
    }
}
