//! Byte-stream framing: turns the reader's raw bytes into [`ScanRecord`]s.
//!
//! [`ScanRecord`]: crate::domain::record::ScanRecord

pub mod framer;

pub use framer::{
    records, FramerState, FramingError, Records, StreamFramer, DEFAULT_MAX_RECORD_LEN, END_BYTE,
    START_BYTE,
};
