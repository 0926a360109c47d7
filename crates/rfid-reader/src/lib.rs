//! rfid-reader library entry point.
//!
//! Shared by the `rfid-reader` binary and the integration tests in `tests/`.
//!
//! The reader turns a stream of bytes from a serial RFID or magstripe reader
//! into discrete scans and hands every scan to each configured output:
//!
//! ```text
//! serial device ─┐                      ┌─▶ clipboard / keyboard bridge
//!                ├─▶ framer ─▶ fan-out ─┤
//! simulator ─────┘                      └─▶ API bridge (debounced)
//! ```
//!
//! Framing and debouncing live in `rfid-core`; this crate owns the async
//! pipeline, the OS adapters and configuration.

/// Domain layer: configuration types.
pub mod domain;

/// Application layer: pipeline, fan-out and bridges.
pub mod application;

/// Infrastructure layer: devices, outputs, terminal and config storage.
pub mod infrastructure;
