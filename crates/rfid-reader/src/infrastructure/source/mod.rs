//! Byte source adapters: a real serial device and the built-in simulator.

pub mod serial;
pub mod simulated;

pub use serial::{SerialConnector, SerialSource};
pub use simulated::{SimulatedConnector, SimulatedSource, SAMPLE_READINGS};
