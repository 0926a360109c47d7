//! Application layer: the framing pipeline, fan-out and output bridges.
//!
//! Nothing here touches the OS.  Devices, the clipboard, the network and key
//! injection are reached through the [`source::SourceConnector`] and
//! [`bridge::RecordSink`] traits, implemented in `infrastructure`.

pub mod bridge;
pub mod fan_out;
pub mod pipeline;
pub mod source;
