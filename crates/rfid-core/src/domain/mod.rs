//! Domain entities for the RFID reader bridge.
//!
//! Pure values and rules with no I/O: the [`record::ScanRecord`] that flows
//! through the pipeline and the [`debounce::DebounceFilter`] each bridge may
//! put in front of its side effect.

pub mod debounce;
pub mod record;
