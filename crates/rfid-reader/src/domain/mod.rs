//! Domain layer: runtime configuration types.

pub mod config;
