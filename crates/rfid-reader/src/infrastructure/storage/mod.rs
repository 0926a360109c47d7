//! Storage infrastructure: the TOML configuration file.
//!
//! `config` reads the file from the platform config directory (or an explicit
//! path), fills gaps with defaults and resolves it into a
//! [`ReaderConfig`](crate::domain::config::ReaderConfig).

pub mod config;
