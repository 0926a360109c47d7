//! Infrastructure layer: OS and network adapters.
//!
//! - `source`    – serial device and simulator byte sources
//! - `clipboard` – system clipboard output
//! - `api`       – HTTP form POST output
//! - `keyboard`  – key injection output (`SendInput`, XTest, CoreGraphics)
//! - `terminal`  – exit key and raw-mode-safe log writer
//! - `storage`   – TOML configuration file
//! - `mock`      – scripted sources and recording sinks for tests

pub mod api;
pub mod clipboard;
pub mod keyboard;
pub mod mock;
pub mod source;
pub mod storage;
pub mod terminal;
