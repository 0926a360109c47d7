//! Runtime configuration for the reader.
//!
//! [`ReaderConfig`] is the single source of truth for every runtime setting.
//! It is a plain struct: no file or environment reads happen here.  The
//! binary builds it from the TOML file plus CLI overrides
//! (see `infrastructure::storage::config`), and tests build it directly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default serial device of the reference deployment.
#[cfg(target_os = "windows")]
pub const DEFAULT_DEVICE: &str = "COM5";
#[cfg(not(target_os = "windows"))]
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// The readers in use talk at 2400 baud.
pub const DEFAULT_BAUD: u32 = 2400;

/// What to do when a bridge's queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Wait for space.  A slow bridge slows the whole pipeline.
    #[default]
    Block,
    /// Drop the record for this bridge only.
    DropNewest,
}

/// Which local output receives each scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    Clipboard,
    Keyboard,
}

/// Where raw bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSettings {
    Serial { device: String, baud: u32 },
    /// Emits the built-in sample readings, one every `interval`.
    Simulated { interval: Duration },
}

/// Settings for the HTTP API bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub endpoint: String,
    pub debounce: Duration,
    pub timeout: Duration,
}

/// Settings for the keyboard bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardSettings {
    /// Type Enter after each record.
    pub press_enter: bool,
    /// Pause before the first keystroke so the user can focus a window.
    pub start_delay: Duration,
    /// `None` disables debouncing.
    pub debounce: Option<Duration>,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            press_enter: true,
            start_delay: default_keyboard_start_delay(),
            debounce: None,
        }
    }
}

/// X11 needs a moment to register a freshly created XTest client.
fn default_keyboard_start_delay() -> Duration {
    if cfg!(target_os = "linux") {
        Duration::from_secs(2)
    } else {
        Duration::ZERO
    }
}

/// All runtime configuration for one reader session.
///
/// ```rust
/// use rfid_reader::domain::config::{ReaderConfig, SourceSettings};
///
/// let cfg = ReaderConfig::default();
/// assert!(matches!(cfg.source, SourceSettings::Serial { baud: 2400, .. }));
/// assert_eq!(cfg.max_record_len, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    pub source: SourceSettings,
    /// Reopen the source after it fails or closes.  When `false` a source
    /// failure ends the session.
    pub reconnect: bool,
    pub reconnect_interval: Duration,
    pub max_record_len: usize,
    /// Capacity of each bridge's record queue.
    pub queue_capacity: usize,
    pub overflow_policy: OverflowPolicy,
    pub output: OutputMode,
    pub keyboard: KeyboardSettings,
    /// `None` when the API bridge is disabled or has no endpoint.
    pub api: Option<ApiSettings>,
    /// `None` disables the exit-key watcher (Ctrl-C still works).
    pub exit_key: Option<char>,
    pub log_level: String,
}

impl ReaderConfig {
    pub fn is_test_mode(&self) -> bool {
        matches!(self.source, SourceSettings::Simulated { .. })
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            source: SourceSettings::Serial {
                device: DEFAULT_DEVICE.to_string(),
                baud: DEFAULT_BAUD,
            },
            reconnect: true,
            reconnect_interval: Duration::from_secs(5),
            max_record_len: rfid_core::DEFAULT_MAX_RECORD_LEN,
            queue_capacity: 16,
            overflow_policy: OverflowPolicy::Block,
            output: OutputMode::Clipboard,
            keyboard: KeyboardSettings::default(),
            api: None,
            exit_key: Some('q'),
            log_level: "info".to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_source_is_serial_at_2400_baud() {
        // Arrange / Act
        let cfg = ReaderConfig::default();

        // Assert
        assert_eq!(
            cfg.source,
            SourceSettings::Serial {
                device: DEFAULT_DEVICE.to_string(),
                baud: 2400
            }
        );
        assert!(!cfg.is_test_mode());
    }

    #[test]
    fn test_default_output_is_clipboard_with_q_exit_key() {
        let cfg = ReaderConfig::default();
        assert_eq!(cfg.output, OutputMode::Clipboard);
        assert_eq!(cfg.exit_key, Some('q'));
    }

    #[test]
    fn test_default_queue_settings() {
        let cfg = ReaderConfig::default();
        assert_eq!(cfg.queue_capacity, 16);
        assert_eq!(cfg.overflow_policy, OverflowPolicy::Block);
    }

    #[test]
    fn test_simulated_source_is_test_mode() {
        let cfg = ReaderConfig {
            source: SourceSettings::Simulated {
                interval: Duration::from_secs(5),
            },
            ..Default::default()
        };
        assert!(cfg.is_test_mode());
    }

    #[test]
    fn test_overflow_policy_uses_snake_case_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: OverflowPolicy,
        }
        let w: Wrapper = toml::from_str("policy = \"drop_newest\"").unwrap();
        assert_eq!(w.policy, OverflowPolicy::DropNewest);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_keyboard_start_delay_is_two_seconds_on_linux() {
        assert_eq!(KeyboardSettings::default().start_delay, Duration::from_secs(2));
    }
}
