//! TOML configuration file for the reader.
//!
//! Default locations:
//! - Windows:  `%APPDATA%\RfidReader\config.toml`
//! - Linux:    `~/.config/rfid-reader/config.toml`
//! - macOS:    `~/Library/Application Support/RfidReader/config.toml`
//!
//! Every field has a default, so a missing file, an empty file and a file
//! from an older version all load.  Example:
//!
//! ```toml
//! [reader]
//! output = "keyboard"
//! exit_key = "q"
//!
//! [serial]
//! device = "/dev/ttyUSB0"
//! baud = 2400
//!
//! [api]
//! endpoint = "https://members.example.org/scan/"
//! debounce_ms = 1000
//! ```
//!
//! Durations are stored as whole milliseconds.  The file is resolved into a
//! [`ReaderConfig`] by [`FileConfig::resolve`], which also validates it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::domain::config::{
    ApiSettings, KeyboardSettings, OutputMode, OverflowPolicy, ReaderConfig, SourceSettings,
    DEFAULT_BAUD, DEFAULT_DEVICE,
};
use crate::infrastructure::api::DEFAULT_TEST_ENDPOINT;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed but is out of range.
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    #[serde(default)]
    pub reader: ReaderSection,
    #[serde(default)]
    pub serial: SerialSection,
    #[serde(default)]
    pub simulator: SimulatorSection,
    #[serde(default)]
    pub framing: FramingSection,
    #[serde(default)]
    pub fan_out: FanOutSection,
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub keyboard: KeyboardSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReaderSection {
    /// `tracing` filter, e.g. `"info"` or `"rfid_reader=debug"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub output: OutputMode,
    /// A single character; empty disables the exit key.
    #[serde(default = "default_exit_key")]
    pub exit_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SerialSection {
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_baud")]
    pub baud: u32,
    #[serde(default = "default_true")]
    pub reconnect: bool,
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulatorSection {
    #[serde(default = "default_simulator_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FramingSection {
    #[serde(default = "default_max_record_len")]
    pub max_record_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FanOutSection {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default)]
    pub overflow_policy: OverflowPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Live endpoint.  Empty means "not configured".
    #[serde(default)]
    pub endpoint: String,
    /// Endpoint used in test mode.
    #[serde(default = "default_test_endpoint")]
    pub test_endpoint: String,
    #[serde(default = "default_api_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_api_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyboardSection {
    #[serde(default = "default_true")]
    pub press_enter: bool,
    #[serde(default = "default_keyboard_start_delay_ms")]
    pub start_delay_ms: u64,
    /// 0 disables debouncing.
    #[serde(default)]
    pub debounce_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_exit_key() -> String {
    "q".to_string()
}
fn default_device() -> String {
    DEFAULT_DEVICE.to_string()
}
fn default_baud() -> u32 {
    DEFAULT_BAUD
}
fn default_true() -> bool {
    true
}
fn default_reconnect_interval_ms() -> u64 {
    5_000
}
fn default_simulator_interval_ms() -> u64 {
    5_000
}
fn default_max_record_len() -> usize {
    rfid_core::DEFAULT_MAX_RECORD_LEN
}
fn default_queue_capacity() -> usize {
    16
}
fn default_test_endpoint() -> String {
    DEFAULT_TEST_ENDPOINT.to_string()
}
fn default_api_debounce_ms() -> u64 {
    1_000
}
fn default_api_timeout_ms() -> u64 {
    10_000
}
fn default_keyboard_start_delay_ms() -> u64 {
    KeyboardSettings::default().start_delay.as_millis() as u64
}

impl Default for ReaderSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            output: OutputMode::default(),
            exit_key: default_exit_key(),
        }
    }
}

impl Default for SerialSection {
    fn default() -> Self {
        Self {
            device: default_device(),
            baud: default_baud(),
            reconnect: default_true(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
        }
    }
}

impl Default for SimulatorSection {
    fn default() -> Self {
        Self {
            interval_ms: default_simulator_interval_ms(),
        }
    }
}

impl Default for FramingSection {
    fn default() -> Self {
        Self {
            max_record_len: default_max_record_len(),
        }
    }
}

impl Default for FanOutSection {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            endpoint: String::new(),
            test_endpoint: default_test_endpoint(),
            debounce_ms: default_api_debounce_ms(),
            timeout_ms: default_api_timeout_ms(),
        }
    }
}

impl Default for KeyboardSection {
    fn default() -> Self {
        Self {
            press_enter: default_true(),
            start_delay_ms: default_keyboard_start_delay_ms(),
            debounce_ms: 0,
        }
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

impl FileConfig {
    /// Validates the file and turns it into the runtime configuration.
    ///
    /// In test mode the simulator replaces the serial device and the API
    /// bridge targets `api.test_endpoint`.  In live mode an empty
    /// `api.endpoint` disables the API bridge.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for zero sizes, a zero baud rate, a
    /// zero simulator interval or an exit key longer than one character.
    pub fn resolve(self, test_mode: bool) -> Result<ReaderConfig, ConfigError> {
        self.validate()?;
        let FileConfig {
            reader,
            serial,
            simulator,
            framing,
            fan_out,
            api,
            keyboard,
        } = self;

        let source = if test_mode {
            SourceSettings::Simulated {
                interval: Duration::from_millis(simulator.interval_ms),
            }
        } else {
            SourceSettings::Serial {
                device: serial.device,
                baud: serial.baud,
            }
        };

        let endpoint = if test_mode {
            api.test_endpoint
        } else {
            api.endpoint
        };
        let api = if !api.enabled {
            None
        } else if endpoint.trim().is_empty() {
            warn!("no API endpoint configured; scans will not be sent to the server");
            None
        } else {
            Some(ApiSettings {
                endpoint,
                debounce: Duration::from_millis(api.debounce_ms),
                timeout: Duration::from_millis(api.timeout_ms),
            })
        };

        Ok(ReaderConfig {
            source,
            reconnect: serial.reconnect,
            reconnect_interval: Duration::from_millis(serial.reconnect_interval_ms),
            max_record_len: framing.max_record_len,
            queue_capacity: fan_out.queue_capacity,
            overflow_policy: fan_out.overflow_policy,
            output: reader.output,
            keyboard: KeyboardSettings {
                press_enter: keyboard.press_enter,
                start_delay: Duration::from_millis(keyboard.start_delay_ms),
                debounce: (keyboard.debounce_ms > 0)
                    .then(|| Duration::from_millis(keyboard.debounce_ms)),
            },
            api,
            exit_key: reader.exit_key.chars().next(),
            log_level: reader.log_level,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &str) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            }
        }

        if self.serial.baud == 0 {
            return Err(invalid("serial.baud", "must be greater than zero"));
        }
        if self.framing.max_record_len == 0 {
            return Err(invalid("framing.max_record_len", "must be greater than zero"));
        }
        if self.fan_out.queue_capacity == 0 {
            return Err(invalid("fan_out.queue_capacity", "must be greater than zero"));
        }
        if self.simulator.interval_ms == 0 {
            return Err(invalid("simulator.interval_ms", "must be greater than zero"));
        }
        if self.reader.exit_key.chars().count() > 1 {
            return Err(invalid("reader.exit_key", "must be a single character"));
        }
        Ok(())
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(platform_config_dir()
        .ok_or(ConfigError::NoPlatformConfigDir)?
        .join("config.toml"))
}

/// Loads the config at the default location.  See [`load_config_from`].
pub fn load_config() -> Result<FileConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `path`, returning `FileConfig::default()` if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<FileConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &FileConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("RfidReader"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("rfid-reader"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("RfidReader")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
