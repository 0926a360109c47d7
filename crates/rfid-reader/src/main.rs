//! RFID Reader entry point.
//!
//! Loads the configuration, builds one bridge per output and runs the
//! pipeline until the exit key, Ctrl+C or a fatal error.
//!
//! # Usage
//!
//! ```text
//! rfid-reader [OPTIONS]
//!
//! Options:
//!   --device <PATH>         Serial device [env: RFID_DEVICE]
//!   --baud <RATE>           Baud rate [env: RFID_BAUD]
//!   --test                  Use the built-in simulator [env: RFID_TEST]
//!   --config <FILE>         Config file [env: RFID_CONFIG]
//!   --output <MODE>         clipboard | keyboard
//!   --no-api                Do not send scans to the API
//!   --api-endpoint <URL>    Live API endpoint [env: RFID_API_ENDPOINT]
//!   --log-level <FILTER>    Log filter when RUST_LOG is unset
//! ```
//!
//! Command-line values override the config file.  The process exits with 0
//! after a manual quit and non-zero when startup or the pipeline fails.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rfid_reader::application::bridge::Bridge;
use rfid_reader::application::pipeline::{Pipeline, PipelineConfig, PipelineReport};
use rfid_reader::domain::config::{OutputMode, ReaderConfig, SourceSettings};
use rfid_reader::infrastructure::api::ApiSink;
use rfid_reader::infrastructure::clipboard::{ClipboardSink, SystemClipboard};
use rfid_reader::infrastructure::keyboard::{platform_emitter, KeyboardSink};
use rfid_reader::infrastructure::source::{SerialConnector, SimulatedConnector};
use rfid_reader::infrastructure::storage::config::{
    load_config, load_config_from, ConfigError, FileConfig,
};
use rfid_reader::infrastructure::terminal::{wait_for_exit_key, CrLfStdout, ExitReason};

const REPOSITORY_URL: &str = "https://github.com/Protospace/rfid-reader";

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputArg {
    Clipboard,
    Keyboard,
}

impl From<OutputArg> for OutputMode {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Clipboard => OutputMode::Clipboard,
            OutputArg::Keyboard => OutputMode::Keyboard,
        }
    }
}

/// Reads scans from a serial RFID reader and forwards them to the
/// clipboard (or keyboard) and the member portal API.
#[derive(Debug, Parser)]
#[command(name = "rfid-reader", version)]
struct Cli {
    /// Serial device, e.g. `/dev/ttyUSB0` or `COM5`.
    #[arg(long, env = "RFID_DEVICE")]
    device: Option<String>,

    /// Serial baud rate.
    #[arg(long, env = "RFID_BAUD")]
    baud: Option<u32>,

    /// Use a simulated reader and the test API endpoint.
    #[arg(long, env = "RFID_TEST")]
    test: bool,

    /// Path to the TOML config file.  Defaults to the platform config
    /// directory.
    #[arg(long, env = "RFID_CONFIG")]
    config: Option<PathBuf>,

    /// Where scans go on this machine.
    #[arg(long, value_enum)]
    output: Option<OutputArg>,

    /// Do not send scans to the API.
    #[arg(long)]
    no_api: bool,

    /// Live API endpoint.
    #[arg(long, env = "RFID_API_ENDPOINT")]
    api_endpoint: Option<String>,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Reads the config file this invocation points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.  A
    /// missing platform config directory is not an error.
    fn load_file_config(&self) -> anyhow::Result<FileConfig> {
        match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config file {}", path.display())),
            None => match load_config() {
                Err(ConfigError::NoPlatformConfigDir) => Ok(FileConfig::default()),
                other => other.context("failed to load config file"),
            },
        }
    }

    /// Applies command-line overrides on top of the file values.
    fn apply_to(&self, file: &mut FileConfig) {
        if let Some(device) = &self.device {
            file.serial.device = device.clone();
        }
        if let Some(baud) = self.baud {
            file.serial.baud = baud;
        }
        if let Some(output) = self.output {
            file.reader.output = output.into();
        }
        if self.no_api {
            file.api.enabled = false;
        }
        if let Some(endpoint) = &self.api_endpoint {
            file.api.endpoint = endpoint.clone();
        }
        if let Some(level) = &self.log_level {
            file.reader.log_level = level.clone();
        }
    }

    /// Loads the file, applies overrides and returns the merged file
    /// configuration.
    fn into_file_config(self) -> anyhow::Result<(FileConfig, bool)> {
        let mut file = self.load_file_config()?;
        self.apply_to(&mut file);
        Ok((file, self.test))
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

/// Builds the pipeline with its local output and, if configured, the API
/// bridge.
///
/// # Errors
///
/// Returns an error if an output cannot be initialised (no clipboard, no X
/// display, an unparsable endpoint).
fn build_pipeline(cfg: &ReaderConfig) -> anyhow::Result<Pipeline> {
    let mut pipeline = Pipeline::new(PipelineConfig::from(cfg));

    let local = match cfg.output {
        OutputMode::Clipboard => {
            let backend = SystemClipboard::new().context("clipboard is unavailable")?;
            Bridge::new(ClipboardSink::new(Arc::new(backend)))
        }
        OutputMode::Keyboard => {
            let emitter = platform_emitter().context("keyboard emulation is unavailable")?;
            let sink = KeyboardSink::new(emitter)
                .with_enter(cfg.keyboard.press_enter)
                .with_start_delay(cfg.keyboard.start_delay);
            let bridge = Bridge::new(sink);
            match cfg.keyboard.debounce {
                Some(window) => bridge.with_debounce(window),
                None => bridge,
            }
        }
    };
    pipeline.add_bridge(local, cfg.queue_capacity, cfg.overflow_policy);

    if let Some(api) = &cfg.api {
        let sink = ApiSink::new(&api.endpoint, api.timeout)
            .with_context(|| format!("invalid API endpoint '{}'", api.endpoint))?;
        info!("sending scans to {}", sink.endpoint());
        pipeline.add_bridge(
            Bridge::new(sink).with_debounce(api.debounce),
            cfg.queue_capacity,
            cfg.overflow_policy,
        );
    }

    Ok(pipeline)
}

fn print_banner(cfg: &ReaderConfig) {
    println!();
    println!("Welcome to Protospace's RFID Reader Tool");
    println!("Visit the repository page for more information and support:");
    println!("\t{REPOSITORY_URL}");
    println!();
    if cfg.is_test_mode() {
        println!("Test mode activated! Using a simulated device. Happy developing.");
    }
    if let Some(key) = cfg.exit_key {
        println!("Press {key} to exit");
    }
    println!();
}

fn log_report(report: &PipelineReport) {
    info!(
        records = report.records,
        reconnects = report.reconnects,
        "reader stopped"
    );
    for bridge in report.bridges.iter().filter(|b| b.stopped_on_failure) {
        warn!("[{}] stopped early after a failure", bridge.name);
    }
    for output in report.outputs.iter().filter(|o| o.dropped > 0) {
        warn!("[{}] dropped {} scans on a full queue", output.name, output.dropped);
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (file, test_mode) = cli.into_file_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&file.reader.log_level)),
        )
        .with_writer(CrLfStdout)
        .init();

    let cfg = file.resolve(test_mode).context("invalid configuration")?;
    print_banner(&cfg);

    let pipeline = build_pipeline(&cfg)?;
    let cancel = CancellationToken::new();

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                ctrl_c_cancel.cancel();
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    // ── Exit key ──────────────────────────────────────────────────────────────
    let watcher = cfg.exit_key.map(|key| {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let reason = wait_for_exit_key(key, cancel.clone()).await;
            if reason != ExitReason::Cancelled {
                info!("exit requested");
                cancel.cancel();
            }
        })
    });

    // ── Pipeline ──────────────────────────────────────────────────────────────
    let result = match &cfg.source {
        SourceSettings::Serial { device, baud } => {
            pipeline
                .run(SerialConnector::new(device.clone(), *baud), cancel.clone())
                .await
        }
        SourceSettings::Simulated { interval } => {
            pipeline
                .run(SimulatedConnector::new(*interval), cancel.clone())
                .await
        }
    };

    cancel.cancel();
    if let Some(watcher) = watcher {
        // Restores the terminal before anything else is printed.
        let _ = watcher.await;
    }

    match result {
        Ok(report) => {
            log_report(&report);
            Ok(())
        }
        Err(e) => {
            error!("reader failed: {e}");
            Err(e).context("reader stopped with an error")
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
