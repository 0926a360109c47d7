//! Integration tests for the reader pipeline.
//!
//! These drive [`Pipeline`] through its public API with scripted byte
//! sources and recording sinks, the same way the binary drives it with a
//! serial port and real outputs:
//!
//! ```text
//! ScriptedSource ─▶ framer ─▶ fan-out ─┬─▶ RecordingSink "clipboard"
//!                                      └─▶ RecordingSink "api" (debounced)
//! ```

use std::time::Duration;

use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

use rfid_core::FramingError;
use rfid_reader::application::bridge::Bridge;
use rfid_reader::application::fan_out::OverflowPolicy;
use rfid_reader::application::pipeline::{Pipeline, PipelineConfig, PipelineError};
use rfid_reader::infrastructure::mock::{RecordingSink, ScriptedConnector, ScriptedSource};
use rfid_reader::infrastructure::source::{SimulatedConnector, SAMPLE_READINGS};

fn no_reconnect() -> PipelineConfig {
    PipelineConfig {
        reconnect: false,
        ..Default::default()
    }
}

fn texts(sink: &RecordingSink) -> Vec<String> {
    sink.delivered()
        .iter()
        .map(|r| r.as_str().to_string())
        .collect()
}

/// Each sample reading framed twice in a row, as a reader does when a card
/// is held against it.
fn repeated_readings() -> Vec<u8> {
    let mut bytes = Vec::new();
    for reading in SAMPLE_READINGS {
        for _ in 0..2 {
            bytes.push(b'\n');
            bytes.extend_from_slice(reading.as_bytes());
            bytes.push(b'\r');
        }
    }
    bytes
}

// ── End-to-end ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_repeated_scans_reach_plain_bridge_every_time_and_debounced_bridge_once() {
    // Arrange
    let clipboard = RecordingSink::new("clipboard");
    let api = RecordingSink::new("api");
    let mut pipeline = Pipeline::new(no_reconnect());
    pipeline
        .add_bridge(Bridge::new(clipboard.clone()), 16, OverflowPolicy::Block)
        .add_bridge(
            Bridge::new(api.clone()).with_debounce(Duration::from_secs(1)),
            16,
            OverflowPolicy::Block,
        );
    let source = ScriptedSource::from_chunks([repeated_readings()]);

    // Act
    let report = assert_ok!(
        pipeline
            .run(ScriptedConnector::new(vec![Ok(source)]), CancellationToken::new())
            .await
    );

    // Assert
    assert_eq!(report.records, 6);
    assert_eq!(
        texts(&clipboard),
        vec![
            "3456GA8680",
            "3456GA8680",
            "3001BFFFC1",
            "3001BFFFC1",
            "397EBBBBBKHOB1",
            "397EBBBBBKHOB1"
        ]
    );
    assert_eq!(texts(&api), SAMPLE_READINGS.to_vec());

    let api_report = report.bridges.iter().find(|b| b.name == "api").unwrap();
    assert_eq!(api_report.received, 6);
    assert_eq!(api_report.suppressed, 3);
}

#[tokio::test]
async fn test_every_bridge_sees_every_record_in_order() {
    // Arrange: four bridges, records split at awkward chunk boundaries.
    let sinks: Vec<RecordingSink> = (0..4).map(|i| RecordingSink::new(format!("out{i}"))).collect();
    let mut pipeline = Pipeline::new(no_reconnect());
    for sink in &sinks {
        pipeline.add_bridge(Bridge::new(sink.clone()), 2, OverflowPolicy::Block);
    }
    let source = ScriptedSource::from_chunks(["noise\nA", "1\r\n", "B2\r\nC", "3\r\n\r"]);

    // Act
    assert_ok!(
        pipeline
            .run(ScriptedConnector::new(vec![Ok(source)]), CancellationToken::new())
            .await
    );

    // Assert
    for sink in &sinks {
        assert_eq!(texts(sink), vec!["A1", "B2", "C3", ""]);
    }
}

#[tokio::test]
async fn test_overflow_is_fatal_but_earlier_records_are_delivered() {
    // Arrange
    let sink = RecordingSink::new("clipboard");
    let mut pipeline = Pipeline::new(no_reconnect());
    pipeline.add_bridge(Bridge::new(sink.clone()), 16, OverflowPolicy::Block);
    let mut bytes = b"\nOK\r\n".to_vec();
    bytes.extend(std::iter::repeat(b'7').take(1025));
    let source = ScriptedSource::from_chunks([bytes]).then_hang();

    // Act
    let err = assert_err!(
        pipeline
            .run(ScriptedConnector::new(vec![Ok(source)]), CancellationToken::new())
            .await
    );

    // Assert
    assert!(matches!(
        err,
        PipelineError::Framing(FramingError::Overflow { limit: 1024 })
    ));
    assert_eq!(texts(&sink), vec!["OK"]);
}

#[tokio::test]
async fn test_failing_bridge_does_not_affect_the_others() {
    // Arrange
    let healthy = RecordingSink::new("clipboard");
    let flaky = RecordingSink::new("api").fail_on("B");
    let mut pipeline = Pipeline::new(no_reconnect());
    pipeline
        .add_bridge(Bridge::new(healthy.clone()), 16, OverflowPolicy::Block)
        .add_bridge(Bridge::new(flaky.clone()), 16, OverflowPolicy::Block);
    let source = ScriptedSource::from_chunks(["\nA\r\nB\r\nC\r"]);

    // Act
    let report = assert_ok!(
        pipeline
            .run(ScriptedConnector::new(vec![Ok(source)]), CancellationToken::new())
            .await
    );

    // Assert
    assert_eq!(texts(&healthy), vec!["A", "B", "C"]);
    assert_eq!(texts(&flaky), vec!["A", "C"]);
    let api_report = report.bridges.iter().find(|b| b.name == "api").unwrap();
    assert_eq!(api_report.failed, 1);
}

// ── Simulator ─────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_simulator_emits_one_sample_per_interval_until_cancelled() {
    // Arrange
    let sink = RecordingSink::new("clipboard");
    let mut pipeline = Pipeline::new(PipelineConfig::default());
    pipeline.add_bridge(Bridge::new(sink.clone()), 16, OverflowPolicy::Block);
    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(12)).await;
        stopper.cancel();
    });

    // Act
    let report = assert_ok!(
        pipeline
            .run(SimulatedConnector::new(Duration::from_secs(5)), cancel)
            .await
    );

    // Assert: readings at 0 s, 5 s and 10 s.
    assert_eq!(report.records, 3);
    assert_eq!(texts(&sink), SAMPLE_READINGS.to_vec());
}
