//! HTTP API output.
//!
//! Each accepted scan is sent as an `application/x-www-form-urlencoded` POST
//! with a single field, `record_value`.  There is no retry; a failed or
//! rejected request is reported to the bridge and the next scan is tried
//! normally.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use rfid_core::ScanRecord;

use crate::application::bridge::{RecordSink, SinkError};

/// Form field carrying the scan text.
pub const RECORD_FIELD: &str = "record_value";

/// Endpoint used in test mode when none is configured.
pub const DEFAULT_TEST_ENDPOINT: &str = "http://127.0.0.1:8000/scan/";

pub struct ApiSink {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl ApiSink {
    /// # Errors
    ///
    /// Returns [`SinkError::Http`] if `endpoint` is not a valid URL or the
    /// HTTP client cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SinkError> {
        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|e| SinkError::Http(format!("invalid endpoint '{endpoint}': {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Http(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl RecordSink for ApiSink {
    fn name(&self) -> &str {
        "api"
    }

    async fn deliver(&self, record: &ScanRecord) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&[(RECORD_FIELD, record.as_str())])
            .send()
            .await
            .map_err(|e| SinkError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status {
                status: status.as_u16(),
            });
        }
        info!("scan sent to {}: {record}", self.endpoint);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accepts one connection, captures the raw request, answers `status`.
    async fn one_shot_server(status: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/scan/", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            // Read until the full body announced by Content-Length has arrived.
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let len = text[..split]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + len {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let reply = format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            stream.write_all(reply.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });
        (url, handle)
    }

    #[tokio::test]
    async fn test_deliver_posts_record_as_form_field() {
        // Arrange
        let (url, server) = one_shot_server("200 OK").await;
        let sink = ApiSink::new(&url, Duration::from_secs(5)).unwrap();

        // Act
        sink.deliver(&ScanRecord::from("3456GA8680")).await.unwrap();

        // Assert
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /scan/ HTTP/1.1"));
        assert!(request
            .to_ascii_lowercase()
            .contains("content-type: application/x-www-form-urlencoded"));
        assert!(request.ends_with("record_value=3456GA8680"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let (url, server) = one_shot_server("500 Internal Server Error").await;
        let sink = ApiSink::new(&url, Duration::from_secs(5)).unwrap();

        let result = sink.deliver(&ScanRecord::from("X")).await;

        assert!(matches!(result, Err(SinkError::Status { status: 500 })));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_http_error() {
        // Arrange: bind then drop a listener so the port is closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/scan/", listener.local_addr().unwrap());
        drop(listener);
        let sink = ApiSink::new(&url, Duration::from_secs(5)).unwrap();

        // Act
        let result = sink.deliver(&ScanRecord::from("X")).await;

        // Assert
        assert!(matches!(result, Err(SinkError::Http(_))));
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        assert!(matches!(
            ApiSink::new("not a url", Duration::from_secs(1)),
            Err(SinkError::Http(_))
        ));
    }

    #[test]
    fn test_default_test_endpoint_parses() {
        let sink = ApiSink::new(DEFAULT_TEST_ENDPOINT, Duration::from_secs(1)).unwrap();
        assert_eq!(sink.endpoint(), "http://127.0.0.1:8000/scan/");
        assert_eq!(sink.name(), "api");
    }
}
