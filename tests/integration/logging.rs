//! Integration tests for logging and tracing

use data_catalog_downloader::downloader::{DownloadExecutor, OverwriteState};
use data_catalog_downloader::RemoteFileDescriptor;
use rust_decimal::Decimal;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use crate::support::FakeCatalog;

/// Writer appending every log line to a shared buffer
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

async fn run_two_file_batch() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Arc::new(
        FakeCatalog::new().with_file("equity/usa/minute/spy/20210104_trade.zip", b"spy"),
    );
    let executor = DownloadExecutor::new(catalog, temp_dir.path());
    let files = vec![
        RemoteFileDescriptor::new("equity/usa/minute/spy/20210104_trade.zip", Decimal::from(2)),
        RemoteFileDescriptor::new("equity/usa/minute/spy/20210105_trade.zip", Decimal::from(2)),
    ];

    let summary = executor
        .download_all(&files, false, &OverwriteState::new(), "org-1")
        .await
        .unwrap();

    assert_eq!(summary.downloaded, 1);
    assert_eq!(summary.not_in_catalog, 1);
}

#[tokio::test]
async fn test_default_observer_logs_progress_and_warnings() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("data_catalog_downloader=info"))
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    run_two_file_batch().await;

    let output = logs.contents();
    assert!(output.contains("[1/2] Downloading equity/usa/minute/spy/20210104_trade.zip (2 QCC)"));
    assert!(output.contains("[2/2] Downloading equity/usa/minute/spy/20210105_trade.zip (2 QCC)"));
    assert!(output.contains("WARN"));
    assert!(output.contains("20210105_trade.zip does not exist in the data catalog"));
    assert!(output.contains("You have not been billed for this file"));
}

#[tokio::test]
async fn test_json_format_carries_progress_fields() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new("data_catalog_downloader=info"))
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    run_two_file_batch().await;

    let first = logs
        .contents()
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
        .find(|event| event["fields"]["index"] == 1)
        .expect("first progress event");

    assert_eq!(first["level"], "INFO");
    assert_eq!(first["fields"]["total"], 2);
    assert_eq!(
        first["fields"]["path"],
        "equity/usa/minute/spy/20210104_trade.zip"
    );
    assert_eq!(
        first["fields"]["message"],
        "[1/2] Downloading equity/usa/minute/spy/20210104_trade.zip (2 QCC)"
    );
}

#[test]
fn test_env_filter_parsing() {
    assert!(EnvFilter::try_new("data_catalog_downloader=debug").is_ok());
    assert!(EnvFilter::try_new("warn,data_catalog_downloader=trace").is_ok());
}
