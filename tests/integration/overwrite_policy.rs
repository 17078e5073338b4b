//! Integration tests for the run-scoped overwrite decision

use data_catalog_downloader::downloader::{
    DownloadExecutor, OverwriteDecision, OverwriteState,
};
use data_catalog_downloader::RemoteFileDescriptor;
use rust_decimal::Decimal;
use std::sync::Arc;
use tempfile::TempDir;

use crate::support::{CountingConfirm, FakeCatalog, RecordingObserver};

const FILES: [&str; 3] = [
    "equity/usa/minute/spy/20210104_trade.zip",
    "equity/usa/minute/spy/20210105_trade.zip",
    "equity/usa/minute/spy/20210106_trade.zip",
];

fn seed_existing(root: &std::path::Path) {
    for path in FILES {
        let local = root.join(path);
        std::fs::create_dir_all(local.parent().unwrap()).unwrap();
        std::fs::write(local, b"old").unwrap();
    }
}

fn catalog() -> FakeCatalog {
    FILES
        .iter()
        .fold(FakeCatalog::new(), |catalog, path| catalog.with_file(path, b"new"))
}

fn descriptors() -> Vec<RemoteFileDescriptor> {
    FILES
        .iter()
        .map(|path| RemoteFileDescriptor::new(*path, Decimal::ONE))
        .collect()
}

#[tokio::test]
async fn test_declined_once_skips_every_conflict() {
    let temp_dir = TempDir::new().unwrap();
    seed_existing(temp_dir.path());
    let catalog = Arc::new(catalog());
    let confirm = Arc::new(CountingConfirm::new(false));
    let observer = Arc::new(RecordingObserver::default());
    let executor = DownloadExecutor::new(catalog.clone(), temp_dir.path())
        .with_confirm(confirm.clone())
        .with_observer(observer.clone());
    let state = OverwriteState::new();

    let summary = executor
        .download_all(&descriptors(), false, &state, "org-1")
        .await
        .unwrap();

    assert_eq!(confirm.calls(), 1);
    assert_eq!(summary.skipped_existing, 3);
    assert!(catalog.fetched().is_empty());
    assert_eq!(state.decision().await, OverwriteDecision::Deny);
    for path in FILES {
        assert_eq!(std::fs::read(temp_dir.path().join(path)).unwrap(), b"old");
    }

    let warnings = observer.warnings.lock().unwrap().clone();
    assert!(warnings[0].ends_with("already exists, use --overwrite to overwrite it"));
    assert_eq!(warnings[1], "You have not been billed for this file");
}

#[tokio::test]
async fn test_accepted_once_overwrites_every_conflict() {
    let temp_dir = TempDir::new().unwrap();
    seed_existing(temp_dir.path());
    let catalog = Arc::new(catalog());
    let confirm = Arc::new(CountingConfirm::new(true));
    let executor = DownloadExecutor::new(catalog.clone(), temp_dir.path())
        .with_confirm(confirm.clone());
    let state = OverwriteState::new();

    let summary = executor
        .download_all(&descriptors(), false, &state, "org-1")
        .await
        .unwrap();

    assert_eq!(confirm.calls(), 1);
    assert_eq!(summary.downloaded, 3);
    assert_eq!(catalog.fetched().len(), 3);
    for path in FILES {
        assert_eq!(std::fs::read(temp_dir.path().join(path)).unwrap(), b"new");
    }
}

#[tokio::test]
async fn test_decision_carries_across_batches() {
    let temp_dir = TempDir::new().unwrap();
    seed_existing(temp_dir.path());
    let catalog = Arc::new(catalog());
    let confirm = Arc::new(CountingConfirm::new(false));
    let executor = DownloadExecutor::new(catalog.clone(), temp_dir.path())
        .with_confirm(confirm.clone());
    let state = OverwriteState::new();

    let all = descriptors();
    executor
        .download_all(&all[..1], false, &state, "org-1")
        .await
        .unwrap();
    executor
        .download_all(&all[1..], false, &state, "org-1")
        .await
        .unwrap();

    assert_eq!(confirm.calls(), 1);
    assert!(catalog.fetched().is_empty());
}

#[tokio::test]
async fn test_overwrite_flag_never_asks() {
    let temp_dir = TempDir::new().unwrap();
    seed_existing(temp_dir.path());
    let catalog = Arc::new(catalog());
    let confirm = Arc::new(CountingConfirm::new(false));
    let executor = DownloadExecutor::new(catalog.clone(), temp_dir.path())
        .with_confirm(confirm.clone());
    let state = OverwriteState::new();

    let summary = executor
        .download_all(&descriptors(), true, &state, "org-1")
        .await
        .unwrap();

    assert_eq!(confirm.calls(), 0);
    assert_eq!(summary.downloaded, 3);
    assert_eq!(state.decision().await, OverwriteDecision::Undecided);
}

#[tokio::test]
async fn test_missing_files_never_ask() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Arc::new(catalog());
    let confirm = Arc::new(CountingConfirm::new(false));
    let executor = DownloadExecutor::new(catalog, temp_dir.path()).with_confirm(confirm.clone());

    let summary = executor
        .download_all(&descriptors(), false, &OverwriteState::new(), "org-1")
        .await
        .unwrap();

    assert_eq!(confirm.calls(), 0);
    assert_eq!(summary.downloaded, 3);
}
