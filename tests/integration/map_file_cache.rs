//! Integration tests for the map file cache

use data_catalog_downloader::downloader::DownloadExecutor;
use data_catalog_downloader::mapfile::{MapFileCache, MapFileSet};
use std::sync::Arc;
use tempfile::TempDir;

use crate::support::{build_zip, date, FakeCatalog, RecordingObserver};

const OLD_BUNDLE: &str = "equity/usa/map_files/map_files_20240102.zip";
const NEW_BUNDLE: &str = "equity/usa/map_files/map_files_20240315.zip";

fn catalog() -> FakeCatalog {
    let old = build_zip(&[("spy.csv", "19930129,spy,P\n20501231,spy,P\n")]);
    let new = build_zip(&[
        ("goog.csv", "20040819,goog,Q\n20140402,goog,Q\n20501231,googl,Q\n"),
        ("spy.csv", "19930129,spy,P\n20501231,spy,P\n"),
    ]);

    FakeCatalog::new()
        .with_file(OLD_BUNDLE, &old)
        .with_file(NEW_BUNDLE, &new)
        .with_file("equity/usa/map_files/README.txt", b"not a bundle")
}

#[tokio::test]
async fn test_two_calls_list_once_and_fetch_once() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Arc::new(catalog());
    let observer = Arc::new(RecordingObserver::default());
    let executor =
        DownloadExecutor::new(catalog.clone(), temp_dir.path()).with_observer(observer.clone());
    let cache = MapFileCache::new();

    let first = cache.get_map_files(&executor, "org-1").await.unwrap();
    let second = cache.get_map_files(&executor, "org-1").await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(catalog.list_calls(), 1);
    assert_eq!(catalog.fetched(), vec![NEW_BUNDLE]);
    assert_eq!(first.len(), 2);
    assert_eq!(
        observer.notices.lock().unwrap().clone(),
        vec!["Downloading the latest map files (free)"]
    );
    // The free bundle download is not announced as a priced file
    assert!(observer.started.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_first_callers_share_one_population() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Arc::new(catalog());
    let executor = Arc::new(DownloadExecutor::new(catalog.clone(), temp_dir.path()));
    let cache = Arc::new(MapFileCache::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let executor = executor.clone();
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_map_files(&executor, "org-1").await.map(|m| m.len()) })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 2);
    }
    assert_eq!(catalog.list_calls(), 1);
    assert_eq!(catalog.fetched().len(), 1);
}

#[tokio::test]
async fn test_ticker_lookup_across_bundle() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Arc::new(catalog());
    let executor = DownloadExecutor::new(catalog, temp_dir.path());

    let map_files = MapFileCache::new()
        .get_map_files(&executor, "org-1")
        .await
        .unwrap();

    let goog = map_files.find_by_ticker("GOOGL", date(2020, 6, 1)).unwrap();
    assert_eq!(goog.name(), "goog.csv");
    assert_eq!(goog.permtick(), Some("goog"));
    assert_eq!(goog.renames().len(), 1);

    assert!(map_files.find_by_ticker("googl", date(2010, 6, 1)).is_none());
}
