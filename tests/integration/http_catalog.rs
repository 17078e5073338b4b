//! HTTP catalog client tests against a local mock API

use data_catalog_downloader::downloader::{DownloadExecutor, OverwriteState};
use data_catalog_downloader::fetcher::http::HttpCatalogClient;
use data_catalog_downloader::fetcher::{CatalogClient, CatalogError};
use data_catalog_downloader::RemoteFileDescriptor;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SPY_FILE: &str = "equity/usa/minute/spy/20210104_trade.zip";

async fn mount_read_link(server: &MockServer, file_path: &str, link_path: &str) {
    Mock::given(method("POST"))
        .and(path("/data/read"))
        .and(body_partial_json(json!({ "filePath": file_path })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "link": format!("{}{}", server.uri(), link_path),
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_file_follows_link() {
    let server = MockServer::start().await;
    mount_read_link(&server, SPY_FILE, "/files/spy").await;
    Mock::given(method("GET"))
        .and(path("/files/spy"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"spy bytes".to_vec()))
        .mount(&server)
        .await;

    let client = HttpCatalogClient::with_default_client(server.uri()).unwrap();
    let bytes = client.fetch_file(SPY_FILE, "org-1").await.unwrap();

    assert_eq!(&bytes[..], b"spy bytes");
}

#[tokio::test]
async fn test_missing_link_target_is_transport_error() {
    let server = MockServer::start().await;
    mount_read_link(&server, SPY_FILE, "/files/gone").await;
    Mock::given(method("GET"))
        .and(path("/files/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = HttpCatalogClient::with_default_client(server.uri()).unwrap();
    let error = client.fetch_file(SPY_FILE, "org-1").await.unwrap_err();

    assert!(!error.is_not_found());
    assert!(matches!(error, CatalogError::HttpError(_)));
}

#[tokio::test]
async fn test_file_not_found_message_is_catalog_miss() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/data/read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "errors": [format!("File not found: {SPY_FILE}")],
        })))
        .mount(&server)
        .await;

    let client = HttpCatalogClient::with_default_client(server.uri()).unwrap();
    let error = client.fetch_file(SPY_FILE, "org-1").await.unwrap_err();

    assert!(error.is_not_found());
}

#[tokio::test]
async fn test_list_entries_reads_objects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/data/list"))
        .and(body_partial_json(json!({ "filePath": "equity/usa/minute/spy/" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "objects": [{ "key": SPY_FILE }, "equity/usa/minute/spy/20210105_trade.zip"],
        })))
        .mount(&server)
        .await;

    let client = HttpCatalogClient::with_default_client(server.uri()).unwrap();
    let entries = client.list_entries("equity/usa/minute/spy/").await.unwrap();

    assert_eq!(
        entries,
        vec![SPY_FILE, "equity/usa/minute/spy/20210105_trade.zip"]
    );
}

#[tokio::test]
async fn test_dead_link_aborts_batch() {
    let server = MockServer::start().await;
    let next_file = "equity/usa/minute/spy/20210105_trade.zip";
    mount_read_link(&server, SPY_FILE, "/files/gone").await;
    mount_read_link(&server, next_file, "/files/next").await;
    Mock::given(method("GET"))
        .and(path("/files/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/next"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"next".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let client = Arc::new(HttpCatalogClient::with_default_client(server.uri()).unwrap());
    let executor = DownloadExecutor::new(client, temp_dir.path());
    let files = vec![
        RemoteFileDescriptor::new(SPY_FILE, Decimal::from(2)),
        RemoteFileDescriptor::new(next_file, Decimal::from(2)),
    ];

    let result = executor
        .download_all(&files, false, &OverwriteState::new(), "org-1")
        .await;

    assert!(result.is_err());
    assert!(!temp_dir.path().join(next_file).exists());
}
