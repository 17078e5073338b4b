//! In-memory fakes shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use data_catalog_downloader::catalog::TradingCalendar;
use data_catalog_downloader::downloader::{Confirm, ProgressObserver};
use data_catalog_downloader::fetcher::{CatalogClient, CatalogError, CatalogResult};
use data_catalog_downloader::SecurityType;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Build a ZIP archive in memory
pub fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Catalog held in memory, recording every call
#[derive(Default)]
pub struct FakeCatalog {
    files: BTreeMap<String, Vec<u8>>,
    broken: HashSet<String>,
    list_calls: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        self.files.insert(path.to_string(), content.to_vec());
        self
    }

    /// Listed, but fetching it fails with a transport error
    pub fn with_broken_file(mut self, path: &str) -> Self {
        self.files.insert(path.to_string(), Vec::new());
        self.broken.insert(path.to_string());
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn list_entries(&self, prefix: &str) -> CatalogResult<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .files
            .keys()
            .filter(|path| path.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn fetch_file(&self, path: &str, _organization_id: &str) -> CatalogResult<Bytes> {
        self.fetched.lock().unwrap().push(path.to_string());

        if self.broken.contains(path) {
            return Err(CatalogError::NetworkError("connection reset by peer".to_string()));
        }
        match self.files.get(path) {
            Some(content) => Ok(Bytes::from(content.clone())),
            None => Err(CatalogError::NotFound(path.to_string())),
        }
    }

    fn base_url(&self) -> &str {
        "memory://catalog"
    }
}

/// Confirmation with a fixed answer that counts how often it was asked
pub struct CountingConfirm {
    answer: bool,
    calls: AtomicUsize,
}

impl CountingConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Confirm for CountingConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

/// Observer that records everything it is told
#[derive(Default)]
pub struct RecordingObserver {
    pub started: Mutex<Vec<(usize, usize, String, Decimal)>>,
    pub warnings: Mutex<Vec<String>>,
    pub notices: Mutex<Vec<String>>,
}

impl ProgressObserver for RecordingObserver {
    fn file_started(&self, index: usize, total: usize, path: &str, price: Decimal) {
        self.started
            .lock()
            .unwrap()
            .push((index, total, path.to_string(), price));
    }

    fn warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}

/// Calendar returning a fixed list of dates
pub struct FixedCalendar(pub Vec<NaiveDate>);

impl TradingCalendar for FixedCalendar {
    fn tradable_dates(
        &self,
        _security_type: SecurityType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<NaiveDate> {
        self.0
            .iter()
            .copied()
            .filter(|d| *d >= start && *d <= end)
            .collect()
    }
}
