//! Observability metrics for catalog downloads
//!
//! Counters for catalog listings, downloaded and skipped files, transferred
//! bytes and map file cache hits, plus per-request HTTP metrics.
//!
//! ## Architecture
//!
//! - Uses `metrics` crate for low-overhead metric collection
//! - Optional Prometheus exporter for a scraping endpoint (`--metrics-addr`)
//! - Recording without an installed exporter is a no-op

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Global metrics registry initialization flag
static METRICS_INITIALIZED: Lazy<Arc<RwLock<bool>>> = Lazy::new(|| Arc::new(RwLock::new(false)));

/// Correlation ID generator for request tracing
static CORRELATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Initialize metrics system with Prometheus exporter
///
/// Idempotent: later calls are ignored.
///
/// # Arguments
/// * `addr` - Socket address to bind Prometheus scrape endpoint (e.g., "127.0.0.1:9090")
pub async fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let mut initialized = METRICS_INITIALIZED.write().await;
    if *initialized {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "http_requests_total",
        Unit::Count,
        "Total number of HTTP requests made to the catalog API"
    );

    describe_histogram!(
        "http_request_duration_seconds",
        Unit::Seconds,
        "HTTP request duration in seconds"
    );

    describe_counter!(
        "catalog_list_requests_total",
        Unit::Count,
        "Total number of catalog prefix listings"
    );

    describe_counter!(
        "files_downloaded_total",
        Unit::Count,
        "Total number of files written to the local mirror"
    );

    describe_counter!(
        "files_skipped_total",
        Unit::Count,
        "Total number of files not downloaded, by reason"
    );

    describe_counter!(
        "bytes_downloaded_total",
        Unit::Bytes,
        "Total number of bytes written to the local mirror"
    );

    describe_counter!(
        "map_file_cache_hits_total",
        Unit::Count,
        "Total number of map file requests served from memory"
    );

    *initialized = true;
    info!("Metrics system initialized successfully");
    Ok(())
}

/// Generate a unique correlation ID for request tracing
pub fn generate_correlation_id() -> String {
    let id = CORRELATION_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("req-{id:08x}")
}

/// HTTP request metrics helper
pub struct HttpRequestMetrics {
    endpoint: String,
    start_time: Instant,
    correlation_id: String,
}

impl HttpRequestMetrics {
    /// Start tracking a request to an API endpoint
    pub fn start(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let correlation_id = generate_correlation_id();

        debug!(
            correlation_id = %correlation_id,
            endpoint = %endpoint,
            "Starting HTTP request metrics"
        );

        Self {
            endpoint,
            start_time: Instant::now(),
            correlation_id,
        }
    }

    /// Record completion of the HTTP request
    pub fn record_complete(&self, status_code: u16) {
        counter!(
            "http_requests_total",
            "endpoint" => self.endpoint.clone(),
            "status" => status_code.to_string(),
        )
        .increment(1);

        histogram!(
            "http_request_duration_seconds",
            "endpoint" => self.endpoint.clone(),
        )
        .record(self.start_time.elapsed().as_secs_f64());
    }

    /// Record a request that never produced a response
    pub fn record_network_error(&self) {
        counter!(
            "http_requests_total",
            "endpoint" => self.endpoint.clone(),
            "status" => "network_error",
        )
        .increment(1);

        debug!(
            correlation_id = %self.correlation_id,
            endpoint = %self.endpoint,
            "HTTP request failed without a response"
        );
    }

    /// Get the correlation ID for this request
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Why a file was not downloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// File exists locally and overwriting was refused
    Existing,
    /// Catalog reported the file as missing
    NotInCatalog,
}

impl SkipReason {
    /// Label value used on the skip counter
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Existing => "existing",
            SkipReason::NotInCatalog => "not_in_catalog",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record one catalog prefix listing
pub fn record_catalog_listing() {
    counter!("catalog_list_requests_total").increment(1);
}

/// Record a file written to the local mirror
pub fn record_file_downloaded(bytes: u64) {
    counter!("files_downloaded_total").increment(1);
    counter!("bytes_downloaded_total").increment(bytes);
}

/// Record a file that was not downloaded
pub fn record_file_skipped(reason: SkipReason) {
    counter!("files_skipped_total", "reason" => reason.as_str()).increment(1);
}

/// Record a map file request served from memory
pub fn record_map_file_cache_hit() {
    counter!("map_file_cache_hits_total").increment(1);
}
