//! HTTP catalog client
//!
//! Talks to the data catalog API with:
//! - `data/list` for prefix listings
//! - `data/read` to obtain a billed download link for a single file
//! - a plain GET on the returned link for the file content
//!
//! Failed requests are not retried. Only a "File not found" message from the
//! API maps to [`CatalogError::NotFound`]; any failure on the download link is
//! a [`CatalogError::HttpError`].

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::downloader::config::HTTP_TIMEOUT_SECS;
use crate::fetcher::{CatalogClient, CatalogError, CatalogResult};
use crate::metrics::HttpRequestMetrics;

/// Message fragment the catalog uses for files it does not carry
const FILE_NOT_FOUND_MARKER: &str = "File not found";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListRequest<'a> {
    file_path: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadRequest<'a> {
    format: &'a str,
    file_path: &'a str,
    organization_id: &'a str,
}

/// A listing entry is either a bare path or an object carrying one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListedObject {
    Path(String),
    Object { key: String },
}

impl ListedObject {
    fn into_path(self) -> String {
        match self {
            ListedObject::Path(path) => path,
            ListedObject::Object { key } => key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    success: bool,
    #[serde(default)]
    objects: Vec<ListedObject>,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ReadResponse {
    success: bool,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

/// Catalog client backed by the HTTP API
pub struct HttpCatalogClient {
    client: Arc<Client>,
    base_url: String,
}

impl HttpCatalogClient {
    /// Create a client on top of a shared reqwest client
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client (Arc for cheap cloning)
    /// * `base_url` - API root (e.g., "<https://www.quantconnect.com/api/v2>")
    pub fn new(client: Arc<Client>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client with its own reqwest client and the default timeout
    pub fn with_default_client(base_url: impl Into<String>) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| CatalogError::HttpError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::new(Arc::new(client), base_url))
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// POST a JSON body and deserialize the JSON response
    async fn post<B, T>(&self, endpoint: &str, body: &B) -> CatalogResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(endpoint);
        let request_metrics = HttpRequestMetrics::start(endpoint);
        debug!(
            correlation_id = %request_metrics.correlation_id(),
            "Making POST request to: {}", url
        );

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                request_metrics.record_network_error();
                CatalogError::NetworkError(e.to_string())
            })?;

        let status = response.status();
        request_metrics.record_complete(status.as_u16());
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CatalogError::HttpError(format!(
                "{endpoint} returned {status}: {error_text}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::ParseError(format!("Failed to deserialize response: {e}")))
    }

    /// GET raw bytes from a download link
    async fn get_bytes(&self, path: &str, link: &str) -> CatalogResult<Bytes> {
        let request_metrics = HttpRequestMetrics::start("download");
        let response = self
            .client
            .get(link)
            .send()
            .await
            .map_err(|e| {
                request_metrics.record_network_error();
                CatalogError::NetworkError(e.to_string())
            })?;

        let status = response.status();
        request_metrics.record_complete(status.as_u16());
        // The read call already billed this file, so a dead link is a transport failure
        if !status.is_success() {
            return Err(CatalogError::HttpError(format!(
                "Download of {path} failed: HTTP {status}"
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))
    }
}

/// Map the `errors` array of a failed API response to a catalog error
pub(crate) fn classify_api_errors(path: &str, errors: &[String]) -> CatalogError {
    if errors.iter().any(|e| e.contains(FILE_NOT_FOUND_MARKER)) {
        return CatalogError::NotFound(path.to_string());
    }

    if errors.is_empty() {
        CatalogError::ApiError("request was not successful".to_string())
    } else {
        CatalogError::ApiError(errors.join(", "))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list_entries(&self, prefix: &str) -> CatalogResult<Vec<String>> {
        let response: ListResponse = self
            .post("data/list", &ListRequest { file_path: prefix })
            .await?;

        if !response.success {
            return Err(classify_api_errors(prefix, &response.errors));
        }

        let paths: Vec<String> = response
            .objects
            .into_iter()
            .map(ListedObject::into_path)
            .collect();
        debug!("Listed {} entries under {}", paths.len(), prefix);
        Ok(paths)
    }

    async fn fetch_file(&self, path: &str, organization_id: &str) -> CatalogResult<Bytes> {
        let response: ReadResponse = self
            .post(
                "data/read",
                &ReadRequest {
                    format: "link",
                    file_path: path,
                    organization_id,
                },
            )
            .await?;

        if !response.success {
            return Err(classify_api_errors(path, &response.errors));
        }

        let link = response.link.ok_or_else(|| {
            CatalogError::ParseError(format!("Read response for {path} carries no link"))
        })?;

        self.get_bytes(path, &link).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
