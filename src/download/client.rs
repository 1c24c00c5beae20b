//! HTTP client wrapper for fetching and saving PDFs.
//!
//! The body is fully received and checked before anything touches the
//! filesystem; the write itself goes through a staging file and a rename, so
//! a failure never leaves a partial artifact at the destination.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{DEFAULT_MAX_PDF_BYTES, PARTIAL_SUFFIX, PDF_MAGIC, PDF_MAGIC_SEARCH_WINDOW};
use super::error::DownloadError;
use crate::http_client::{HttpTimeouts, build_http_client};
use crate::user_agent;

/// HTTP client for PDF downloads.
///
/// Create once and clone freely; clones share the connection pool.
///
/// # Example
///
/// ```no_run
/// use paperfetch_core::HttpTimeouts;
/// use paperfetch_core::download::HttpClient;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new(HttpTimeouts::default())?;
/// let bytes = client.fetch_pdf("https://example.com/paper.pdf").await?;
/// client.save(&bytes, Path::new("./paper.pdf")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    max_bytes: u64,
}

impl HttpClient {
    /// Creates a client with the given timeouts and the default size cap.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the underlying client cannot be built.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, DownloadError> {
        let client = build_http_client(&user_agent::download_user_agent(), timeouts)
            .map_err(|e| DownloadError::Client {
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            max_bytes: DEFAULT_MAX_PDF_BYTES,
        })
    }

    /// Overrides the maximum accepted body size.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Maximum accepted body size in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Downloads `url` fully into memory and checks it is a PDF.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid or not http(s)
    /// - The request fails or times out
    /// - The status is anything but 200
    /// - The body exceeds the size cap
    /// - The body has no `%PDF-` header near its start
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_pdf(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DownloadError::invalid_url(url));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        if let Some(length) = response.content_length()
            && length > self.max_bytes
        {
            return Err(DownloadError::too_large(url, self.max_bytes));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = read_body_capped(response, url, self.max_bytes).await?;

        if !has_pdf_signature(&body) {
            debug!(bytes = body.len(), ?content_type, "body lacks PDF signature");
            return Err(DownloadError::not_pdf(url, content_type.as_deref()));
        }

        debug!(bytes = body.len(), "PDF body received");
        Ok(body)
    }

    /// Writes `bytes` verbatim to `destination`, replacing any existing file.
    ///
    /// The parent directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] if the staging write or rename fails.
    #[instrument(skip(self, bytes), fields(path = %destination.display(), bytes = bytes.len()))]
    pub async fn save(&self, bytes: &[u8], destination: &Path) -> Result<u64, DownloadError> {
        write_artifact(bytes, destination).await
    }
}

/// Streams the response body into memory, stopping at `limit` bytes.
async fn read_body_capped(
    response: reqwest::Response,
    url: &str,
    limit: u64,
) -> Result<Vec<u8>, DownloadError> {
    let mut stream = response.bytes_stream();
    let mut body = Vec::new();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::from_reqwest(url, e))?;
        if (body.len() + chunk.len()) as u64 > limit {
            return Err(DownloadError::too_large(url, limit));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// True when `%PDF-` appears within the first KiB of `bytes`.
#[must_use]
pub fn has_pdf_signature(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(PDF_MAGIC_SEARCH_WINDOW)];
    window
        .windows(PDF_MAGIC.len())
        .any(|candidate| candidate == PDF_MAGIC)
}

fn staging_path(destination: &Path) -> PathBuf {
    let mut name: OsString = destination.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

async fn write_artifact(bytes: &[u8], destination: &Path) -> Result<u64, DownloadError> {
    let staging = staging_path(destination);

    let result = write_then_rename(bytes, &staging, destination).await;
    if result.is_err() {
        debug!(path = %staging.display(), "cleaning up staging file after error");
        let _ = tokio::fs::remove_file(&staging).await;
    }
    result?;

    info!(path = %destination.display(), bytes = bytes.len(), "PDF saved");
    Ok(bytes.len() as u64)
}

async fn write_then_rename(
    bytes: &[u8],
    staging: &Path,
    destination: &Path,
) -> Result<(), DownloadError> {
    let mut file = File::create(staging)
        .await
        .map_err(|e| DownloadError::io(staging, e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| DownloadError::io(staging, e))?;
    file.flush()
        .await
        .map_err(|e| DownloadError::io(staging, e))?;
    file.sync_all()
        .await
        .map_err(|e| DownloadError::io(staging, e))?;
    drop(file);

    tokio::fs::rename(staging, destination)
        .await
        .map_err(|e| DownloadError::io(destination, e))
}
