//! DOI to saved PDF: lookup, download, write.
//!
//! [`OpenAccessFetcher::resolve_and_save`] performs one attempt per call with
//! no retries. On every failure path the destination is left untouched.

mod error;

pub use error::{FailureKind, FetchError};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::download::{DownloadError, HttpClient};
use crate::resolver::PdfLocator;

/// A PDF persisted by [`OpenAccessFetcher::resolve_and_save`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedArtifact {
    /// Where the bytes were written.
    pub path: PathBuf,
    /// Number of bytes written.
    pub bytes: u64,
    /// The PDF location they came from.
    pub source_url: String,
}

/// Resolves DOIs to open-access PDFs and saves them.
#[derive(Clone)]
pub struct OpenAccessFetcher {
    locator: Arc<dyn PdfLocator>,
    client: HttpClient,
}

impl std::fmt::Debug for OpenAccessFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAccessFetcher")
            .field("locator", &self.locator.name())
            .field("client", &self.client)
            .finish()
    }
}

impl OpenAccessFetcher {
    /// Combines a PDF locator with a download client.
    #[must_use]
    pub fn new(locator: Arc<dyn PdfLocator>, client: HttpClient) -> Self {
        Self { locator, client }
    }

    /// Looks up `doi`, downloads its PDF, and writes it to `destination`.
    ///
    /// Any existing file at `destination` is replaced. The parent directory
    /// must already exist.
    ///
    /// # Errors
    ///
    /// - [`FetchError::MetadataLookupFailed`] - lookup transport/status/format failure
    /// - [`FetchError::NoOpenAccessCopy`] - no `url_for_pdf` listed
    /// - [`FetchError::DownloadFailed`] - PDF fetch failed or body is not a PDF
    /// - [`FetchError::WriteFailed`] - the local write failed
    #[instrument(skip(self), fields(locator = self.locator.name(), destination = %destination.display()))]
    pub async fn resolve_and_save(
        &self,
        doi: &str,
        destination: &Path,
    ) -> Result<SavedArtifact, FetchError> {
        let pdf_url = self.locator.locate(doi).await?;
        debug!(%pdf_url, "open-access location resolved");

        let bytes = self
            .client
            .fetch_pdf(&pdf_url)
            .await
            .map_err(|e| download_failure(doi, &pdf_url, e))?;

        let written = self
            .client
            .save(&bytes, destination)
            .await
            .map_err(|e| match e {
                DownloadError::Io { path, source } => FetchError::write_failed(path, source),
                other => FetchError::write_failed(
                    destination,
                    std::io::Error::other(other.to_string()),
                ),
            })?;

        info!(%doi, path = %destination.display(), bytes = written, "downloaded PDF");
        Ok(SavedArtifact {
            path: destination.to_path_buf(),
            bytes: written,
            source_url: pdf_url,
        })
    }
}

fn download_failure(doi: &str, url: &str, error: DownloadError) -> FetchError {
    let status = error.status();
    let detail = match &error {
        DownloadError::HttpStatus { status, .. } => format!("server returned HTTP {status}"),
        DownloadError::Timeout { .. } => "request timed out".to_string(),
        DownloadError::NotPdf { content_type, .. } => {
            format!("response is not a PDF (content-type: {content_type})")
        }
        other => other.to_string(),
    };
    FetchError::download_failed(doi, url, status, detail)
}
