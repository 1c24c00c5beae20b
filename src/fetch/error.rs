//! Per-DOI failure taxonomy.
//!
//! Every variant is local to one DOI: the pipeline records it and moves on.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Why one DOI could not be turned into a saved PDF.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The metadata service could not be reached, refused the DOI, or answered garbage.
    #[error("metadata lookup failed for {doi}: {detail}")]
    MetadataLookupFailed {
        /// DOI being looked up.
        doi: String,
        /// HTTP status when the service answered.
        status: Option<u16>,
        /// Human-readable cause.
        detail: String,
    },

    /// The service knows the DOI but lists no direct PDF location.
    #[error("no open-access PDF listed for {doi}")]
    NoOpenAccessCopy {
        /// DOI being looked up.
        doi: String,
    },

    /// The PDF location could not be fetched or did not hold a PDF.
    #[error("download failed for {doi} from {url}: {detail}")]
    DownloadFailed {
        /// DOI being fetched.
        doi: String,
        /// PDF location reported by the metadata service.
        url: String,
        /// HTTP status when the server answered.
        status: Option<u16>,
        /// Human-readable cause.
        detail: String,
    },

    /// The bytes arrived but could not be written to the destination.
    #[error("could not write {path}: {source}")]
    WriteFailed {
        /// Destination path.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}

/// Stable label for a [`FetchError`], used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// See [`FetchError::MetadataLookupFailed`].
    MetadataLookupFailed,
    /// See [`FetchError::NoOpenAccessCopy`].
    NoOpenAccessCopy,
    /// See [`FetchError::DownloadFailed`].
    DownloadFailed,
    /// See [`FetchError::WriteFailed`].
    WriteFailed,
    /// The worker task for this entry panicked.
    TaskPanicked,
}

impl FailureKind {
    /// Short label for text output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::MetadataLookupFailed => "metadata lookup failed",
            Self::NoOpenAccessCopy => "no open-access copy",
            Self::DownloadFailed => "download failed",
            Self::WriteFailed => "write failed",
            Self::TaskPanicked => "internal error",
        }
    }
}

impl FetchError {
    /// Creates a `MetadataLookupFailed` error.
    #[must_use]
    pub fn lookup_failed(doi: &str, status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::MetadataLookupFailed {
            doi: doi.to_string(),
            status,
            detail: detail.into(),
        }
    }

    /// Creates a `NoOpenAccessCopy` error.
    #[must_use]
    pub fn no_open_access(doi: &str) -> Self {
        Self::NoOpenAccessCopy {
            doi: doi.to_string(),
        }
    }

    /// Creates a `DownloadFailed` error.
    #[must_use]
    pub fn download_failed(
        doi: &str,
        url: &str,
        status: Option<u16>,
        detail: impl Into<String>,
    ) -> Self {
        Self::DownloadFailed {
            doi: doi.to_string(),
            url: url.to_string(),
            status,
            detail: detail.into(),
        }
    }

    /// Creates a `WriteFailed` error.
    #[must_use]
    pub fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Returns the report label for this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MetadataLookupFailed { .. } => FailureKind::MetadataLookupFailed,
            Self::NoOpenAccessCopy { .. } => FailureKind::NoOpenAccessCopy,
            Self::DownloadFailed { .. } => FailureKind::DownloadFailed,
            Self::WriteFailed { .. } => FailureKind::WriteFailed,
        }
    }
}
