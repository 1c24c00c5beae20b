//! Paperfetch core library
//!
//! Finds the bibliography of a plain-text document, pulls out
//! `(identifier, DOI)` pairs, and saves an open-access PDF for each DOI
//! that has one.
//!
//! # Architecture
//!
//! - [`parser`] - document model and the reference extractor
//! - [`resolver`] - DOI to PDF-location lookup ([`resolver::UnpaywallResolver`])
//! - [`download`] - bounded PDF download and atomic save
//! - [`fetch`] - one DOI end to end, with the per-entry error taxonomy
//! - [`pipeline`] - extraction then concurrent retrieval for a whole document
//! - [`report`] - per-entry outcomes and run status

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod fetch;
mod http_client;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod resolver;
#[cfg(test)]
pub(crate) mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use download::{DownloadError, HttpClient};
pub use fetch::{FailureKind, FetchError, OpenAccessFetcher, SavedArtifact};
pub use http_client::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, HttpTimeouts};
pub use parser::{Document, Extraction, ReferenceEntry, SeenIdentifiers, extract, extract_all};
pub use pipeline::{Pipeline, PipelineError, PipelineOptions};
pub use report::{EntryOutcome, ExitOutcome, OutcomeStatus, RunReport, RunStatus};
pub use resolver::{PdfLocator, ResolveError, UnpaywallResolver};
