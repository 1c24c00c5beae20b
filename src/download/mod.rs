//! PDF download and persistence.
//!
//! # Features
//!
//! - Bounded in-memory download (default cap 100 MiB)
//! - `%PDF-` signature check before anything is written
//! - Staging file plus rename, so failures leave no partial artifact
//! - Structured error types with full context

mod client;
mod constants;
mod error;

pub use client::{HttpClient, has_pdf_signature};
pub use constants::DEFAULT_MAX_PDF_BYTES;
pub use error::DownloadError;
