//! Open-access PDF location lookup.
//!
//! - [`PdfLocator`] - async trait mapping a DOI to a direct PDF URL
//! - [`UnpaywallResolver`] - implementation backed by the Unpaywall v2 API
//! - [`ResolveError`] - setup errors (missing contact email, client construction)
//!
//! Per-DOI lookup failures are reported as [`FetchError`] values so the caller
//! can record them and continue.
//!
//! # Example
//!
//! ```no_run
//! use paperfetch_core::HttpTimeouts;
//! use paperfetch_core::resolver::{PdfLocator, UnpaywallResolver};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = UnpaywallResolver::new("me@example.org", HttpTimeouts::default())?;
//! let pdf_url = resolver.locate("10.1371/journal.pone.0000001").await?;
//! println!("PDF at {pdf_url}");
//! # Ok(())
//! # }
//! ```

mod error;
mod unpaywall;

pub use error::ResolveError;
pub use unpaywall::{DEFAULT_UNPAYWALL_BASE_URL, UnpaywallResolver};

use async_trait::async_trait;

use crate::fetch::FetchError;

/// Finds a direct PDF URL for a DOI.
///
/// Uses `async_trait` so the pipeline can hold a `dyn PdfLocator`.
#[async_trait]
pub trait PdfLocator: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Returns the PDF URL for `doi`.
    ///
    /// # Errors
    ///
    /// [`FetchError::MetadataLookupFailed`] when the lookup itself fails,
    /// [`FetchError::NoOpenAccessCopy`] when no PDF location is listed.
    async fn locate(&self, doi: &str) -> Result<String, FetchError>;
}
