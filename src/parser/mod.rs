//! Document parsing: bibliography location and reference extraction.
//!
//! - [`Document`] - owned document lines
//! - [`extract`] - lazy iterator over deduplicated (identifier, DOI) pairs
//! - [`extract_all`] - complete extraction pass returning entries, skips and the seen set

mod document;
mod references;

pub use document::{BIBLIOGRAPHY_MARKER, Document};
pub use references::{
    DEFAULT_LOOKAHEAD, DOI_MARKER, Extraction, ExtractionSummary, MAX_LOOKAHEAD, ReferenceEntry,
    References, SeenIdentifiers, SkipReason, SkippedEntry, doi_from_line, extract, extract_all,
    header_identifier,
};
