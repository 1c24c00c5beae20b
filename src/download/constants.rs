//! Constants for the download module.

/// Largest PDF body accepted (100 MiB).
pub const DEFAULT_MAX_PDF_BYTES: u64 = 100 * 1024 * 1024;

/// PDF header signature.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// How far into the body the PDF header may appear (leading junk is tolerated).
pub const PDF_MAGIC_SEARCH_WINDOW: usize = 1024;

/// Suffix of the staging file written before the final rename.
pub const PARTIAL_SUFFIX: &str = ".part";
