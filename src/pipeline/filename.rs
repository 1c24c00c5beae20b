//! Output file names for retrieved PDFs.

use std::collections::HashSet;

/// Extension appended to every artifact name.
const PDF_EXTENSION: &str = ".pdf";

/// Fallback stem when an identifier sanitizes to nothing.
const FALLBACK_STEM: &str = "reference";

/// Builds `{identifier}.pdf` with path separators, control characters and
/// characters reserved on common file systems replaced by `_`.
#[must_use]
pub fn artifact_file_name(identifier: &str) -> String {
    format!("{}{PDF_EXTENSION}", sanitize_stem(identifier))
}

/// Assigns one file name per identifier, in order.
///
/// Distinct identifiers that sanitize to the same name get `_2`, `_3`, ...
/// suffixes so no two entries write the same file.
pub fn assign_file_names<'a, I>(identifiers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut used: HashSet<String> = HashSet::new();
    identifiers
        .into_iter()
        .map(|identifier| {
            let stem = sanitize_stem(identifier);
            let mut candidate = stem.clone();
            let mut counter = 2u32;
            while !used.insert(candidate.to_lowercase()) {
                candidate = format!("{stem}_{counter}");
                counter += 1;
            }
            format!("{candidate}{PDF_EXTENSION}")
        })
        .collect()
}

fn sanitize_stem(identifier: &str) -> String {
    let mapped: String = identifier
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    let trimmed = mapped.trim_matches('.');
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}
