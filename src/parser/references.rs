//! Bibliography scanning: (identifier, DOI) pairs from a references section.
//!
//! The extractor walks the lines after the first `references` marker. A line
//! with a parenthesized token is an entry header; its DOI is looked up on the
//! following lines within a bounded window. Identifiers are deduplicated through
//! a caller-owned [`SeenIdentifiers`] set, so one run never yields the same
//! identifier twice.
//!
//! Nothing here fails: malformed sections just produce fewer pairs.

use std::collections::HashSet;
use std::collections::hash_set;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, trace};

use super::document::Document;

/// Default number of lines searched after a header for its DOI line.
pub const DEFAULT_LOOKAHEAD: usize = 3;

/// Largest accepted lookahead window.
pub const MAX_LOOKAHEAD: usize = 10;

/// Literal marker introducing a DOI on an entry line.
pub const DOI_MARKER: &str = "doi:";

/// Identifier: after the first `(`, up to whitespace, `)` or end of line.
#[allow(clippy::expect_used)]
static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([^\s)]*)").expect("reference header regex is valid") // Static pattern, safe to panic
});

/// DOI: between the first `doi:` and the first `. ` that follows it.
#[allow(clippy::expect_used)]
static DOI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"doi:(.*?)\. ").expect("reference DOI regex is valid") // Static pattern, safe to panic
});

/// A cited work found in the bibliography.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceEntry {
    /// Short token taken from the header's parenthesized group.
    pub identifier: String,
    /// DOI taken from the entry's DOI-bearing line.
    pub doi: String,
    /// 1-based line number of the header.
    pub line: usize,
}

/// Why a header produced no pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No `doi:` line within the lookahead window, or the marker had no `. ` terminator.
    NoDoiFound,
    /// Identifier was already seen earlier in this run.
    Duplicate,
}

/// A header that was consumed without emitting a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// Identifier parsed from the header.
    pub identifier: String,
    /// 1-based line number of the header.
    pub line: usize,
    /// Why nothing was emitted.
    pub reason: SkipReason,
}

/// Identifiers already handled in one extraction run.
///
/// Owned by the caller: create one per run and drop it when the run ends.
#[derive(Debug, Clone, Default)]
pub struct SeenIdentifiers {
    inner: HashSet<String>,
}

impl SeenIdentifiers {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `identifier` was already recorded.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.inner.contains(identifier)
    }

    /// Records `identifier`; returns false if it was already present.
    pub fn insert(&mut self, identifier: impl Into<String>) -> bool {
        self.inner.insert(identifier.into())
    }

    /// Number of distinct identifiers recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates recorded identifiers in arbitrary order.
    pub fn iter(&self) -> hash_set::Iter<'_, String> {
        self.inner.iter()
    }
}

/// Counts describing one finished extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExtractionSummary {
    /// Whether a `references` marker line exists.
    pub bibliography_found: bool,
    /// Pairs emitted.
    pub emitted: usize,
    /// Headers without a usable DOI.
    pub no_doi: usize,
    /// Duplicate headers suppressed.
    pub duplicates: usize,
}

/// Lazy iterator over the reference entries of a document.
///
/// Created by [`extract`]. Borrows the caller's [`SeenIdentifiers`] for its
/// lifetime; skip records are available through [`References::skipped`].
#[derive(Debug)]
pub struct References<'a> {
    lines: &'a [String],
    cursor: usize,
    bibliography_found: bool,
    lookahead: usize,
    seen: &'a mut SeenIdentifiers,
    emitted: usize,
    skipped: Vec<SkippedEntry>,
}

/// Starts scanning `document` for reference entries.
///
/// Returns an empty iterator when the document has no bibliography section.
#[tracing::instrument(skip(document, seen), fields(lines = document.len()))]
pub fn extract<'a>(document: &'a Document, seen: &'a mut SeenIdentifiers) -> References<'a> {
    let lines = document.lines();
    let start = document.bibliography_start();
    match start {
        Some(index) => info!(line = index + 1, "bibliography section found"),
        None => debug!("no bibliography section in document"),
    }

    References {
        lines,
        cursor: start.map_or(lines.len(), |index| index + 1),
        bibliography_found: start.is_some(),
        lookahead: DEFAULT_LOOKAHEAD,
        seen,
        emitted: 0,
        skipped: Vec::new(),
    }
}

impl References<'_> {
    /// Sets how many lines after a header are searched for its DOI (clamped to 1..=10).
    #[must_use]
    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead.clamp(1, MAX_LOOKAHEAD);
        self
    }

    /// Whether the document contained a bibliography section.
    #[must_use]
    pub fn bibliography_found(&self) -> bool {
        self.bibliography_found
    }

    /// Headers consumed so far without emitting a pair.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// Consumes the iterator's skip records.
    #[must_use]
    pub fn into_skipped(self) -> Vec<SkippedEntry> {
        self.skipped
    }

    /// Counts for what has been scanned so far.
    #[must_use]
    pub fn summary(&self) -> ExtractionSummary {
        let duplicates = self
            .skipped
            .iter()
            .filter(|entry| entry.reason == SkipReason::Duplicate)
            .count();
        ExtractionSummary {
            bibliography_found: self.bibliography_found,
            emitted: self.emitted,
            no_doi: self.skipped.len() - duplicates,
            duplicates,
        }
    }

    fn skip(&mut self, identifier: String, header_index: usize, reason: SkipReason) {
        debug!(%identifier, line = header_index + 1, ?reason, "reference skipped");
        self.skipped.push(SkippedEntry {
            identifier,
            line: header_index + 1,
            reason,
        });
    }

    /// Searches the window after a header for its DOI line.
    fn search_doi(&self, header_index: usize) -> DoiSearch {
        let last = (header_index + self.lookahead).min(self.lines.len().saturating_sub(1));

        for index in header_index + 1..=last {
            let line = self.lines[index].trim();
            if line.is_empty() {
                continue;
            }
            if line.contains(DOI_MARKER) {
                return DoiSearch {
                    doi: doi_from_line(line),
                    resume_at: index + 1,
                };
            }
            if header_identifier(line).is_some() {
                trace!(line = index + 1, "next header reached before a DOI line");
                return DoiSearch {
                    doi: None,
                    resume_at: index,
                };
            }
        }

        DoiSearch {
            doi: None,
            resume_at: header_index + 1,
        }
    }
}

struct DoiSearch {
    doi: Option<String>,
    resume_at: usize,
}

impl Iterator for References<'_> {
    type Item = ReferenceEntry;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.lines.len() {
            let index = self.cursor;
            let Some(identifier) = header_identifier(self.lines[index].trim()) else {
                self.cursor += 1;
                continue;
            };

            let search = self.search_doi(index);
            self.cursor = search.resume_at;

            if self.seen.contains(&identifier) {
                self.skip(identifier, index, SkipReason::Duplicate);
                continue;
            }
            self.seen.insert(identifier.clone());

            match search.doi {
                Some(doi) => {
                    debug!(%identifier, %doi, line = index + 1, "reference extracted");
                    self.emitted += 1;
                    return Some(ReferenceEntry {
                        identifier,
                        doi,
                        line: index + 1,
                    });
                }
                None => self.skip(identifier, index, SkipReason::NoDoiFound),
            }
        }
        None
    }
}

/// Parses a header line's identifier; `None` if the line is not a header.
#[must_use]
pub fn header_identifier(line: &str) -> Option<String> {
    let captures = HEADER_PATTERN.captures(line)?;
    let identifier = captures.get(1)?.as_str();
    (!identifier.is_empty()).then(|| identifier.to_string())
}

/// Extracts the DOI from a `doi:`-bearing line; `None` without a `. ` terminator.
#[must_use]
pub fn doi_from_line(line: &str) -> Option<String> {
    let captures = DOI_PATTERN.captures(line)?;
    let doi = captures.get(1)?.as_str().trim();
    (!doi.is_empty()).then(|| doi.to_string())
}

/// Result of running an extraction to completion.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Emitted pairs, in document order.
    pub entries: Vec<ReferenceEntry>,
    /// Headers that produced no pair.
    pub skipped: Vec<SkippedEntry>,
    /// Counts for the run.
    pub summary: ExtractionSummary,
    /// The fully populated seen set.
    pub seen: SeenIdentifiers,
}

/// Runs a complete extraction pass with a fresh seen set.
#[must_use]
pub fn extract_all(document: &Document, lookahead: usize) -> Extraction {
    let mut seen = SeenIdentifiers::new();
    let mut references = extract(document, &mut seen).with_lookahead(lookahead);
    let entries: Vec<ReferenceEntry> = references.by_ref().collect();
    let summary = references.summary();
    let skipped = references.into_skipped();

    Extraction {
        entries,
        skipped,
        summary,
        seen,
    }
}
