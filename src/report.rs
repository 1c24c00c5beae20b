//! Per-run outcome reporting.
//!
//! A [`RunReport`] lists every extracted identifier with what happened to it,
//! so partial success is visible without reading logs.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::fetch::FailureKind;
use crate::parser::ExtractionSummary;

/// What happened to one bibliography entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryOutcome {
    /// Identifier taken from the entry header.
    pub identifier: String,
    /// DOI, when one was found.
    pub doi: Option<String>,
    /// 1-based line of the entry header.
    pub line: usize,
    /// Result of processing the entry.
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

/// Result of processing one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The PDF was written.
    Saved {
        /// Destination file.
        path: PathBuf,
        /// Bytes written.
        bytes: u64,
    },
    /// The lookup service lists no PDF for this DOI.
    NoOpenAccessCopy,
    /// The entry had no DOI line; nothing was attempted.
    NoDoiFound,
    /// Lookup, download or write failed.
    Failed {
        /// Failure category.
        kind: FailureKind,
        /// Human-readable detail.
        message: String,
    },
}

impl OutcomeStatus {
    /// Short label for tables and logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Saved { .. } => "saved",
            Self::NoOpenAccessCopy => "no open-access copy",
            Self::NoDoiFound => "no DOI found",
            Self::Failed { kind, .. } => kind.label(),
        }
    }

    /// True when a lookup was attempted for this entry.
    #[must_use]
    pub fn was_attempted(&self) -> bool {
        !matches!(self, Self::NoDoiFound)
    }
}

/// Overall classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunStatus {
    /// The document has no line containing "references".
    NoBibliographySection,
    /// A bibliography was found but no PDF was saved, including when no DOI was found.
    NothingRetrieved {
        /// DOIs attempted.
        attempted: usize,
    },
    /// `retrieved` of `attempted` DOIs were saved.
    Retrieved {
        /// DOIs saved.
        retrieved: usize,
        /// DOIs attempted.
        attempted: usize,
    },
}

/// Process exit classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Everything attempted was saved, or nothing needed attempting.
    Success,
    /// Some DOIs were saved, some were not.
    Partial,
    /// DOIs were attempted and none were saved.
    Failure,
}

impl ExitOutcome {
    /// Numeric process exit code.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Partial => 2,
        }
    }
}

/// Complete result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Overall classification.
    pub status: RunStatus,
    /// Extraction counters.
    pub extraction: ExtractionSummary,
    /// One outcome per unique identifier, in document order.
    pub outcomes: Vec<EntryOutcome>,
}

impl RunReport {
    /// Report for a document without a bibliography section.
    #[must_use]
    pub fn no_bibliography(extraction: ExtractionSummary) -> Self {
        Self {
            status: RunStatus::NoBibliographySection,
            extraction,
            outcomes: Vec::new(),
        }
    }

    /// Builds a report from outcomes, deriving the run status.
    #[must_use]
    pub fn from_outcomes(extraction: ExtractionSummary, outcomes: Vec<EntryOutcome>) -> Self {
        let attempted = outcomes.iter().filter(|o| o.status.was_attempted()).count();
        let retrieved = outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Saved { .. }))
            .count();
        let status = if !extraction.bibliography_found {
            RunStatus::NoBibliographySection
        } else if retrieved == 0 {
            RunStatus::NothingRetrieved { attempted }
        } else {
            RunStatus::Retrieved {
                retrieved,
                attempted,
            }
        };
        Self {
            status,
            extraction,
            outcomes,
        }
    }

    /// Number of PDFs saved.
    #[must_use]
    pub fn retrieved(&self) -> usize {
        match self.status {
            RunStatus::Retrieved { retrieved, .. } => retrieved,
            _ => 0,
        }
    }

    /// Number of DOIs looked up.
    #[must_use]
    pub fn attempted(&self) -> usize {
        match self.status {
            RunStatus::NoBibliographySection => 0,
            RunStatus::NothingRetrieved { attempted }
            | RunStatus::Retrieved { attempted, .. } => attempted,
        }
    }

    /// Outcomes whose lookup or download did not produce a file.
    pub fn unsuccessful(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o.status, OutcomeStatus::Saved { .. }))
    }

    /// One-line human summary.
    #[must_use]
    pub fn summary_line(&self) -> String {
        match self.status {
            RunStatus::NoBibliographySection => {
                "No bibliography section found; nothing to retrieve.".to_string()
            }
            RunStatus::NothingRetrieved { attempted } => {
                let line = format!("Bibliography found but 0 of {attempted} PDFs retrieved.");
                self.with_no_doi_note(line)
            }
            RunStatus::Retrieved {
                retrieved,
                attempted,
            } => self.with_no_doi_note(format!("Retrieved {retrieved} of {attempted} PDFs.")),
        }
    }

    fn with_no_doi_note(&self, mut line: String) -> String {
        match self.extraction.no_doi {
            0 => {}
            1 => line.push_str(" 1 entry had no DOI."),
            n => {
                let _ = write!(line, " {n} entries had no DOI.");
            }
        }
        line
    }

    /// Exit classification for the process.
    #[must_use]
    pub fn exit_outcome(&self) -> ExitOutcome {
        match self.status {
            RunStatus::NoBibliographySection | RunStatus::NothingRetrieved { attempted: 0 } => {
                ExitOutcome::Success
            }
            RunStatus::NothingRetrieved { .. } => ExitOutcome::Failure,
            RunStatus::Retrieved {
                retrieved,
                attempted,
            } => {
                if retrieved == attempted {
                    ExitOutcome::Success
                } else {
                    ExitOutcome::Partial
                }
            }
        }
    }

    /// Numeric exit code: 0 success (or nothing to attempt), 2 partial, 1 nothing retrieved.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.exit_outcome().code()
    }
}
