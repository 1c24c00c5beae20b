//! Extraction followed by concurrent per-DOI retrieval.
//!
//! [`Pipeline::run`] first runs the extractor to completion, so the seen set
//! is fully populated before any network call. Each entry with a DOI is then
//! resolved in its own Tokio task, bounded by a semaphore. A failure or panic
//! in one task becomes that entry's outcome and never stops the others.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use paperfetch_core::{Document, HttpClient, HttpTimeouts, Pipeline, PipelineOptions};
//! use paperfetch_core::resolver::UnpaywallResolver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let timeouts = HttpTimeouts::default();
//! let locator = Arc::new(UnpaywallResolver::new("me@example.org", timeouts)?);
//! let client = HttpClient::new(timeouts)?;
//! let pipeline = Pipeline::new(locator, client, PipelineOptions::default())?;
//!
//! let document = Document::from_text("References\n(Smith2020 2020)\ndoi:10.1/xyz. Pub.\n");
//! let report = pipeline.run(&document, Path::new("./papers")).await?;
//! println!("{}", report.summary_line());
//! # Ok(())
//! # }
//! ```

mod filename;

pub use filename::{artifact_file_name, assign_file_names};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::download::HttpClient;
use crate::fetch::{FailureKind, FetchError, OpenAccessFetcher, SavedArtifact};
use crate::parser::{
    DEFAULT_LOOKAHEAD, Document, Extraction, MAX_LOOKAHEAD, SkipReason, extract_all,
};
use crate::report::{EntryOutcome, OutcomeStatus, RunReport};
use crate::resolver::PdfLocator;

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 32;

/// Default number of DOIs resolved at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Callback invoked once per finished entry.
pub type ProgressFn = Arc<dyn Fn(&EntryOutcome) + Send + Sync>;

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Concurrency outside the accepted range.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The rejected value.
        value: usize,
    },

    /// Lookahead outside the accepted range.
    #[error("invalid lookahead value {value}: must be between 1 and {MAX_LOOKAHEAD}")]
    InvalidLookahead {
        /// The rejected value.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Tunables for a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Maximum DOIs resolved at once (1-32).
    pub concurrency: usize,
    /// Lines searched after a header for its DOI line (1-10).
    pub lookahead: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }
}

/// Runs extraction and retrieval for one document at a time.
#[derive(Debug)]
pub struct Pipeline {
    fetcher: OpenAccessFetcher,
    semaphore: Arc<Semaphore>,
    options: PipelineOptions,
}

/// An entry scheduled for download.
struct Job {
    identifier: String,
    doi: String,
    line: usize,
    destination: PathBuf,
}

impl Pipeline {
    /// Creates a pipeline from a PDF locator and a download client.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConcurrency`] or
    /// [`PipelineError::InvalidLookahead`] when an option is out of range.
    #[instrument(level = "debug", skip(locator, client))]
    pub fn new(
        locator: Arc<dyn PdfLocator>,
        client: HttpClient,
        options: PipelineOptions,
    ) -> Result<Self, PipelineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&options.concurrency) {
            return Err(PipelineError::InvalidConcurrency {
                value: options.concurrency,
            });
        }
        if !(1..=MAX_LOOKAHEAD).contains(&options.lookahead) {
            return Err(PipelineError::InvalidLookahead {
                value: options.lookahead,
            });
        }

        debug!(
            locator = locator.name(),
            concurrency = options.concurrency,
            lookahead = options.lookahead,
            "creating pipeline"
        );

        Ok(Self {
            fetcher: OpenAccessFetcher::new(locator, client),
            semaphore: Arc::new(Semaphore::new(options.concurrency)),
            options,
        })
    }

    /// Returns the configured options.
    #[must_use]
    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Runs only the extraction pass, with this pipeline's lookahead.
    #[must_use]
    pub fn extract(&self, document: &Document) -> Extraction {
        extract_all(document, self.options.lookahead)
    }

    /// Extracts references from `document` and saves every retrievable PDF
    /// under `output_dir` as `{identifier}.pdf`.
    ///
    /// `output_dir` must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SemaphoreClosed`] only if the internal
    /// semaphore is closed. Per-entry failures are reported in the
    /// [`RunReport`], never as an error.
    pub async fn run(
        &self,
        document: &Document,
        output_dir: &Path,
    ) -> Result<RunReport, PipelineError> {
        self.retrieve(self.extract(document), output_dir, None).await
    }

    /// Like [`Pipeline::run`], calling `progress` as each entry finishes.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::run`].
    pub async fn run_with_progress(
        &self,
        document: &Document,
        output_dir: &Path,
        progress: ProgressFn,
    ) -> Result<RunReport, PipelineError> {
        self.retrieve(self.extract(document), output_dir, Some(progress))
            .await
    }

    /// Retrieves PDFs for an already completed extraction pass.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::run`].
    #[instrument(skip(self, extraction, progress), fields(output_dir = %output_dir.display(), entries = extraction.entries.len()))]
    pub async fn retrieve(
        &self,
        extraction: Extraction,
        output_dir: &Path,
        progress: Option<ProgressFn>,
    ) -> Result<RunReport, PipelineError> {
        if !extraction.summary.bibliography_found {
            info!("no bibliography section found");
            return Ok(RunReport::no_bibliography(extraction.summary));
        }

        let names = assign_file_names(extraction.entries.iter().map(|e| e.identifier.as_str()));
        let jobs: Vec<Job> = extraction
            .entries
            .into_iter()
            .zip(names)
            .map(|(entry, name)| Job {
                destination: output_dir.join(name),
                identifier: entry.identifier,
                doi: entry.doi,
                line: entry.line,
            })
            .collect();

        let mut outcomes: Vec<EntryOutcome> = extraction
            .skipped
            .into_iter()
            .filter(|skip| skip.reason == SkipReason::NoDoiFound)
            .map(|skip| EntryOutcome {
                identifier: skip.identifier,
                doi: None,
                line: skip.line,
                status: OutcomeStatus::NoDoiFound,
            })
            .collect();
        if let Some(progress) = &progress {
            outcomes.iter().for_each(|o| progress(o));
        }

        info!(entries = jobs.len(), "starting retrieval");

        let mut handles = Vec::with_capacity(jobs.len());
        for job in jobs {
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| PipelineError::SemaphoreClosed)?;

            let fetcher = self.fetcher.clone();
            let progress = progress.clone();
            let identifier = job.identifier.clone();
            let doi = job.doi.clone();
            let line = job.line;

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = fetcher.resolve_and_save(&job.doi, &job.destination).await;
                let outcome = outcome_for(job, result);
                if let Some(progress) = &progress {
                    progress(&outcome);
                }
                outcome
            });
            handles.push((identifier, doi, line, handle));
        }

        for (identifier, doi, line, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    warn!(%identifier, error = %e, "retrieval task panicked");
                    let outcome = EntryOutcome {
                        identifier,
                        doi: Some(doi),
                        line,
                        status: OutcomeStatus::Failed {
                            kind: FailureKind::TaskPanicked,
                            message: e.to_string(),
                        },
                    };
                    if let Some(progress) = &progress {
                        progress(&outcome);
                    }
                    outcomes.push(outcome);
                }
            }
        }

        outcomes.sort_by_key(|o| o.line);
        let report = RunReport::from_outcomes(extraction.summary, outcomes);
        info!(
            retrieved = report.retrieved(),
            attempted = report.attempted(),
            "retrieval complete"
        );
        Ok(report)
    }
}

fn outcome_for(job: Job, result: Result<SavedArtifact, FetchError>) -> EntryOutcome {
    let status = match result {
        Ok(saved) => OutcomeStatus::Saved {
            path: saved.path,
            bytes: saved.bytes,
        },
        Err(FetchError::NoOpenAccessCopy { .. }) => {
            info!(identifier = %job.identifier, doi = %job.doi, "no open-access copy");
            OutcomeStatus::NoOpenAccessCopy
        }
        Err(e) => {
            warn!(identifier = %job.identifier, doi = %job.doi, error = %e, "retrieval failed");
            OutcomeStatus::Failed {
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    };
    EntryOutcome {
        identifier: job.identifier,
        doi: Some(job.doi),
        line: job.line,
        status,
    }
}
