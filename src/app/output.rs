//! Stdout rendering of run reports and dry-run listings.

use std::fmt::Write as _;

use anyhow::Result;
use paperfetch_core::parser::{ExtractionSummary, ReferenceEntry, SkipReason, SkippedEntry};
use paperfetch_core::{Extraction, OutcomeStatus, RunReport};
use serde::Serialize;

/// Renders a report as aligned text lines plus the summary line.
pub(crate) fn render_report_text(report: &RunReport) -> String {
    let mut out = String::new();
    let width = report
        .outcomes
        .iter()
        .map(|o| o.identifier.chars().count())
        .max()
        .unwrap_or(0);

    for outcome in &report.outcomes {
        let detail = match &outcome.status {
            OutcomeStatus::Saved { path, bytes } => {
                format!("{} ({bytes} bytes)", path.display())
            }
            OutcomeStatus::Failed { message, .. } => single_line(message),
            OutcomeStatus::NoOpenAccessCopy | OutcomeStatus::NoDoiFound => {
                outcome.doi.clone().unwrap_or_default()
            }
        };
        let _ = writeln!(
            out,
            "  {:<width$}  {:<22}  {detail}",
            outcome.identifier,
            outcome.status.label()
        );
    }
    let _ = writeln!(out, "{}", report.summary_line());
    out
}

/// Serializes a report for `--json`.
pub(crate) fn render_report_json(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[derive(Serialize)]
struct DryRunView<'a> {
    summary: &'a ExtractionSummary,
    entries: &'a [ReferenceEntry],
    skipped: &'a [SkippedEntry],
}

/// Renders the extraction result without any network activity.
pub(crate) fn render_dry_run(extraction: &Extraction, json: bool) -> Result<String> {
    if json {
        let view = DryRunView {
            summary: &extraction.summary,
            entries: &extraction.entries,
            skipped: &extraction.skipped,
        };
        return Ok(serde_json::to_string_pretty(&view)?);
    }

    let mut out = String::new();
    if !extraction.summary.bibliography_found {
        let _ = writeln!(out, "No bibliography section found; nothing to retrieve.");
        let _ = writeln!(out, "Dry run - no files downloaded");
        return Ok(out);
    }

    for entry in &extraction.entries {
        let _ = writeln!(out, "- {} -> {} (line {})", entry.identifier, entry.doi, entry.line);
    }
    for skipped in &extraction.skipped {
        let reason = match skipped.reason {
            SkipReason::NoDoiFound => "no DOI found",
            SkipReason::Duplicate => "duplicate",
        };
        let _ = writeln!(
            out,
            "- [skipped] {} (line {}): {reason}",
            skipped.identifier, skipped.line
        );
    }
    let _ = writeln!(
        out,
        "Dry run summary: {} with DOI, {} without DOI, {} duplicate(s).",
        extraction.summary.emitted, extraction.summary.no_doi, extraction.summary.duplicates
    );
    let _ = writeln!(out, "Dry run - no files downloaded");
    Ok(out)
}

fn single_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}
