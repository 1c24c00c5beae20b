//! Reads the document from a file or stdin.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use paperfetch_core::Document;

/// Root directory for default output locations.
const RESULTS_DIR: &str = "results";

/// Where the document text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DocumentSource {
    File(PathBuf),
    Stdin,
}

/// Picks the document source. `-` means stdin; no argument means stdin
/// only when it is piped.
pub(crate) fn document_source(arg: Option<&Path>, stdin_is_terminal: bool) -> Result<DocumentSource> {
    match arg {
        Some(path) if path == Path::new("-") => Ok(DocumentSource::Stdin),
        Some(path) => Ok(DocumentSource::File(path.to_path_buf())),
        None if !stdin_is_terminal => Ok(DocumentSource::Stdin),
        None => bail!(
            "No document given\n  Suggestion: pass a file path, or pipe text: cat paper.md | paperfetch"
        ),
    }
}

/// Loads the document. Invalid UTF-8 is replaced rather than rejected.
pub(crate) fn read_document(source: &DocumentSource) -> Result<Document> {
    let bytes = match source {
        DocumentSource::File(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read document '{}'", path.display()))?,
        DocumentSource::Stdin => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read document from stdin")?;
            buffer
        }
    };
    Ok(Document::from_text(&String::from_utf8_lossy(&bytes)))
}

/// `results/{stem}` for files, `results/stdin` for piped input.
pub(crate) fn default_output_dir(source: &DocumentSource) -> PathBuf {
    let stem = match source {
        DocumentSource::File(path) => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "document".to_string()),
        DocumentSource::Stdin => "stdin".to_string(),
    };
    Path::new(RESULTS_DIR).join(stem)
}
