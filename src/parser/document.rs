//! Owned document text split into lines.

/// Case-insensitive token that marks the start of the bibliography section.
pub const BIBLIOGRAPHY_MARKER: &str = "references";

/// An ordered, immutable sequence of document lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    /// Splits raw text into lines (`\n` or `\r\n` separated).
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Builds a document from already-split lines.
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns all lines in order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true when the document has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the first line whose lowercase form contains `references`.
    #[must_use]
    pub fn bibliography_start(&self) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.to_lowercase().contains(BIBLIOGRAPHY_MARKER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_handles_crlf() {
        let doc = Document::from_text("Intro\r\nReferences\r\n(Smith2020 x)");
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.lines()[1], "References");
    }

    #[test]
    fn test_bibliography_start_is_case_insensitive() {
        let doc = Document::from_lines(["Intro", "text", "## REFERENCES", "entry"]);
        assert_eq!(doc.bibliography_start(), Some(2));
    }

    #[test]
    fn test_bibliography_start_picks_first_match() {
        let doc = Document::from_lines(["See references below", "References"]);
        assert_eq!(doc.bibliography_start(), Some(0));
    }

    #[test]
    fn test_bibliography_start_none_without_marker() {
        let doc = Document::from_lines(["Intro", "Bibliography", "(Smith2020 2020)"]);
        assert_eq!(doc.bibliography_start(), None);
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::from_text("");
        assert!(doc.is_empty());
        assert_eq!(doc.bibliography_start(), None);
    }
}
