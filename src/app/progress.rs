//! Progress bar for retrieval runs.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use paperfetch_core::EntryOutcome;
use paperfetch_core::pipeline::ProgressFn;

/// Creates a bar over `total` entries and the callback that advances it.
/// Returns `None` when the bar is disabled.
pub(crate) fn progress_bar(enabled: bool, total: usize) -> Option<(ProgressBar, ProgressFn)> {
    if !enabled || total == 0 {
        return None;
    }
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let handle = bar.clone();
    let callback: ProgressFn = Arc::new(move |outcome: &EntryOutcome| {
        handle.set_message(format!("{} ({})", outcome.identifier, outcome.status.label()));
        handle.inc(1);
    });
    Some((bar, callback))
}
