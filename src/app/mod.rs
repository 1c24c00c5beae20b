//! Binary-side orchestration: settings, input, progress and output.

pub(crate) mod input;
pub(crate) mod output;
pub(crate) mod progress;
pub(crate) mod runtime;
pub(crate) mod settings;
pub(crate) mod terminal;
