//! CLI entry point for paperfetch.

use std::process::ExitCode;

use anyhow::Result;

mod app;
mod app_config;
mod cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    app::runtime::run_paperfetch().await
}
