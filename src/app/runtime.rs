//! One paperfetch run, from argument parsing to exit code.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use paperfetch_core::resolver::UnpaywallResolver;
use paperfetch_core::{HttpClient, Pipeline};
use tracing::{debug, info};

use crate::app::{input, output, progress, settings, terminal};
use crate::app_config;
use crate::cli::Args;

pub(crate) async fn run_paperfetch() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let file_config = app_config::load_file_config(args.config.as_deref())?;
    let settings = settings::resolve_settings(&args, app_config::email_from_env(), file_config);
    terminal::init_tracing(settings.log_level);

    debug!(?args, "CLI arguments parsed");

    let source = input::document_source(args.document.as_deref(), io::stdin().is_terminal())?;
    let document = input::read_document(&source)?;
    info!(lines = document.len(), "document loaded");

    if args.dry_run {
        let extraction = paperfetch_core::extract_all(&document, settings.options.lookahead);
        print!("{}", output::render_dry_run(&extraction, args.json)?);
        return Ok(ExitCode::SUCCESS);
    }

    let email = settings.contact_email.as_deref().unwrap_or_default();
    let locator = match args.lookup_url.as_deref() {
        Some(base_url) => UnpaywallResolver::with_base_url(email, base_url, settings.timeouts)?,
        None => UnpaywallResolver::new(email, settings.timeouts)?,
    };
    let client = HttpClient::new(settings.timeouts)?;
    let pipeline = Pipeline::new(Arc::new(locator), client, settings.options)?;

    let output_dir = settings
        .output_dir
        .clone()
        .unwrap_or_else(|| input::default_output_dir(&source));

    let extraction = pipeline.extract(&document);
    let progress = if extraction.summary.bibliography_found {
        if !output_dir.exists() {
            tokio::fs::create_dir_all(&output_dir)
                .await
                .with_context(|| {
                    format!("Failed to create output directory '{}'", output_dir.display())
                })?;
            info!(dir = %output_dir.display(), "Created output directory");
        }

        let use_bar = terminal::should_use_progress_bar(
            io::stderr().is_terminal(),
            args.quiet,
            args.json,
            terminal::is_dumb_terminal(),
        );
        let total = extraction.entries.len() + extraction.summary.no_doi;
        progress::progress_bar(use_bar, total)
    } else {
        None
    };

    let (bar, callback) = progress.unzip();
    let report = pipeline.retrieve(extraction, &output_dir, callback).await?;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    if args.json {
        println!("{}", output::render_report_json(&report)?);
    } else {
        print!("{}", output::render_report_text(&report));
    }

    Ok(ExitCode::from(report.exit_code()))
}
