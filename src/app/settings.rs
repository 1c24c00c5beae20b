//! Merges CLI flags, environment and config file into runtime settings.
//!
//! Precedence: CLI flag > environment > config file > built-in default.

use std::path::PathBuf;

use paperfetch_core::{HttpTimeouts, PipelineOptions};

use crate::app_config::FileConfig;
use crate::cli::Args;

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub contact_email: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub options: PipelineOptions,
    pub timeouts: HttpTimeouts,
    pub log_level: &'static str,
}

pub(crate) fn resolve_settings(args: &Args, env_email: Option<String>, file: FileConfig) -> Settings {
    let log_level = resolve_log_level(args, &file);
    let defaults = PipelineOptions::default();
    let default_timeouts = HttpTimeouts::default();

    let contact_email = args
        .email
        .clone()
        .or(env_email)
        .or(file.contact_email);

    let options = PipelineOptions {
        concurrency: args
            .concurrency
            .or(file.concurrency)
            .map_or(defaults.concurrency, usize::from),
        lookahead: args
            .lookahead
            .or(file.lookahead)
            .map_or(defaults.lookahead, usize::from),
    };

    let timeouts = HttpTimeouts {
        connect_secs: file
            .connect_timeout_secs
            .unwrap_or(default_timeouts.connect_secs),
        request_secs: args
            .timeout
            .or(file.request_timeout_secs)
            .unwrap_or(default_timeouts.request_secs),
    };

    Settings {
        contact_email,
        output_dir: args.output_dir.clone().or(file.output_dir),
        options,
        timeouts,
        log_level,
    }
}

/// Log level from `-q`/`-v`, falling back to the config file.
fn resolve_log_level(args: &Args, file: &FileConfig) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => file.verbosity.map_or("info", |v| v.log_level()),
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::VerbositySetting;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["paperfetch"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_without_any_source() {
        let settings = resolve_settings(&args(&[]), None, FileConfig::default());
        assert_eq!(settings.contact_email, None);
        assert_eq!(settings.options, PipelineOptions::default());
        assert_eq!(settings.timeouts, HttpTimeouts::default());
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_cli_email_beats_env_and_file() {
        let file = FileConfig {
            contact_email: Some("file@example.org".to_string()),
            ..FileConfig::default()
        };
        let settings = resolve_settings(
            &args(&["-e", "cli@example.org"]),
            Some("env@example.org".to_string()),
            file,
        );
        assert_eq!(settings.contact_email.as_deref(), Some("cli@example.org"));
    }

    #[test]
    fn test_env_email_beats_file() {
        let file = FileConfig {
            contact_email: Some("file@example.org".to_string()),
            ..FileConfig::default()
        };
        let settings = resolve_settings(&args(&[]), Some("env@example.org".to_string()), file);
        assert_eq!(settings.contact_email.as_deref(), Some("env@example.org"));
    }

    #[test]
    fn test_file_values_used_when_cli_silent() {
        let file = FileConfig {
            concurrency: Some(9),
            lookahead: Some(5),
            connect_timeout_secs: Some(3),
            request_timeout_secs: Some(90),
            output_dir: Some(PathBuf::from("papers")),
            ..FileConfig::default()
        };
        let settings = resolve_settings(&args(&["--lookahead", "2"]), None, file);
        assert_eq!(settings.options.concurrency, 9);
        assert_eq!(settings.options.lookahead, 2);
        assert_eq!(settings.timeouts.connect_secs, 3);
        assert_eq!(settings.timeouts.request_secs, 90);
        assert_eq!(settings.output_dir, Some(PathBuf::from("papers")));
    }

    #[test]
    fn test_cli_timeout_overrides_file() {
        let file = FileConfig {
            request_timeout_secs: Some(90),
            ..FileConfig::default()
        };
        let settings = resolve_settings(&args(&["--timeout", "12"]), None, file);
        assert_eq!(settings.timeouts.request_secs, 12);
    }

    #[test]
    fn test_full_file_config_resolves_every_field() {
        let file = FileConfig {
            contact_email: Some("file@example.org".to_string()),
            output_dir: Some(PathBuf::from("papers")),
            verbosity: Some(VerbositySetting::Verbose),
            ..FileConfig::default()
        };
        let settings = resolve_settings(&args(&[]), None, file);
        assert_eq!(settings.contact_email.as_deref(), Some("file@example.org"));
        assert_eq!(settings.output_dir, Some(PathBuf::from("papers")));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_log_level_flags_beat_config_verbosity() {
        let file = FileConfig {
            verbosity: Some(VerbositySetting::Debug),
            ..FileConfig::default()
        };
        assert_eq!(resolve_log_level(&args(&[]), &file), "trace");
        assert_eq!(resolve_log_level(&args(&["-q"]), &file), "error");
        assert_eq!(resolve_log_level(&args(&["-v"]), &file), "debug");
        assert_eq!(resolve_log_level(&args(&["-vv"]), &FileConfig::default()), "trace");
    }
}
