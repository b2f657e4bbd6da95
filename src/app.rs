//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initializes logging
//! - loads the chart CSV into the record store
//! - computes and prints views, or hands off to the TUI
//! - writes optional exports

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Command, SampleArgs, SourceArgs, ViewArgs};
use crate::data::{SampleConfig, generate_rows};
use crate::error::AppError;

pub mod pipeline;

const DEFAULT_LOG_FILTER: &str = "chart_views=info";

/// Entry point for the `charts` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may provide CHARTS_CSV / CHARTS_TOP_N / RUST_LOG.
    dotenvy::dotenv().ok();

    // We want `charts` and `charts -f x.csv` to behave like `charts tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::View(args) => {
            init_logging(None)?;
            handle_view(args)
        }
        Command::Dates(args) => {
            init_logging(None)?;
            handle_dates(args)
        }
        Command::Sample(args) => {
            init_logging(None)?;
            handle_sample(args)
        }
        Command::Tui(args) => {
            // The UI owns the terminal: only log when a file is given.
            if let Some(path) = &args.log_file {
                init_logging(Some(path))?;
            }
            crate::tui::run(args)
        }
    }
}

fn handle_view(args: ViewArgs) -> Result<(), AppError> {
    let path = pipeline::resolve_csv_path(&args.source)?;
    let load = pipeline::load_charts(&path)?;
    let params = pipeline::resolve_selection(&args.selection, &load.store)?;
    let run = pipeline::run_view(&load.store, &params)?;

    println!("{}", crate::report::format_run_summary(&load, &run.params, run.date));
    println!("{}", crate::report::format_view(&run.view));

    if let Some(export) = &args.export {
        crate::io::export::write_view_json(export, &run.params, run.date, &run.view)?;
        info!(path = %export.display(), "exported view");
    }

    Ok(())
}

fn handle_dates(args: SourceArgs) -> Result<(), AppError> {
    let path = pipeline::resolve_csv_path(&args)?;
    let load = pipeline::load_charts(&path)?;
    print!("{}", crate::report::format_dates(load.store.distinct_dates_ascending()));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        start: args.start,
        weeks: args.weeks,
        songs: args.songs,
        chart_size: args.chart_size,
        seed: args.seed,
    };
    let rows = generate_rows(&config)?;
    crate::io::export::write_raw_csv(&args.out, &rows)?;
    info!(path = %args.out.display(), rows = rows.len(), "wrote sample chart CSV");
    Ok(())
}

/// Install the global tracing subscriber (stderr, or a file when given).
fn init_logging(log_file: Option<&Path>) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::new(2, format!("Failed to create log file '{}': {e}", path.display())))?;
            registry
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()
        }
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| AppError::new(4, format!("Failed to initialize logging: {e}")))
}

/// Rewrite argv so `charts` defaults to `charts tui`.
///
/// Rules:
/// - `charts`                         -> `charts tui`
/// - `charts -f x.csv ...`            -> `charts tui -f x.csv ...`
/// - `charts --help/--version/-h`     -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if matches!(arg1.as_str(), "view" | "dates" | "sample" | "tui") {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["charts"])), argv(&["charts", "tui"]));
    }

    #[test]
    fn leading_flags_are_tui_flags() {
        assert_eq!(
            rewrite_args(argv(&["charts", "-f", "x.csv"])),
            argv(&["charts", "tui", "-f", "x.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(argv(&["charts", "view", "-n", "3"])), argv(&["charts", "view", "-n", "3"]));
        assert_eq!(rewrite_args(argv(&["charts", "--help"])), argv(&["charts", "--help"]));
    }
}
