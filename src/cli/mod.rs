//! Command-line parsing for the chart viewer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! aggregation engine: flags are turned into a `SelectionParameters` snapshot by
//! `app::pipeline::resolve_selection`, never read by the engine directly.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{Country, SortKey, ViewMode};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "charts", version, about = "Streaming chart views: top songs, top artists, song performance")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute one view and print it as a table (optionally export JSON).
    View(ViewArgs),
    /// List the distinct chart dates and their indices.
    Dates(SourceArgs),
    /// Write a synthetic chart CSV (deterministic for a seed).
    Sample(SampleArgs),
    /// Launch the interactive TUI.
    ///
    /// Every key press changes one parameter and recomputes the whole view.
    Tui(TuiArgs),
}

/// Where the chart rows come from.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Chart CSV (columns: date, rank, region, artist, title, streams).
    #[arg(short = 'f', long = "file", value_name = "CSV", env = "CHARTS_CSV")]
    pub csv: Option<PathBuf>,
}

/// Flags that build the initial `SelectionParameters`.
#[derive(Debug, Args, Clone)]
pub struct SelectionArgs {
    /// Which view to compute.
    #[arg(short = 'm', long, value_enum, default_value_t = ViewMode::Snapshot)]
    pub mode: ViewMode,

    /// Countries to include (US, MX, CA or full names). Defaults to all three.
    #[arg(short = 'c', long = "country", value_delimiter = ',')]
    pub countries: Vec<Country>,

    /// Select no country at all (songs view then covers every country).
    #[arg(long, conflicts_with = "countries")]
    pub no_countries: bool,

    /// Snapshot date (must be present in the data).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Snapshot date by index into the distinct dates (see `charts dates`).
    /// Defaults to the latest date.
    #[arg(long, conflicts_with = "date")]
    pub date_index: Option<usize>,

    /// Entries per country (snapshot) or overall (artists, songs).
    #[arg(short = 'n', long, default_value_t = 10, env = "CHARTS_TOP_N")]
    pub top: usize,

    /// Artist ordering.
    #[arg(long, value_enum, default_value_t = SortKey::ByTotalStreams)]
    pub sort: SortKey,
}

#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Export the computed view to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Export target for the `e` key.
    #[arg(long, value_name = "JSON", default_value = "charts_view.json")]
    pub export: PathBuf,

    /// Write logs to this file (the terminal is owned by the UI).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,

    /// First chart date.
    #[arg(long, default_value = "2024-01-04", value_name = "YYYY-MM-DD")]
    pub start: NaiveDate,

    /// Number of weekly chart dates.
    #[arg(long, default_value_t = 12)]
    pub weeks: usize,

    /// Size of the song pool.
    #[arg(long, default_value_t = 40)]
    pub songs: usize,

    /// Entries per country per week.
    #[arg(long, default_value_t = 20)]
    pub chart_size: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
