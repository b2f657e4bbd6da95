//! `chart-views` library crate.
//!
//! Aggregation engine for streaming chart records: region normalization, a
//! validated record store, and three pure reducers (top songs per date, artist
//! totals, song totals) driven by an explicit `SelectionParameters` value.
//!
//! The binary (`charts`) is a thin wrapper around this library so that:
//!
//! - the engine is testable without spawning processes or a terminal
//! - front-ends (CLI tables, TUI, JSON export) only consume view models

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod tui;

pub use aggregate::{ViewModel, compute_view};
pub use data::RecordStore;
pub use domain::{ChartRecord, Country, SelectionParameters};
