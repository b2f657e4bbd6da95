//! Reporting: terminal tables for computed views.

mod format;

pub use format::{fmt_count, format_dates, format_run_summary, format_view};
