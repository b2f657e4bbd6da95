//! Exports: computed views to JSON, raw rows to CSV.
//!
//! The JSON document is self-describing (parameters + resolved date + rows) so it
//! can be consumed by a renderer or diffed between runs.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::ViewModel;
use crate::domain::{RawRow, SelectionParameters};
use crate::error::AppError;

/// JSON export document.
#[derive(Debug, Serialize)]
pub struct ViewExport<'a> {
    pub tool: &'static str,
    pub parameters: &'a SelectionParameters,
    /// Resolved snapshot date (snapshot view only).
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub view: &'a ViewModel,
}

/// Write a computed view to a pretty-printed JSON file.
pub fn write_view_json(
    path: &Path,
    params: &SelectionParameters,
    date: Option<NaiveDate>,
    view: &ViewModel,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let doc = ViewExport {
        tool: "charts",
        parameters: params,
        date,
        view,
    };
    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

/// Write raw rows as a chart CSV (the same schema `io::ingest` reads).
pub fn write_raw_csv(path: &Path, rows: &[RawRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["date", "rank", "region", "artist", "title", "streams"])
        .map_err(|e| AppError::new(4, format!("Failed to write CSV header: {e}")))?;
    for row in rows {
        writer
            .write_record([&row.date, &row.rank, &row.region, &row.artist, &row.title, &row.streams])
            .map_err(|e| AppError::new(4, format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush CSV: {e}")))?;

    Ok(())
}
