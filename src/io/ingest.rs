//! CSV ingest.
//!
//! Turns a chart export into `RawRow`s. No coercion happens here: values stay
//! strings and `RecordStore::load` decides which rows are valid.
//!
//! Design goals:
//! - **Strict header schema** (clear errors + exit code 2)
//! - **Row-level tolerance**: a broken CSV record becomes a row error, not a failed load
//! - **Extra columns are ignored** (real exports carry `url`, `chart`, `trend`, ...)

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::domain::RawRow;
use crate::error::{AppError, ChartError};

const REQUIRED_COLUMNS: [&str; 6] = ["date", "rank", "region", "artist", "title", "streams"];

/// Raw rows read from a CSV plus what could not be read at all.
#[derive(Debug, Clone)]
pub struct IngestedRows {
    pub rows: Vec<RawRow>,
    /// Normalized header names, in file order.
    pub columns: Vec<String>,
    /// Records the CSV reader itself rejected (bad quoting, invalid UTF-8, ...).
    pub read_errors: Vec<ChartError>,
}

/// Read raw chart rows from a CSV file.
pub fn read_raw_rows(path: &Path) -> Result<IngestedRows, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_raw_rows_from(file)
}

/// Read raw chart rows from any reader (the header row is required).
pub fn read_raw_rows_from<R: Read>(input: R) -> Result<IngestedRows, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut rows = Vec::new();
    let mut read_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts after the header line
        // - CSV line numbers are 1-based
        let line = idx + 2;

        match result {
            Ok(record) => rows.push(extract_row(&record, &header_map, line)),
            Err(e) => read_errors.push(ChartError::MalformedRecord {
                line,
                field: "row",
                value: String::new(),
                reason: format!("CSV parse error: {e}"),
            }),
        }
    }

    Ok(IngestedRows {
        rows,
        columns: headers.iter().map(normalize_header_name).collect(),
        read_errors,
    })
}

/// Validate the provided path points to an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(AppError::new(
            2,
            format!("Expected a .csv file (got: {}).", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !header_map.contains_key(*name))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::new(
        2,
        format!("Missing required column(s): {}", missing.join(", ")),
    ))
}

fn extract_row(record: &StringRecord, header_map: &HashMap<String, usize>, line: usize) -> RawRow {
    let field = |name: &str| -> String {
        header_map
            .get(name)
            .and_then(|idx| record.get(*idx))
            .unwrap_or("")
            .to_string()
    };

    RawRow {
        line,
        date: field("date"),
        rank: field("rank"),
        region: field("region"),
        artist: field("artist"),
        title: field("title"),
        streams: field("streams"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn reads_rows_by_header_name_ignoring_extra_columns() {
        let csv = "\u{feff}Title,Rank,Date,Artist,URL,Region,Chart,Streams\n\
                   Glow,1,2024-01-04,Luna,https://x,United States,top200,900\n";
        let ingested = read_raw_rows_from(csv.as_bytes()).unwrap();

        assert!(ingested.read_errors.is_empty());
        assert_eq!(
            ingested.rows,
            vec![RawRow {
                line: 2,
                date: "2024-01-04".to_string(),
                rank: "1".to_string(),
                region: "United States".to_string(),
                artist: "Luna".to_string(),
                title: "Glow".to_string(),
                streams: "900".to_string(),
            }]
        );
        assert_eq!(ingested.columns[0], "title");
    }

    #[test]
    fn region_values_are_not_trimmed_or_recased() {
        let csv = "date,rank,region,artist,title,streams\n2024-01-04,1, us ,A,B,1\n";
        let ingested = read_raw_rows_from(csv.as_bytes()).unwrap();
        assert_eq!(ingested.rows[0].region, " us ");
    }

    #[test]
    fn missing_columns_are_fatal() {
        let csv = "date,rank,artist,title\n2024-01-04,1,A,B\n";
        let err = read_raw_rows_from(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "Missing required column(s): region, streams");
    }

    #[test]
    fn short_rows_yield_empty_fields() {
        let csv = "date,rank,region,artist,title,streams\n2024-01-04,1,US\n";
        let ingested = read_raw_rows_from(csv.as_bytes()).unwrap();
        assert_eq!(ingested.rows[0].streams, "");
        assert_eq!(ingested.rows[0].region, "US");
    }

    #[test]
    fn reads_from_file_and_validates_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "date,rank,region,artist,title,streams").unwrap();
        writeln!(file, "2024-01-04,1,MX,Marisol,Fuego,800").unwrap();
        drop(file);

        assert_eq!(validate_csv_path(&path).unwrap(), path);
        assert_eq!(read_raw_rows(&path).unwrap().rows.len(), 1);

        assert!(validate_csv_path(dir.path()).is_err());
        assert!(validate_csv_path(&dir.path().join("missing.csv")).is_err());
        let txt = dir.path().join("charts.txt");
        File::create(&txt).unwrap();
        assert!(validate_csv_path(&txt).is_err());
    }
}
