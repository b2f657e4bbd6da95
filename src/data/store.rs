//! The in-memory record store.
//!
//! Raw rows are coerced into typed `ChartRecord`s once, at load time. After that
//! the store is immutable: every view is recomputed from it from scratch.
//!
//! Design goals:
//! - **Strict rows**: a row that does not coerce is dropped, never half-accepted
//! - **Non-fatal load**: row errors are collected and reported once, after the pass
//! - **Stable date index**: distinct dates are computed once and never change

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{ChartRecord, RawRow};
use crate::error::{ChartError, Result};

/// Immutable, validated chart records plus their distinct dates.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<ChartRecord>,
    dates: Vec<NaiveDate>,
}

/// Result of a load pass: the store plus the rows that were rejected.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub store: RecordStore,
    pub row_errors: Vec<ChartError>,
    pub rows_read: usize,
}

impl LoadOutcome {
    pub fn rows_used(&self) -> usize {
        self.store.len()
    }
}

impl RecordStore {
    /// Coerce raw rows into records. Malformed rows are skipped and returned in
    /// `LoadOutcome::row_errors`.
    pub fn load<I>(rows: I) -> LoadOutcome
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut records = Vec::new();
        let mut row_errors = Vec::new();
        let mut rows_read = 0usize;

        for row in rows {
            rows_read += 1;
            match coerce_row(&row) {
                Ok(record) => records.push(record),
                Err(err) => {
                    debug!(line = row.line, error = %err, "dropping malformed row");
                    row_errors.push(err);
                }
            }
        }

        if !row_errors.is_empty() {
            warn!(
                rejected = row_errors.len(),
                rows_read,
                "skipped malformed chart rows during load"
            );
        }

        LoadOutcome {
            store: Self::from_records(records),
            row_errors,
            rows_read,
        }
    }

    /// Build a store from already-validated records.
    pub fn from_records(records: Vec<ChartRecord>) -> Self {
        let mut dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        dates.sort_unstable();
        dates.dedup();
        Self { records, dates }
    }

    pub fn records(&self) -> &[ChartRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct record dates, ascending. This is the index space of
    /// `SelectionParameters::date_index`.
    pub fn distinct_dates_ascending(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Resolve a date index, failing if it lies outside the distinct dates.
    pub fn date_at(&self, index: usize) -> Result<NaiveDate> {
        self.dates.get(index).copied().ok_or_else(|| {
            ChartError::InvalidParameter(format!(
                "date index {index} out of range (store has {} distinct dates)",
                self.dates.len()
            ))
        })
    }

    pub fn index_of_date(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }
}

fn coerce_row(row: &RawRow) -> Result<ChartRecord> {
    let date = parse_date(row.line, &row.date)?;
    let rank = parse_rank(row.line, &row.rank)?;
    let streams = parse_streams(row.line, &row.streams)?;

    Ok(ChartRecord {
        date,
        rank,
        region: row.region.clone(),
        artist: row.artist.clone(),
        title: row.title.clone(),
        streams,
    })
}

fn parse_date(line: usize, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| ChartError::MalformedRecord {
        line,
        field: "date",
        value: raw.to_string(),
        reason: format!("expected YYYY-MM-DD ({e})"),
    })
}

fn parse_rank(line: usize, raw: &str) -> Result<u32> {
    let malformed = |reason: &str| ChartError::MalformedRecord {
        line,
        field: "rank",
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    let rank = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| malformed("not a non-negative integer"))?;
    if rank == 0 {
        return Err(malformed("rank must be >= 1"));
    }
    Ok(rank)
}

/// Largest accepted per-row stream count. Keeps reducer sums far from `u64::MAX`.
pub const MAX_STREAMS: u64 = 1_000_000_000_000;

fn parse_streams(line: usize, raw: &str) -> Result<u64> {
    let malformed = |reason: String| ChartError::MalformedRecord {
        line,
        field: "streams",
        value: raw.to_string(),
        reason,
    };
    let streams = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| malformed("not a non-negative integer".to_string()))?;
    if streams > MAX_STREAMS {
        return Err(malformed(format!("exceeds {MAX_STREAMS}")));
    }
    Ok(streams)
}
