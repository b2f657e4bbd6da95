//! Shared "load + recompute" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> record store (once) -> parameter snapshot -> view (per event)
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::aggregate::{ViewModel, compute_view};
use crate::cli::{SelectionArgs, SourceArgs};
use crate::data::{LoadOutcome, RecordStore};
use crate::domain::{Country, SelectionParameters, ViewMode};
use crate::error::AppError;
use crate::io::ingest::{read_raw_rows, validate_csv_path};

/// Rows logged at debug level after a load, for a quick sanity check.
const PREVIEW_ROWS: usize = 5;

/// Output of one recomputation.
#[derive(Debug, Clone)]
pub struct ViewRun {
    /// The exact parameter snapshot the view was computed from.
    pub params: SelectionParameters,
    /// Resolved snapshot date (snapshot view only).
    pub date: Option<NaiveDate>,
    pub view: ViewModel,
}

/// Resolve the CSV path from `-f` / `CHARTS_CSV`.
pub fn resolve_csv_path(source: &SourceArgs) -> Result<PathBuf, AppError> {
    let path = source.csv.as_deref().ok_or_else(|| {
        AppError::new(2, "No chart CSV given. Pass `-f <file.csv>` or set CHARTS_CSV (a .env file works too).")
    })?;
    validate_csv_path(path)
}

/// Read and validate a chart CSV into an immutable record store.
///
/// Row-level problems (unreadable CSV records and rows that fail coercion) are
/// merged into `LoadOutcome::row_errors`, ordered by line. Only an unusable file
/// or a dataset with no valid rows is fatal.
pub fn load_charts(path: &Path) -> Result<LoadOutcome, AppError> {
    let ingested = read_raw_rows(path)?;
    debug!(columns = ?ingested.columns, "read chart CSV header");
    for row in ingested.rows.iter().take(PREVIEW_ROWS) {
        debug!(?row, "preview");
    }

    let read_errors = ingested.read_errors;
    let mut outcome = RecordStore::load(ingested.rows);
    outcome.rows_read += read_errors.len();
    outcome.row_errors.extend(read_errors);
    outcome.row_errors.sort_by_key(|e| e.line());

    info!(
        path = %path.display(),
        rows_read = outcome.rows_read,
        rows_used = outcome.rows_used(),
        rejected = outcome.row_errors.len(),
        dates = outcome.store.distinct_dates_ascending().len(),
        "loaded chart records"
    );

    if outcome.store.is_empty() {
        return Err(AppError::new(
            3,
            format!("No valid chart rows in '{}'.", path.display()),
        ));
    }
    Ok(outcome)
}

/// Build the initial parameter snapshot from CLI flags.
///
/// Without `--date`/`--date-index` the snapshot starts on the latest date.
pub fn resolve_selection(args: &SelectionArgs, store: &RecordStore) -> Result<SelectionParameters, AppError> {
    let selected_countries: BTreeSet<Country> = if args.no_countries {
        BTreeSet::new()
    } else if args.countries.is_empty() {
        Country::ALL.into_iter().collect()
    } else {
        args.countries.iter().copied().collect()
    };

    let dates = store.distinct_dates_ascending();
    let date_index = match (args.date, args.date_index) {
        (Some(date), _) => store.index_of_date(date).ok_or_else(|| {
            AppError::new(2, format!("Date {date} is not in the dataset (see `charts dates`)."))
        })?,
        (None, Some(index)) => index,
        (None, None) => dates.len().saturating_sub(1),
    };

    Ok(SelectionParameters {
        selected_countries,
        date_index,
        top_n: args.top,
        sort_key: args.sort,
        view_mode: args.mode,
    })
}

/// Recompute the view for one parameter snapshot.
///
/// `params` is cloned up front so the view and the parameters it reports can
/// never disagree.
pub fn run_view(store: &RecordStore, params: &SelectionParameters) -> Result<ViewRun, AppError> {
    let params = params.clone();
    let view = compute_view(store, &params)?;
    let date = match params.view_mode {
        ViewMode::Snapshot => Some(store.date_at(params.date_index)?),
        ViewMode::ArtistTotals | ViewMode::SongTotals => None,
    };
    Ok(ViewRun { params, date, view })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::{day, rec, store};
    use crate::domain::SortKey;
    use std::io::Write;

    fn write_csv(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("charts.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    fn selection_args() -> SelectionArgs {
        SelectionArgs {
            mode: ViewMode::Snapshot,
            countries: Vec::new(),
            no_countries: false,
            date: None,
            date_index: None,
            top: 10,
            sort: SortKey::ByTotalStreams,
        }
    }

    #[test]
    fn load_merges_row_errors_in_line_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "date,rank,region,artist,title,streams\n\
             2024-01-04,1,US,A,X,100\n\
             2024-01-04,x,US,B,Y,100\n\
             2024-01-11,1,mx,A,X,50\n\
             not-a-date,1,CA,C,Z,10\n",
        );

        let outcome = load_charts(&path).unwrap();
        assert_eq!(outcome.rows_read, 4);
        assert_eq!(outcome.rows_used(), 2);
        let lines: Vec<Option<usize>> = outcome.row_errors.iter().map(|e| e.line()).collect();
        assert_eq!(lines, vec![Some(3), Some(5)]);
    }

    #[test]
    fn load_without_valid_rows_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "date,rank,region,artist,title,streams\nbad,1,US,A,X,1\n");
        assert_eq!(load_charts(&path).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn selection_defaults_to_all_countries_and_latest_date() {
        let store = RecordStore::from_records(vec![
            rec(day(2024, 1, 4), 1, "US", 1, "A", "X"),
            rec(day(2024, 1, 11), 1, "US", 1, "A", "X"),
        ]);
        let params = resolve_selection(&selection_args(), &store).unwrap();
        assert_eq!(params.selected_countries.len(), 3);
        assert_eq!(params.date_index, 1);

        let args = SelectionArgs {
            date: Some(day(2024, 1, 4)),
            no_countries: true,
            ..selection_args()
        };
        let params = resolve_selection(&args, &store).unwrap();
        assert!(params.selected_countries.is_empty());
        assert_eq!(params.date_index, 0);

        let missing = SelectionArgs {
            date: Some(day(2023, 1, 1)),
            ..selection_args()
        };
        assert_eq!(resolve_selection(&missing, &store).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn run_view_reports_snapshot_date_and_rejects_bad_index() {
        let store = store();
        let params = SelectionParameters {
            date_index: 1,
            ..SelectionParameters::default()
        };
        let run = run_view(&store, &params).unwrap();
        assert_eq!(run.date, Some(day(2024, 1, 11)));
        assert_eq!(run.params, params);

        let bad = SelectionParameters {
            date_index: 9,
            ..SelectionParameters::default()
        };
        assert_eq!(run_view(&store, &bad).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn missing_csv_path_is_a_usage_error() {
        let err = resolve_csv_path(&SourceArgs { csv: None }).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
