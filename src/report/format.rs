//! Formatted terminal output for computed views.
//!
//! We keep formatting code in one place so:
//! - the engine stays free of presentation concerns
//! - output changes are localized (and easy to snapshot in tests)

use chrono::NaiveDate;

use crate::aggregate::{ArtistTotal, SnapshotEntry, SongTotal, ViewModel};
use crate::data::LoadOutcome;
use crate::domain::{Country, SelectionParameters, SortKey};

/// Header block: dataset summary plus the active parameters.
pub fn format_run_summary(load: &LoadOutcome, params: &SelectionParameters, date: Option<NaiveDate>) -> String {
    let mut out = String::new();
    let dates = load.store.distinct_dates_ascending();

    out.push_str(&format!("=== charts - {} ===\n", params.view_mode.display_name()));
    out.push_str(&format!(
        "Rows: read={} used={} rejected={}\n",
        load.rows_read,
        load.rows_used(),
        load.row_errors.len()
    ));
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        out.push_str(&format!("Dates: {} distinct | {first} .. {last}\n", dates.len()));
    }
    out.push_str(&format!("Countries: {}\n", fmt_countries(params)));
    out.push_str(&format!("Top: {}\n", params.top_n));
    if let Some(date) = date {
        out.push_str(&format!("Date: {date} (index {})\n", params.date_index));
    }
    out.push('\n');

    out
}

/// Format a view as a table, or an explicit "no data" line when it is empty.
pub fn format_view(view: &ViewModel) -> String {
    if view.is_empty() {
        return "No data for the current selection.\n".to_string();
    }
    match view {
        ViewModel::Snapshot { rows } => format_snapshot(rows),
        ViewModel::Artists { sort_key, rows } => format_artists(rows, *sort_key),
        ViewModel::Songs { rows } => format_songs(rows),
    }
}

/// List distinct dates with their index (the `--date-index` space).
pub fn format_dates(dates: &[NaiveDate]) -> String {
    let mut out = String::new();
    for (idx, date) in dates.iter().enumerate() {
        out.push_str(&format!("{idx:>4}  {date}\n"));
    }
    out
}

fn format_snapshot(rows: &[SnapshotEntry]) -> String {
    let mut out = String::new();
    let mut current: Option<Country> = None;

    for entry in rows {
        if current != Some(entry.country) {
            if current.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("{}:\n", entry.country.display_name()));
            out.push_str(&table_line(&format!(
                "{:>4} {:<32} {:<24} {:>12}",
                "rank", "title", "artist", "streams"
            )));
            out.push_str(&table_line(&format!("{:-<4} {:-<32} {:-<24} {:->12}", "", "", "", "")));
            current = Some(entry.country);
        }
        out.push_str(&table_line(&format!(
            "{:>4} {:<32} {:<24} {:>12}",
            entry.rank,
            truncate(&entry.title, 32),
            truncate(&entry.artist, 24),
            fmt_count(entry.streams),
        )));
    }

    out
}

fn format_artists(rows: &[ArtistTotal], sort_key: SortKey) -> String {
    let mut out = String::new();
    let countries: Vec<Country> = rows
        .first()
        .map(|r| r.per_country.keys().copied().collect())
        .unwrap_or_default();

    out.push_str(&format!("Sorted by {}\n", sort_key.display_name()));

    let mut header = format!("{:>3} {:<28} {:>14} {:>6}", "#", "artist", "streams", "weeks");
    let mut rule = format!("{:-<3} {:-<28} {:->14} {:->6}", "", "", "", "");
    for country in &countries {
        header.push_str(&format!(" {:>12}", country.code()));
        rule.push_str(&format!(" {:->12}", ""));
    }
    out.push_str(&table_line(&header));
    out.push_str(&table_line(&rule));

    for (idx, row) in rows.iter().enumerate() {
        let mut line = format!(
            "{:>3} {:<28} {:>14} {:>6}",
            idx + 1,
            truncate(&row.artist, 28),
            fmt_count(row.total),
            row.weeks_on_chart,
        );
        for value in row.per_country.values() {
            line.push_str(&format!(" {:>12}", fmt_count(*value)));
        }
        out.push_str(&table_line(&line));
    }

    out
}

fn format_songs(rows: &[SongTotal]) -> String {
    let mut out = String::new();
    out.push_str(&table_line(&format!(
        "{:>3} {:<32} {:<24} {:>14} {:>5} {:>4} {:<10}",
        "#", "title", "artist", "streams", "apps", "best", "countries"
    )));
    out.push_str(&table_line(&format!(
        "{:-<3} {:-<32} {:-<24} {:->14} {:->5} {:->4} {:-<10}",
        "", "", "", "", "", "", ""
    )));

    for (idx, row) in rows.iter().enumerate() {
        let countries: Vec<&str> = row.countries.iter().map(|c| c.code()).collect();
        out.push_str(&table_line(&format!(
            "{:>3} {:<32} {:<24} {:>14} {:>5} {:>4} {:<10}",
            idx + 1,
            truncate(&row.title, 32),
            truncate(&row.artist, 24),
            fmt_count(row.total_streams),
            row.chart_appearances,
            row.best_rank,
            countries.join(","),
        )));
    }

    out
}

fn fmt_countries(params: &SelectionParameters) -> String {
    if params.selected_countries.is_empty() {
        return "(none)".to_string();
    }
    let names: Vec<&str> = params.selected_countries.iter().map(|c| c.display_name()).collect();
    names.join(", ")
}

fn table_line(s: &str) -> String {
    let mut line = s.trim_end().to_string();
    line.push('\n');
    line
}

/// Thousands-separated integer (`1234567` -> `1,234,567`).
pub fn fmt_count(v: u64) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn empty_view_renders_no_data_state() {
        let view = ViewModel::Snapshot { rows: Vec::new() };
        assert_eq!(format_view(&view), "No data for the current selection.\n");
    }

    #[test]
    fn snapshot_groups_rows_under_country_headings() {
        let entry = |country, rank| SnapshotEntry {
            country,
            rank,
            streams: 1500,
            region: country_code(country),
            artist: "A".to_string(),
            title: "T".to_string(),
        };
        let view = ViewModel::Snapshot {
            rows: vec![entry(Country::UnitedStates, 1), entry(Country::UnitedStates, 2), entry(Country::Canada, 1)],
        };
        let text = format_view(&view);
        assert_eq!(text.matches("United States:").count(), 1);
        assert_eq!(text.matches("Canada:").count(), 1);
        assert!(text.contains("1,500"));
    }

    fn country_code(country: Country) -> String {
        country.code().to_string()
    }

    #[test]
    fn artist_table_has_one_column_per_country() {
        let view = ViewModel::Artists {
            sort_key: SortKey::ByWeeksOnChart,
            rows: vec![ArtistTotal {
                artist: "Luna".to_string(),
                per_country: BTreeMap::from([(Country::UnitedStates, 2), (Country::Canada, 1)]),
                total: 2500,
                weeks_on_chart: 3,
            }],
        };
        let text = format_view(&view);
        assert!(text.starts_with("Sorted by weeks on chart\n"));
        let header = text.lines().nth(1).unwrap();
        assert!(header.ends_with("US           CA"));
    }

    #[test]
    fn fmt_count_groups_thousands() {
        assert_eq!(fmt_count(0), "0");
        assert_eq!(fmt_count(999), "999");
        assert_eq!(fmt_count(1000), "1,000");
        assert_eq!(fmt_count(1234567), "1,234,567");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Corazón", 10), "Corazón");
        assert_eq!(truncate("Satellite Heart", 6), "Satel.");
    }

    #[test]
    fn dates_are_listed_with_indices() {
        let dates = [
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
        ];
        assert_eq!(format_dates(&dates), "   0  2024-01-04\n   1  2024-01-11\n");
    }
}
