//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - handed to every reducer call as plain values
//! - exported to JSON alongside a computed view
//! - constructed directly in tests without going through CSV ingest

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::region::normalize;

/// One of the three canonical chart countries.
///
/// The declaration order is the canonical iteration order used by every view
/// (United States, Mexico, Canada), and `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    UnitedStates,
    Mexico,
    Canada,
}

impl Country {
    pub const ALL: [Country; 3] = [Country::UnitedStates, Country::Mexico, Country::Canada];

    /// Full English name (also the long region alias).
    pub fn display_name(self) -> &'static str {
        match self {
            Country::UnitedStates => "United States",
            Country::Mexico => "Mexico",
            Country::Canada => "Canada",
        }
    }

    /// Upper-case two-letter code.
    pub fn code(self) -> &'static str {
        match self {
            Country::UnitedStates => "US",
            Country::Mexico => "MX",
            Country::Canada => "CA",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Country {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s).ok_or_else(|| {
            format!("unknown country '{s}' (expected one of: United States, US, us, Mexico, MX, mx, Canada, CA, ca)")
        })
    }
}

/// Ordering used by the artist view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Descending by summed streams; per-country values are stream subtotals.
    #[default]
    #[value(name = "streams")]
    ByTotalStreams,
    /// Descending by weeks on chart; per-country values are distinct-date counts.
    #[value(name = "weeks")]
    ByWeeksOnChart,
}

impl SortKey {
    pub fn toggled(self) -> Self {
        match self {
            SortKey::ByTotalStreams => SortKey::ByWeeksOnChart,
            SortKey::ByWeeksOnChart => SortKey::ByTotalStreams,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SortKey::ByTotalStreams => "total streams",
            SortKey::ByWeeksOnChart => "weeks on chart",
        }
    }
}

/// Which derived view is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    #[value(name = "snapshot")]
    Snapshot,
    #[value(name = "artists")]
    ArtistTotals,
    #[value(name = "songs")]
    SongTotals,
}

impl ViewMode {
    pub fn next(self) -> Self {
        match self {
            ViewMode::Snapshot => ViewMode::ArtistTotals,
            ViewMode::ArtistTotals => ViewMode::SongTotals,
            ViewMode::SongTotals => ViewMode::Snapshot,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ViewMode::Snapshot => "Top songs",
            ViewMode::ArtistTotals => "Top artists",
            ViewMode::SongTotals => "Song performance",
        }
    }
}

/// A raw ingested row. Every field is still a string; coercion happens in
/// `RecordStore::load`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based source line (for error reporting).
    pub line: usize,
    pub date: String,
    pub rank: String,
    pub region: String,
    pub artist: String,
    pub title: String,
    pub streams: String,
}

/// One validated chart observation (date × region × rank).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub date: NaiveDate,
    pub rank: u32,
    /// Region exactly as ingested (full name or two-letter code).
    pub region: String,
    pub artist: String,
    pub title: String,
    pub streams: u64,
}

impl ChartRecord {
    /// Canonical country for this record, or `None` if the region is unrecognized.
    pub fn country(&self) -> Option<Country> {
        normalize(&self.region)
    }
}

/// The full user-controlled state that parameterizes one recomputation.
///
/// This is a value: front-ends build a new one per event (see `apply`) and pass
/// it by reference into the engine, which reads it once at the start of a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionParameters {
    pub selected_countries: BTreeSet<Country>,
    /// Index into `RecordStore::distinct_dates_ascending()` (snapshot view only).
    pub date_index: usize,
    /// Per-country cap for the snapshot view, overall cap for the other views.
    pub top_n: usize,
    /// Artist view only.
    pub sort_key: SortKey,
    pub view_mode: ViewMode,
}

impl Default for SelectionParameters {
    fn default() -> Self {
        Self {
            selected_countries: Country::ALL.into_iter().collect(),
            date_index: 0,
            top_n: 10,
            sort_key: SortKey::default(),
            view_mode: ViewMode::default(),
        }
    }
}

/// A single-field parameter update produced by a UI control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterChange {
    ToggleCountry(Country),
    SetCountries(BTreeSet<Country>),
    SetDateIndex(usize),
    SetTopN(usize),
    SetSortKey(SortKey),
    SetViewMode(ViewMode),
}

impl SelectionParameters {
    /// Produce the next parameter snapshot. `self` is left untouched.
    pub fn apply(&self, change: ParameterChange) -> SelectionParameters {
        let mut next = self.clone();
        match change {
            ParameterChange::ToggleCountry(country) => {
                if !next.selected_countries.remove(&country) {
                    next.selected_countries.insert(country);
                }
            }
            ParameterChange::SetCountries(countries) => next.selected_countries = countries,
            ParameterChange::SetDateIndex(index) => next.date_index = index,
            ParameterChange::SetTopN(top_n) => next.top_n = top_n,
            ParameterChange::SetSortKey(key) => next.sort_key = key,
            ParameterChange::SetViewMode(mode) => next.view_mode = mode,
        }
        next
    }

    pub fn is_selected(&self, country: Country) -> bool {
        self.selected_countries.contains(&country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_order_is_us_mx_ca() {
        let mut shuffled = vec![Country::Canada, Country::UnitedStates, Country::Mexico];
        shuffled.sort();
        assert_eq!(shuffled, Country::ALL.to_vec());
    }

    #[test]
    fn country_from_str_accepts_aliases_only() {
        assert_eq!("mx".parse::<Country>(), Ok(Country::Mexico));
        assert_eq!("United States".parse::<Country>(), Ok(Country::UnitedStates));
        assert!("Mx".parse::<Country>().is_err());
    }

    #[test]
    fn apply_returns_new_snapshot_and_leaves_original() {
        let params = SelectionParameters::default();
        let next = params.apply(ParameterChange::ToggleCountry(Country::Mexico));

        assert!(params.is_selected(Country::Mexico));
        assert!(!next.is_selected(Country::Mexico));

        let back = next.apply(ParameterChange::ToggleCountry(Country::Mexico));
        assert_eq!(back, params);
    }

    #[test]
    fn apply_changes_exactly_one_field() {
        let params = SelectionParameters::default();
        let next = params.apply(ParameterChange::SetTopN(3));
        assert_eq!(next.top_n, 3);
        assert_eq!(next.selected_countries, params.selected_countries);
        assert_eq!(next.date_index, params.date_index);
        assert_eq!(next.sort_key, params.sort_key);
        assert_eq!(next.view_mode, params.view_mode);
    }

    #[test]
    fn sort_key_and_view_mode_cycle() {
        assert_eq!(SortKey::ByTotalStreams.toggled(), SortKey::ByWeeksOnChart);
        assert_eq!(SortKey::ByWeeksOnChart.toggled(), SortKey::ByTotalStreams);
        assert_eq!(ViewMode::Snapshot.next().next().next(), ViewMode::Snapshot);
    }
}
