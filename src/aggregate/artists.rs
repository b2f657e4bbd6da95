//! Per-artist totals ("top artists").
//!
//! For each artist in the selected countries we accumulate:
//!
//! - `total`: summed streams
//! - per-country stream subtotals
//! - per-country distinct chart dates
//!
//! `weeks_on_chart` is the number of distinct `(date, country)` pairs, so the same
//! chart entry spelled with two region aliases counts once.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::ensure_top_n;
use crate::data::RecordStore;
use crate::domain::{Country, SelectionParameters, SortKey};
use crate::error::Result;

/// One row of the artist view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistTotal {
    pub artist: String,
    /// Stream subtotals under `ByTotalStreams`, distinct-date counts under
    /// `ByWeeksOnChart`. Contains every selected country (zero-filled).
    pub per_country: BTreeMap<Country, u64>,
    /// Summed streams across the selected countries.
    pub total: u64,
    pub weeks_on_chart: u64,
}

impl ArtistTotal {
    /// The metric the row was ranked by (bar length for stacked presentation).
    pub fn value(&self, sort_key: SortKey) -> u64 {
        match sort_key {
            SortKey::ByTotalStreams => self.total,
            SortKey::ByWeeksOnChart => self.weeks_on_chart,
        }
    }
}

#[derive(Debug)]
struct Accumulator<'a> {
    artist: &'a str,
    total: u64,
    streams: BTreeMap<Country, u64>,
    dates: BTreeMap<Country, BTreeSet<NaiveDate>>,
}

impl<'a> Accumulator<'a> {
    fn new(artist: &'a str) -> Self {
        Self {
            artist,
            total: 0,
            streams: BTreeMap::new(),
            dates: BTreeMap::new(),
        }
    }

    fn weeks_on_chart(&self) -> u64 {
        self.dates.values().map(|d| d.len() as u64).sum()
    }

    fn finish(self, selected: &BTreeSet<Country>, sort_key: SortKey) -> ArtistTotal {
        let weeks_on_chart = self.weeks_on_chart();
        let per_country = selected
            .iter()
            .map(|&country| {
                let value = match sort_key {
                    SortKey::ByTotalStreams => self.streams.get(&country).copied().unwrap_or(0),
                    SortKey::ByWeeksOnChart => self.dates.get(&country).map_or(0, |d| d.len() as u64),
                };
                (country, value)
            })
            .collect();

        ArtistTotal {
            artist: self.artist.to_string(),
            per_country,
            total: self.total,
            weeks_on_chart,
        }
    }
}

/// Top `params.top_n` artists in the selected countries, ordered by
/// `params.sort_key` (descending). Ties keep first-appearance order.
pub fn artist_totals(store: &RecordStore, params: &SelectionParameters) -> Result<Vec<ArtistTotal>> {
    ensure_top_n(params.top_n)?;
    if params.selected_countries.is_empty() {
        return Ok(Vec::new());
    }

    // Vec + index map keeps first-appearance order for the stable sort below.
    let mut groups: Vec<Accumulator<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in store.records() {
        let Some(country) = record.country() else { continue };
        if !params.is_selected(country) {
            continue;
        }

        let slot = *index.entry(record.artist.as_str()).or_insert_with(|| {
            groups.push(Accumulator::new(&record.artist));
            groups.len() - 1
        });
        let acc = &mut groups[slot];
        // Saturating: a `from_records` store can hold counts past the load cap.
        acc.total = acc.total.saturating_add(record.streams);
        let subtotal = acc.streams.entry(country).or_insert(0);
        *subtotal = subtotal.saturating_add(record.streams);
        acc.dates.entry(country).or_default().insert(record.date);
    }

    let mut rows: Vec<ArtistTotal> = groups
        .into_iter()
        .map(|acc| acc.finish(&params.selected_countries, params.sort_key))
        .collect();
    rows.sort_by(|a, b| b.value(params.sort_key).cmp(&a.value(params.sort_key)));
    rows.truncate(params.top_n);

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::{day, rec, store};
    use pretty_assertions::assert_eq;

    fn params(countries: &[Country], top_n: usize, sort_key: SortKey) -> SelectionParameters {
        SelectionParameters {
            selected_countries: countries.iter().copied().collect(),
            top_n,
            sort_key,
            ..SelectionParameters::default()
        }
    }

    #[test]
    fn duplicate_alias_counts_one_week_and_sums_streams() {
        let d = day(2024, 1, 1);
        let store = RecordStore::from_records(vec![
            rec(d, 1, "US", 100, "A", "X"),
            rec(d, 1, "us", 50, "A", "X"),
        ]);

        let rows = artist_totals(&store, &params(&[Country::UnitedStates], 10, SortKey::ByTotalStreams)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].weeks_on_chart, 1);
        assert_eq!(rows[0].total, 150);
        assert_eq!(rows[0].per_country, BTreeMap::from([(Country::UnitedStates, 150)]));
    }

    #[test]
    fn ranks_by_total_streams_with_per_country_subtotals() {
        let rows = artist_totals(&store(), &params(&Country::ALL, 10, SortKey::ByTotalStreams)).unwrap();
        let summary: Vec<(&str, u64, u64)> = rows
            .iter()
            .map(|r| (r.artist.as_str(), r.total, r.weeks_on_chart))
            .collect();
        // Luna: 900 + 400 + 850 + 350 (the "Global" row is unrecognized).
        assert_eq!(
            summary,
            vec![("Luna", 2500, 4), ("Kid", 2200, 4), ("Marisol", 1900, 3)]
        );
        assert_eq!(
            rows[0].per_country,
            BTreeMap::from([(Country::UnitedStates, 1750), (Country::Mexico, 400), (Country::Canada, 350)])
        );
    }

    #[test]
    fn weeks_sort_reports_distinct_dates_per_country() {
        let rows = artist_totals(&store(), &params(&Country::ALL, 10, SortKey::ByWeeksOnChart)).unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r.artist.as_str()).collect();
        // Luna and Kid tie on 4 weeks; Luna appears first in the records.
        assert_eq!(order, vec!["Luna", "Kid", "Marisol"]);
        assert_eq!(
            rows[2].per_country,
            BTreeMap::from([(Country::UnitedStates, 1), (Country::Mexico, 2), (Country::Canada, 0)])
        );
        for row in &rows {
            assert_eq!(row.per_country.values().sum::<u64>(), row.weeks_on_chart);
        }
    }

    #[test]
    fn per_country_sums_to_total_for_stream_sort() {
        let store = store();
        for selection in [vec![Country::UnitedStates], vec![Country::Mexico, Country::Canada], Country::ALL.to_vec()] {
            let rows = artist_totals(&store, &params(&selection, 10, SortKey::ByTotalStreams)).unwrap();
            for row in &rows {
                assert_eq!(row.per_country.values().sum::<u64>(), row.total, "{}", row.artist);
                assert_eq!(row.per_country.len(), selection.len());
            }
        }
    }

    #[test]
    fn truncates_to_top_n_and_filters_countries() {
        let rows = artist_totals(&store(), &params(&[Country::Mexico], 1, SortKey::ByTotalStreams)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].artist, "Marisol");
        assert_eq!(rows[0].total, 1400);
    }

    #[test]
    fn empty_selection_is_empty() {
        let rows = artist_totals(&store(), &params(&[], 10, SortKey::ByTotalStreams)).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn huge_stream_counts_saturate_instead_of_overflowing() {
        let d = day(2024, 1, 4);
        let store = RecordStore::from_records(vec![
            rec(d, 1, "US", u64::MAX, "A", "X"),
            rec(d, 2, "US", 1, "A", "Y"),
        ]);
        let rows = artist_totals(&store, &params(&Country::ALL, 10, SortKey::ByTotalStreams)).unwrap();
        assert_eq!(rows[0].total, u64::MAX);
        assert_eq!(rows[0].per_country[&Country::UnitedStates], u64::MAX);
    }
}
