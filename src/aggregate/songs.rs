//! Per-song performance summary.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::aggregate::ensure_top_n;
use crate::data::RecordStore;
use crate::domain::{Country, SelectionParameters};
use crate::error::Result;

/// One row of the song view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongTotal {
    pub title: String,
    pub artist: String,
    pub total_streams: u64,
    /// Every matching raw row counts, including alias duplicates.
    pub chart_appearances: u64,
    pub best_rank: u32,
    /// Distinct countries the song charted in, canonical order.
    pub countries: Vec<Country>,
}

#[derive(Debug)]
struct Accumulator<'a> {
    title: &'a str,
    artist: &'a str,
    total_streams: u64,
    chart_appearances: u64,
    best_rank: u32,
    countries: BTreeSet<Country>,
}

/// Top `params.top_n` songs by total streams.
///
/// Unlike the other views, an empty country selection means "all countries".
/// Records with an unrecognized region are excluded either way.
pub fn song_totals(store: &RecordStore, params: &SelectionParameters) -> Result<Vec<SongTotal>> {
    ensure_top_n(params.top_n)?;
    let all_countries = params.selected_countries.is_empty();

    let mut groups: Vec<Accumulator<'_>> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();

    for record in store.records() {
        let Some(country) = record.country() else { continue };
        if !all_countries && !params.is_selected(country) {
            continue;
        }

        let key = (record.title.as_str(), record.artist.as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Accumulator {
                title: &record.title,
                artist: &record.artist,
                total_streams: 0,
                chart_appearances: 0,
                best_rank: record.rank,
                countries: BTreeSet::new(),
            });
            groups.len() - 1
        });

        let acc = &mut groups[slot];
        acc.total_streams = acc.total_streams.saturating_add(record.streams);
        acc.chart_appearances += 1;
        acc.best_rank = acc.best_rank.min(record.rank);
        acc.countries.insert(country);
    }

    let mut rows: Vec<SongTotal> = groups
        .into_iter()
        .map(|acc| SongTotal {
            title: acc.title.to_string(),
            artist: acc.artist.to_string(),
            total_streams: acc.total_streams,
            chart_appearances: acc.chart_appearances,
            best_rank: acc.best_rank,
            countries: acc.countries.into_iter().collect(),
        })
        .collect();
    rows.sort_by(|a, b| b.total_streams.cmp(&a.total_streams));
    rows.truncate(params.top_n);

    Ok(rows)
}
