//! Top-N songs per country on one chart date.

use serde::Serialize;

use crate::aggregate::ensure_top_n;
use crate::data::RecordStore;
use crate::domain::{ChartRecord, Country, SelectionParameters};
use crate::error::Result;

/// One point of the snapshot view (rendered per-country colored, sized by streams).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotEntry {
    pub country: Country,
    pub rank: u32,
    pub streams: u64,
    /// Raw region spelling of the source record.
    pub region: String,
    pub artist: String,
    pub title: String,
}

impl SnapshotEntry {
    fn from_record(country: Country, record: &ChartRecord) -> Self {
        Self {
            country,
            rank: record.rank,
            streams: record.streams,
            region: record.region.clone(),
            artist: record.artist.clone(),
            title: record.title.clone(),
        }
    }
}

/// Top `params.top_n` records by rank for each selected country on the date at
/// `params.date_index`, concatenated in canonical country order.
///
/// There is no nearest-date fallback: a date without records yields an empty view.
pub fn snapshot(store: &RecordStore, params: &SelectionParameters) -> Result<Vec<SnapshotEntry>> {
    ensure_top_n(params.top_n)?;
    let date = store.date_at(params.date_index)?;

    if params.selected_countries.is_empty() {
        return Ok(Vec::new());
    }

    let on_date: Vec<&ChartRecord> = store.records().iter().filter(|r| r.date == date).collect();

    let mut out = Vec::new();
    for country in Country::ALL {
        if !params.is_selected(country) {
            continue;
        }

        let mut block: Vec<&ChartRecord> = on_date
            .iter()
            .copied()
            .filter(|r| r.country() == Some(country))
            .collect();
        // Stable: equal ranks keep input order.
        block.sort_by_key(|r| r.rank);

        out.extend(
            block
                .into_iter()
                .take(params.top_n)
                .map(|r| SnapshotEntry::from_record(country, r)),
        );
    }

    Ok(out)
}
