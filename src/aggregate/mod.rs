//! The aggregation engine.
//!
//! Three independent reducers turn the record store plus one
//! `SelectionParameters` snapshot into a view model:
//!
//! - `snapshot`: per-date, per-country top-N songs by rank
//! - `artists`: per-artist stream totals and tenure
//! - `songs`: per-song totals, appearances, and best rank
//!
//! Every reducer is a pure function of `(store, params)`: no state survives a
//! call, and identical inputs give structurally equal outputs.

use serde::Serialize;
use tracing::debug;

use crate::data::RecordStore;
use crate::domain::{SelectionParameters, SortKey, ViewMode};
use crate::error::{ChartError, Result};

pub mod artists;
pub mod snapshot;
pub mod songs;

pub use artists::{ArtistTotal, artist_totals};
pub use snapshot::{SnapshotEntry, snapshot};
pub use songs::{SongTotal, song_totals};

/// Output of one recomputation, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewModel {
    Snapshot { rows: Vec<SnapshotEntry> },
    /// `sort_key` is carried along because it changes what `per_country` means.
    Artists { sort_key: SortKey, rows: Vec<ArtistTotal> },
    Songs { rows: Vec<SongTotal> },
}

impl ViewModel {
    pub fn len(&self) -> usize {
        match self {
            ViewModel::Snapshot { rows } => rows.len(),
            ViewModel::Artists { rows, .. } => rows.len(),
            ViewModel::Songs { rows } => rows.len(),
        }
    }

    /// An empty view is a valid "no data" state, not an error.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mode(&self) -> ViewMode {
        match self {
            ViewModel::Snapshot { .. } => ViewMode::Snapshot,
            ViewModel::Artists { .. } => ViewMode::ArtistTotals,
            ViewModel::Songs { .. } => ViewMode::SongTotals,
        }
    }
}

/// Recompute the view selected by `params.view_mode`.
pub fn compute_view(store: &RecordStore, params: &SelectionParameters) -> Result<ViewModel> {
    let view = match params.view_mode {
        ViewMode::Snapshot => ViewModel::Snapshot {
            rows: snapshot(store, params)?,
        },
        ViewMode::ArtistTotals => ViewModel::Artists {
            sort_key: params.sort_key,
            rows: artist_totals(store, params)?,
        },
        ViewMode::SongTotals => ViewModel::Songs {
            rows: song_totals(store, params)?,
        },
    };
    debug!(mode = ?params.view_mode, rows = view.len(), "recomputed view");
    Ok(view)
}

pub(crate) fn ensure_top_n(top_n: usize) -> Result<()> {
    if top_n == 0 {
        return Err(ChartError::InvalidParameter("top_n must be > 0".to_string()));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Country, ParameterChange};
    use std::collections::BTreeSet;

    #[test]
    fn dispatches_on_view_mode() {
        let store = fixtures::store();
        let params = SelectionParameters::default();

        for mode in [ViewMode::Snapshot, ViewMode::ArtistTotals, ViewMode::SongTotals] {
            let view = compute_view(&store, &params.apply(ParameterChange::SetViewMode(mode))).unwrap();
            assert_eq!(view.mode(), mode);
            assert!(!view.is_empty());
        }
    }

    #[test]
    fn recompute_is_idempotent_for_every_view() {
        let store = fixtures::store();
        for view_mode in [ViewMode::Snapshot, ViewMode::ArtistTotals, ViewMode::SongTotals] {
            for sort_key in [SortKey::ByTotalStreams, SortKey::ByWeeksOnChart] {
                let params = SelectionParameters {
                    view_mode,
                    sort_key,
                    date_index: 1,
                    ..SelectionParameters::default()
                };
                let first = compute_view(&store, &params).unwrap();
                assert!(!first.is_empty(), "{view_mode:?}");
                assert_eq!(first, compute_view(&store, &params).unwrap(), "{view_mode:?} {sort_key:?}");
            }
        }
    }

    #[test]
    fn empty_selection_only_songs_fall_back_to_all_countries() {
        let store = fixtures::store();
        let params = SelectionParameters::default().apply(ParameterChange::SetCountries(BTreeSet::new()));

        let snap = compute_view(&store, &params).unwrap();
        assert!(snap.is_empty());

        let artists = compute_view(&store, &params.apply(ParameterChange::SetViewMode(ViewMode::ArtistTotals))).unwrap();
        assert!(artists.is_empty());

        let songs = compute_view(&store, &params.apply(ParameterChange::SetViewMode(ViewMode::SongTotals))).unwrap();
        assert!(!songs.is_empty());
    }

    #[test]
    fn zero_top_n_is_rejected_by_every_view() {
        let store = fixtures::store();
        let params = SelectionParameters {
            top_n: 0,
            selected_countries: [Country::Canada].into_iter().collect(),
            ..SelectionParameters::default()
        };
        for mode in [ViewMode::Snapshot, ViewMode::ArtistTotals, ViewMode::SongTotals] {
            let result = compute_view(&store, &params.apply(ParameterChange::SetViewMode(mode)));
            assert!(matches!(result, Err(ChartError::InvalidParameter(_))), "{mode:?}");
        }
    }
}
