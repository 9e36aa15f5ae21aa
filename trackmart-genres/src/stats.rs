//! Genre statistics aggregation
//!
//! Normalizes every row's genre field, explodes to one row per
//! (track, genre), aggregates per label, and ranks by a diminishing-returns
//! score. A pure function of its input table: nothing is persisted and
//! every invocation recomputes from scratch.

use crate::field::{clean_label, normalize_genre_field};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Column names probed, in order, when no genre column is configured
pub const GENRE_COLUMN_CANDIDATES: &[&str] = &[
    "genre",
    "genres",
    "artist_genres",
    "main_artist_genres",
    "primary_genre",
];

/// Scale factor applied to the concave volume term
const VOLUME_WEIGHT_SCALE: f64 = 25.0;

/// One row of the mart dataset.
///
/// Only the columns the aggregation needs are modeled; everything else,
/// including the genre column (whose name is configurable), rides in
/// `extra`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MartTrackRow {
    pub track_id: String,
    pub main_artist_name: Option<String>,
    pub popularity: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl MartTrackRow {
    /// Value of the named genre column, if the row carries it
    pub fn genre_value(&self, genre_col: &str) -> Option<&Value> {
        self.extra.get(genre_col)
    }
}

/// Aggregated statistics for one genre label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreStat {
    pub genre: String,
    /// Distinct tracks carrying this label
    pub tracks: u64,
    /// Distinct primary artists carrying this label
    pub artists: u64,
    /// Sum of popularity/100 over exploded rows, null popularity as 0
    pub popularity_score: f64,
    /// Mean raw popularity over exploded rows, nulls excluded. The
    /// asymmetry with `popularity_score` is inherited behavior, kept as-is.
    pub pop_mean: f64,
    /// sqrt(tracks) * 25, a concave function of catalog volume
    pub volume_weight: f64,
    /// volume_weight + pop_mean
    pub score: f64,
}

#[derive(Default)]
struct GenreAccumulator {
    track_ids: HashSet<String>,
    artist_names: HashSet<String>,
    pop_weight_sum: f64,
    pop_sum: f64,
    pop_count: u64,
}

/// First candidate column name present in any row, probe order fixed
pub fn detect_genre_column(rows: &[MartTrackRow]) -> Option<String> {
    GENRE_COLUMN_CANDIDATES
        .iter()
        .find(|candidate| rows.iter().any(|row| row.extra.contains_key(**candidate)))
        .map(|candidate| candidate.to_string())
}

/// Compute ranked genre statistics over `rows`, reading labels from the
/// `genre_col` column.
///
/// A track with multiple genres credits every one of them independently, so
/// `tracks` summed across the result can exceed the number of distinct
/// input tracks. Rows whose genre field yields no clean labels contribute
/// nothing; a dataset with no genre data at all produces an empty table,
/// not an error.
pub fn compute_genre_stats(rows: &[MartTrackRow], genre_col: &str) -> Vec<GenreStat> {
    let mut groups: BTreeMap<String, GenreAccumulator> = BTreeMap::new();

    for row in rows {
        let raw = match row.genre_value(genre_col) {
            Some(value) => value,
            None => continue,
        };

        for token in normalize_genre_field(raw) {
            let Some(label) = clean_label(&token) else {
                continue;
            };

            let group = groups.entry(label).or_default();
            group.track_ids.insert(row.track_id.clone());
            if let Some(artist) = &row.main_artist_name {
                group.artist_names.insert(artist.clone());
            }
            group.pop_weight_sum += row.popularity.unwrap_or(0.0) / 100.0;
            if let Some(pop) = row.popularity {
                group.pop_sum += pop;
                group.pop_count += 1;
            }
        }
    }

    tracing::debug!(rows = rows.len(), genres = groups.len(), "Aggregated genre groups");

    let mut stats: Vec<GenreStat> = groups
        .into_iter()
        .map(|(genre, acc)| {
            let tracks = acc.track_ids.len() as u64;
            let pop_mean = if acc.pop_count > 0 {
                acc.pop_sum / acc.pop_count as f64
            } else {
                0.0
            };
            let volume_weight = (tracks as f64).sqrt() * VOLUME_WEIGHT_SCALE;

            GenreStat {
                genre,
                tracks,
                artists: acc.artist_names.len() as u64,
                popularity_score: acc.pop_weight_sum,
                pop_mean,
                volume_weight,
                score: volume_weight + pop_mean,
            }
        })
        .collect();

    // Stable sort: ties keep the grouping's alphabetical order
    stats.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    stats
}
