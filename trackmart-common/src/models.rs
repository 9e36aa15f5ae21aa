//! Shared data models: extracted records and search partitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One track as returned by the catalog search endpoint.
///
/// Produced one per search result item. Immutable once yielded; ownership
/// transfers to the load stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackRecord {
    /// Provider track id
    pub id: String,
    /// Track title
    pub name: String,
    /// Provider popularity score, 0-100. Omitted by the provider for some
    /// items; treated as 0.
    #[serde(default)]
    pub popularity: i64,
    /// Credited artists, in provider order. The first entry is the primary
    /// artist used downstream as `main_artist`.
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    /// Containing album
    pub album: Option<AlbumRef>,
    /// 30-second preview clip URL, when the provider licenses one
    pub preview_url: Option<String>,
}

impl TrackRecord {
    /// Primary (first-credited) artist
    pub fn primary_artist(&self) -> Option<&ArtistRef> {
        self.artists.first()
    }
}

/// Artist reference embedded in a track record
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// External link map carried by the provider on artist/track objects
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

/// Album reference embedded in a track record
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlbumRef {
    pub name: String,
    pub album_type: Option<String>,
    /// Release date as the provider reports it: "YYYY", "YYYY-MM" or
    /// "YYYY-MM-DD" depending on release-date precision
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

/// Cover art variant
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageRef {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// One enriched artist, as emitted by the bulk artist lookup
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistRecord {
    pub artist_id: String,
    pub artist_name: String,
    pub genres: Vec<String>,
    pub popularity: Option<i64>,
    pub followers: Option<u64>,
    /// When this record was fetched (UTC)
    pub fetched_at: DateTime<Utc>,
}

/// One independent unit of pagination: (query, year, market).
///
/// Partitions never share offset state; each invocation of the extraction
/// loop starts at offset 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Free-text search filter. Empty means "no text filter, year only".
    pub query: String,
    /// Release year, appended to the query as a `year:<Y>` term
    pub year: i32,
    /// Optional two-letter region code
    pub market: Option<String>,
}

impl Partition {
    pub fn new(query: impl Into<String>, year: i32, market: Option<String>) -> Self {
        Self {
            query: query.into(),
            year,
            market,
        }
    }

    /// Combined search term sent to the provider:
    /// `"{query} year:{year}"`, or `"year:{year}"` for an empty query.
    pub fn combined_query(&self) -> String {
        if self.query.is_empty() {
            format!("year:{}", self.year)
        } else {
            format!("{} year:{}", self.query, self.year)
        }
    }

    /// Identifier-safe dataset name for this partition's output,
    /// `tracks_{year}_{query}` with spaces and colons flattened to
    /// underscores and an empty query mapped to `all`.
    pub fn dataset_name(&self) -> String {
        let safe = if self.query.is_empty() {
            "all".to_string()
        } else {
            self.query.replace(' ', "_").replace(':', "_")
        };
        format!("tracks_{}_{}", self.year, safe)
    }
}
