//! Artist enrichment batching
//!
//! Splits artist ids into provider-sized chunks and resolves each chunk
//! through the bulk lookup endpoint, sequentially and in input order.

use crate::client::{ArtistDetail, CatalogApi, CatalogError};
use async_stream::try_stream;
use chrono::{DateTime, Utc};
use futures::Stream;
use trackmart_common::models::ArtistRecord;

/// Provider per-call identifier limit for the bulk artist endpoint
pub const ARTIST_BATCH_SIZE: usize = 50;

/// Enrich `artist_ids` through the bulk lookup endpoint.
///
/// Null response entries (unresolvable ids) are skipped, not errored. A
/// chunk failure ends the stream with the error; records yielded for
/// earlier chunks stand. No dedup happens here: callers exclude ids that
/// are already enriched, and duplicates in the input are re-fetched and
/// re-emitted as asked.
pub fn fetch_artist_details<'a>(
    api: &'a dyn CatalogApi,
    artist_ids: &'a [String],
) -> impl Stream<Item = Result<ArtistRecord, CatalogError>> + 'a {
    try_stream! {
        for chunk in artist_ids.chunks(ARTIST_BATCH_SIZE) {
            let details = api.artist_batch(chunk).await?;
            let fetched_at = Utc::now();

            let requested = chunk.len();
            let resolved = details.iter().filter(|d| d.is_some()).count();
            if resolved < requested {
                tracing::debug!(requested, resolved, "Bulk artist lookup skipped unresolvable ids");
            }

            for detail in details.into_iter().flatten() {
                yield artist_record(detail, fetched_at);
            }
        }
    }
}

fn artist_record(detail: ArtistDetail, fetched_at: DateTime<Utc>) -> ArtistRecord {
    ArtistRecord {
        artist_id: detail.id,
        artist_name: detail.name,
        genres: detail.genres,
        popularity: detail.popularity,
        followers: detail.followers.and_then(|f| f.total),
        fetched_at,
    }
}
