//! Windowed track extraction
//!
//! Pages through the catalog search endpoint for one (query, year, market)
//! partition and yields matching tracks as a lazy stream. Termination is
//! driven by raw page counts: the popularity filter runs after fetch and
//! never affects offset/total bookkeeping.

use crate::client::{CatalogApi, CatalogError};
use async_stream::try_stream;
use futures::Stream;
use trackmart_common::models::{Partition, TrackRecord};

/// Provider page size ceiling for the search endpoint
pub const MAX_PAGE_SIZE: u32 = 50;

/// Provider-side hard ceiling on deep pagination, per distinct query string.
/// Not configurable.
pub const SEARCH_RESULT_CEILING: u32 = 10_000;

/// Fetch all tracks for one partition.
///
/// Requests pages at increasing offsets until a page comes back empty, the
/// cumulative offset reaches the provider-reported total, or the offset
/// reaches [`SEARCH_RESULT_CEILING`]. Tracks below `min_popularity` are
/// dropped after fetch, so filtered-out items still count toward the
/// offset/total bookkeeping.
///
/// The stream is pull-driven: a page is only fetched once the previous
/// page's items have been consumed. Each invocation starts at offset 0;
/// there is no resume. Fetch failures end the stream with the error.
/// Already-yielded tracks stand, and no retry is attempted.
pub fn fetch_tracks_for_partition<'a>(
    api: &'a dyn CatalogApi,
    partition: &'a Partition,
    limit: u32,
    min_popularity: Option<i64>,
) -> impl Stream<Item = Result<TrackRecord, CatalogError>> + 'a {
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let query = partition.combined_query();

    try_stream! {
        let mut offset = 0u32;

        loop {
            let page = api
                .search_page(&query, limit, offset, partition.market.as_deref())
                .await?;

            if page.items.is_empty() {
                break;
            }

            let total = page.total;
            let fetched = page.items.len();
            let mut emitted = 0usize;

            for track in page.items {
                if min_popularity.map_or(true, |min| track.popularity >= min) {
                    emitted += 1;
                    yield track;
                }
            }

            tracing::debug!(query = %query, offset, fetched, emitted, total, "Processed search page");

            // Offsets advance by the requested page size, not by items seen
            offset += limit;

            if offset >= total {
                break;
            }
            if offset >= SEARCH_RESULT_CEILING {
                break;
            }
        }
    }
}
