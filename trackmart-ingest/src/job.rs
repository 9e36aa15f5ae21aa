//! Extraction sweep job
//!
//! Sequences the extraction loop over `years × queries` for one market and
//! writes every record as one NDJSON line to an append-only sink, the
//! handoff boundary to the external load stage. Partitions are independent:
//! each gets its own pagination sequence starting at offset 0.

use crate::client::{CatalogApi, CatalogError};
use crate::enrich::fetch_artist_details;
use crate::extract::fetch_tracks_for_partition;
use futures::{pin_mut, StreamExt};
use std::collections::HashSet;
use std::io::Write;
use thiserror::Error;
use tracing::info;
use trackmart_common::models::Partition;

/// Extraction job errors
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Sink error: {0}")]
    Sink(#[from] std::io::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Settings for one extraction sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Free-text filters; an empty string means "year only"
    pub queries: Vec<String>,
    pub years: Vec<i32>,
    pub market: Option<String>,
    /// Requested page size, clamped to the provider range by the loop
    pub limit: u32,
    /// Inclusive popularity lower bound; None disables filtering
    pub min_popularity: Option<i64>,
}

impl SweepConfig {
    /// All (query, year, market) partitions of this sweep, year-major
    pub fn partitions(&self) -> Vec<Partition> {
        let mut partitions = Vec::with_capacity(self.years.len() * self.queries.len());
        for &year in &self.years {
            for query in &self.queries {
                partitions.push(Partition::new(query.clone(), year, self.market.clone()));
            }
        }
        partitions
    }
}

/// Outcome of one extraction sweep
#[derive(Debug, Default)]
pub struct SweepReport {
    pub partitions: usize,
    pub tracks_written: u64,
    /// Primary-artist ids discovered during the sweep, first-seen order
    pub artist_ids: Vec<String>,
}

/// Run the full extraction sweep, appending one JSON line per track.
///
/// A partition failure aborts the sweep; lines already written for earlier
/// partitions (and earlier pages of the failing one) stand, since the load
/// stage is append-only.
pub async fn run_extraction(
    api: &dyn CatalogApi,
    config: &SweepConfig,
    sink: &mut dyn Write,
) -> Result<SweepReport, JobError> {
    let partitions = config.partitions();
    let mut report = SweepReport {
        partitions: partitions.len(),
        ..Default::default()
    };
    let mut seen_artists = HashSet::new();

    for partition in &partitions {
        let mut partition_tracks = 0u64;

        let stream =
            fetch_tracks_for_partition(api, partition, config.limit, config.min_popularity);
        pin_mut!(stream);

        while let Some(track) = stream.next().await {
            let track = track?;

            if let Some(artist) = track.primary_artist() {
                if seen_artists.insert(artist.id.clone()) {
                    report.artist_ids.push(artist.id.clone());
                }
            }

            serde_json::to_writer(&mut *sink, &track)?;
            sink.write_all(b"\n")?;
            partition_tracks += 1;
        }

        report.tracks_written += partition_tracks;
        info!(
            dataset = %partition.dataset_name(),
            tracks = partition_tracks,
            "Partition extracted"
        );
    }

    info!(
        partitions = report.partitions,
        tracks = report.tracks_written,
        artists = report.artist_ids.len(),
        "Extraction sweep complete"
    );

    Ok(report)
}

/// Enrich the artists discovered by a sweep, appending one JSON line per
/// resolved artist.
///
/// `already_enriched` is subtracted from `artist_ids` before any call; the
/// set-difference lives here at the call site, not in the batching layer.
pub async fn run_artist_enrichment(
    api: &dyn CatalogApi,
    artist_ids: &[String],
    already_enriched: &HashSet<String>,
    sink: &mut dyn Write,
) -> Result<u64, JobError> {
    let pending: Vec<String> = artist_ids
        .iter()
        .filter(|id| !already_enriched.contains(*id))
        .cloned()
        .collect();

    info!(
        discovered = artist_ids.len(),
        pending = pending.len(),
        "Starting artist enrichment"
    );

    let mut written = 0u64;
    let stream = fetch_artist_details(api, &pending);
    pin_mut!(stream);

    while let Some(artist) = stream.next().await {
        let artist = artist?;
        serde_json::to_writer(&mut *sink, &artist)?;
        sink.write_all(b"\n")?;
        written += 1;
    }

    info!(artists = written, "Artist enrichment complete");
    Ok(written)
}
