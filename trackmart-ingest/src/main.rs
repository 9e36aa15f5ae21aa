//! trackmart-ingest - Catalog Extraction Service
//!
//! Pulls track and artist data from the catalog search API for a sweep of
//! (query, year, market) partitions and hands the records to the load
//! stage as NDJSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use trackmart_common::config::{default_config_path, load_toml_config, resolve_credentials};
use trackmart_common::models::ArtistRecord;
use trackmart_ingest::client::SpotifyClient;
use trackmart_ingest::job::{run_artist_enrichment, run_extraction, SweepConfig};

#[derive(Parser, Debug)]
#[command(
    name = "trackmart-ingest",
    about = "Extract catalog tracks and artists into NDJSON",
    version
)]
struct Args {
    /// Search query, repeatable (e.g. --query "genre:pop"). An empty string
    /// means "year only"; the default sweep is one broad query.
    #[arg(long = "query", default_values_t = vec![String::new()])]
    queries: Vec<String>,

    /// First release year of the sweep
    #[arg(long)]
    year_from: i32,

    /// Last release year of the sweep (inclusive)
    #[arg(long)]
    year_to: i32,

    /// Two-letter market code
    #[arg(long, env = "TRACKMART_MARKET")]
    market: Option<String>,

    /// Page size, 1-50
    #[arg(long, default_value_t = 50)]
    limit: u32,

    /// Inclusive popularity lower bound, 0-100
    #[arg(long)]
    min_popularity: Option<i64>,

    /// Track output file (NDJSON, appended)
    #[arg(long, default_value = "raw_tracks.ndjson")]
    tracks_out: PathBuf,

    /// Artist output file (NDJSON, appended). Ids already present in the
    /// file are not re-fetched. Enrichment is skipped when unset.
    #[arg(long)]
    artists_out: Option<PathBuf>,

    /// Config file path (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting trackmart-ingest");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    if args.year_from > args.year_to {
        anyhow::bail!("--year-from must not be greater than --year-to");
    }

    let toml_config = match args.config.clone().or_else(default_config_path) {
        Some(path) => load_toml_config(&path)?,
        None => Default::default(),
    };

    // Fail fast on missing credentials, before any network call
    let credentials = resolve_credentials(&toml_config)?;
    let client = SpotifyClient::new(credentials).context("constructing catalog client")?;

    let sweep = SweepConfig {
        queries: args.queries.clone(),
        years: (args.year_from..=args.year_to).collect(),
        market: args.market.clone().or_else(|| toml_config.market.clone()),
        limit: args.limit,
        min_popularity: args.min_popularity,
    };

    let tracks_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.tracks_out)
        .with_context(|| format!("opening {}", args.tracks_out.display()))?;
    let mut tracks_sink = BufWriter::new(tracks_file);

    let report = run_extraction(&client, &sweep, &mut tracks_sink).await?;
    tracks_sink.flush()?;

    if let Some(artists_out) = &args.artists_out {
        let already = read_enriched_ids(artists_out)?;

        let artists_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(artists_out)
            .with_context(|| format!("opening {}", artists_out.display()))?;
        let mut artists_sink = BufWriter::new(artists_file);

        run_artist_enrichment(&client, &report.artist_ids, &already, &mut artists_sink).await?;
        artists_sink.flush()?;
    }

    Ok(())
}

/// Artist ids already present in an artists NDJSON file from a previous run
fn read_enriched_ids(path: &Path) -> Result<HashSet<String>> {
    let mut ids = HashSet::new();
    if !path.exists() {
        return Ok(ids);
    }

    let reader = BufReader::new(File::open(path)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ArtistRecord = serde_json::from_str(&line)
            .with_context(|| format!("malformed artist record in {}", path.display()))?;
        ids.insert(record.artist_id);
    }

    Ok(ids)
}
