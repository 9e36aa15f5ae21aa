//! trackmart-genres - Genre Analytics
//!
//! Reads mart track rows as NDJSON, aggregates per-genre statistics, and
//! prints the ranked table.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use trackmart_genres::stats::{compute_genre_stats, detect_genre_column, MartTrackRow};

#[derive(Parser, Debug)]
#[command(
    name = "trackmart-genres",
    about = "Rank genres over a mart track dataset",
    version
)]
struct Args {
    /// Mart rows as NDJSON ("-" for stdin)
    #[arg(long, default_value = "-")]
    input: PathBuf,

    /// Genre column name; auto-detected when unset
    #[arg(long)]
    genre_column: Option<String>,

    /// Print at most this many genres (0 = all)
    #[arg(long, default_value_t = 0)]
    top: usize,

    /// Emit JSON lines instead of a text table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let rows = read_rows(&args.input)?;

    let genre_column = match args.genre_column.clone() {
        Some(column) => column,
        None => detect_genre_column(&rows)
            .context("no genre column found in the input; pass --genre-column")?,
    };

    let mut stats = compute_genre_stats(&rows, &genre_column);
    if args.top > 0 {
        stats.truncate(args.top);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.json {
        for stat in &stats {
            serde_json::to_writer(&mut out, stat)?;
            out.write_all(b"\n")?;
        }
    } else {
        writeln!(
            out,
            "{:<28} {:>7} {:>7} {:>10} {:>9} {:>9} {:>9}",
            "genre", "tracks", "artists", "pop_score", "pop_mean", "volume", "score"
        )?;
        for stat in &stats {
            writeln!(
                out,
                "{:<28} {:>7} {:>7} {:>10.2} {:>9.1} {:>9.1} {:>9.1}",
                stat.genre,
                stat.tracks,
                stat.artists,
                stat.popularity_score,
                stat.pop_mean,
                stat.volume_weight,
                stat.score
            )?;
        }
    }

    Ok(())
}

fn read_rows(path: &PathBuf) -> Result<Vec<MartTrackRow>> {
    let reader: Box<dyn BufRead> = if path.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Box::new(BufReader::new(file))
    };

    let mut rows = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row: MartTrackRow = serde_json::from_str(&line)
            .with_context(|| format!("malformed mart row on line {}", number + 1))?;
        rows.push(row);
    }

    Ok(rows)
}
