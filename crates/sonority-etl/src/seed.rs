//! Initial catalog load from the Spotify songs CSV.
//!
//! Seeding only runs against an empty catalog. Rows are deduplicated on
//! `track_id` (first occurrence wins) before they are parsed, so a
//! malformed first occurrence still shadows later rows with the same id.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use sonority_core::model::{AudioFeatures, Track};
use sonority_core::schema::Database;

use crate::error::SeedResult;

const BATCH_SIZE: usize = 1000;

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// The catalog already had tracks; nothing was read.
    pub skipped_existing: bool,
    pub inserted: usize,
    /// Rows dropped because an earlier row had the same `track_id`.
    pub duplicates: usize,
    /// Rows that could not be parsed into a track, or had a NaN or
    /// infinite feature.
    pub invalid: usize,
}

/// One CSV row, in the column layout of the Spotify songs dataset.
#[derive(Debug, Deserialize)]
struct CsvRow {
    track_id: String,
    track_name: String,
    track_artist: String,
    track_popularity: i32,
    track_album_id: String,
    track_album_name: String,
    track_album_release_date: String,
    #[serde(default)]
    playlist_name: Option<String>,
    #[serde(default)]
    playlist_id: Option<String>,
    #[serde(default)]
    playlist_genre: Option<String>,
    #[serde(default)]
    playlist_subgenre: Option<String>,
    danceability: f64,
    energy: f64,
    key: i32,
    loudness: f64,
    mode: i32,
    speechiness: f64,
    acousticness: f64,
    instrumentalness: f64,
    liveness: f64,
    valence: f64,
    tempo: f64,
    duration_ms: i64,
}

impl From<CsvRow> for Track {
    fn from(row: CsvRow) -> Self {
        Self {
            track_id: row.track_id,
            track_name: row.track_name,
            track_artist: row.track_artist,
            track_popularity: row.track_popularity,
            track_album_id: row.track_album_id,
            track_album_name: row.track_album_name,
            track_album_release_date: row.track_album_release_date,
            playlist_name: non_empty(row.playlist_name),
            playlist_id: non_empty(row.playlist_id),
            playlist_genre: non_empty(row.playlist_genre),
            playlist_subgenre: non_empty(row.playlist_subgenre),
            features: AudioFeatures {
                danceability: row.danceability,
                energy: row.energy,
                key: row.key,
                loudness: row.loudness,
                speechiness: row.speechiness,
                acousticness: row.acousticness,
                instrumentalness: row.instrumentalness,
                liveness: row.liveness,
                valence: row.valence,
                tempo: row.tempo,
            },
            mode: row.mode,
            duration_ms: row.duration_ms,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Seed an empty catalog from a CSV file on disk.
pub fn seed_from_csv(db: &Database, path: &Path) -> SeedResult<SeedReport> {
    if db.count_tracks()? > 0 {
        log::info!("Catalog already has tracks; skipping seed");
        return Ok(SeedReport {
            skipped_existing: true,
            ..SeedReport::default()
        });
    }

    log::info!("Loading tracks from {}", path.display());
    let file = File::open(path)?;
    seed_from_reader(db, file)
}

/// Seed an empty catalog from any CSV source with a header row.
pub fn seed_from_reader<R: Read>(db: &Database, source: R) -> SeedResult<SeedReport> {
    let mut report = SeedReport::default();
    if db.count_tracks()? > 0 {
        report.skipped_existing = true;
        return Ok(report);
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers = reader.headers()?.clone();
    let id_column = headers.iter().position(|h| h == "track_id");

    let mut seen = HashSet::new();
    let mut tracks = Vec::new();

    for record in reader.records() {
        let record = record?;

        if let Some(id) = id_column.and_then(|i| record.get(i)) {
            if !seen.insert(id.to_string()) {
                report.duplicates += 1;
                continue;
            }
        }

        let track = match record.deserialize::<CsvRow>(Some(&headers)) {
            Ok(row) => Track::from(row),
            Err(e) => {
                log::debug!("Skipping row {}: {e}", record_line(&record));
                report.invalid += 1;
                continue;
            }
        };
        if let Some(name) = track.features.first_non_finite() {
            log::debug!(
                "Skipping row {}: {name} is not finite",
                record_line(&record)
            );
            report.invalid += 1;
            continue;
        }
        tracks.push(track);
    }

    if tracks.is_empty() {
        log::warn!("No valid tracks found in CSV");
        return Ok(report);
    }

    let total = tracks.len();
    log::info!("Found {total} tracks to insert");
    for batch in tracks.chunks(BATCH_SIZE) {
        report.inserted += db.insert_tracks(batch)?;
        log::info!("Loaded {}/{total} tracks", report.inserted);
    }

    if report.invalid > 0 {
        log::warn!("Skipped {} malformed rows", report.invalid);
    }

    Ok(report)
}

fn record_line(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}
