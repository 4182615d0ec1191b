use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use sonority_core::model::{Track, TrackUpdate};
use sonority_core::schema::Database;

use super::Output;

pub fn list(db: &Database, limit: usize, offset: usize, output: Output) -> Result<()> {
    let tracks = db.list_tracks(limit, offset)?;
    output.tracks(&tracks)
}

pub fn get(db: &Database, track_id: &str, output: Output) -> Result<()> {
    let track = db
        .get_track(track_id)?
        .with_context(|| format!("Track not found: {track_id}"))?;
    output.track(&track)
}

pub fn search(
    db: &Database,
    query: &str,
    limit: usize,
    offset: usize,
    output: Output,
) -> Result<()> {
    let tracks = db.search_tracks(query, limit, offset)?;
    output.tracks(&tracks)
}

fn read_track(file: &Path) -> Result<Track> {
    let mut raw = String::new();
    if file.as_os_str() == "-" {
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read track from stdin")?;
    } else {
        raw = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
    }
    serde_json::from_str(&raw).context("Track JSON is missing fields or malformed")
}

fn check_features(track: &Track) -> Result<()> {
    if let Some(name) = track.features.first_non_finite() {
        anyhow::bail!("Feature {name} must be a finite number");
    }
    Ok(())
}

pub fn add(db: &Database, file: &Path, output: Output) -> Result<()> {
    let track = read_track(file)?;
    check_features(&track)?;
    db.insert_track(&track)?;
    log::info!("Added track {}", track.track_id);

    if output.is_json() {
        return output.json(&track);
    }
    println!("✓ Added {} ({} - {})", track.track_id, track.track_artist, track.track_name);
    Ok(())
}

pub fn update(
    db: &Database,
    track_id: &str,
    track_name: Option<String>,
    track_artist: Option<String>,
    track_popularity: Option<i32>,
    output: Output,
) -> Result<()> {
    let update = TrackUpdate {
        track_name,
        track_artist,
        track_popularity,
    };
    if update.is_empty() {
        anyhow::bail!("Nothing to update; pass --name, --artist, or --popularity");
    }

    let track = db
        .update_track(track_id, &update)?
        .with_context(|| format!("Track not found: {track_id}"))?;
    output.track(&track)
}

pub fn delete(db: &Database, track_id: &str, output: Output) -> Result<()> {
    if !db.delete_track(track_id)? {
        anyhow::bail!("Track not found: {track_id}");
    }
    log::info!("Deleted track {track_id}");

    if output.is_json() {
        return output.json(&serde_json::json!({ "deleted": track_id }));
    }
    println!("✓ Deleted {track_id}");
    Ok(())
}
