use anyhow::Result;
use serde::Serialize;

use sonority_etl::Config;

use super::{open_db, Output};

const TOP_GENRES: usize = 8;

#[derive(Debug, Serialize)]
struct Status {
    database: String,
    tracks: usize,
    genres: Vec<GenreCount>,
    mood_search: bool,
}

#[derive(Debug, Serialize)]
struct GenreCount {
    genre: Option<String>,
    tracks: usize,
}

pub fn show_status(config: &Config, output: Output) -> Result<()> {
    let db = open_db(config)?;

    let status = Status {
        database: config.database_path.display().to_string(),
        tracks: db.count_tracks()?,
        genres: db
            .genre_counts()?
            .into_iter()
            .map(|(genre, tracks)| GenreCount { genre, tracks })
            .collect(),
        mood_search: config.google_api_key.is_some(),
    };

    if output.is_json() {
        return output.json(&status);
    }

    println!("\n📊 Sonority Status\n");
    println!("  Database: {}", status.database);
    println!("  Tracks: {}", status.tracks);
    println!(
        "  Mood search: {}",
        if status.mood_search { "enabled" } else { "no google_api_key" }
    );

    if status.tracks == 0 {
        println!("\n  Run `sonority seed --csv <file>` to load the catalog");
        return Ok(());
    }

    println!("\n  Genres:");
    for g in status.genres.iter().take(TOP_GENRES) {
        println!(
            "    {:<12} {:>7}",
            g.genre.as_deref().unwrap_or("(none)"),
            g.tracks
        );
    }

    Ok(())
}
