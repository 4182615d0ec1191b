pub mod config;
pub mod features;
pub mod mood;
pub mod preview;
pub mod recommend;
pub mod seed;
pub mod status;
pub mod tracks;

use anyhow::{Context, Result};
use serde::Serialize;

use sonority_core::model::Track;
use sonority_core::schema::Database;
use sonority_etl::Config;

/// Open the configured catalog, creating its directory if needed.
pub fn open_db(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    Database::open(&config.database_path).with_context(|| {
        format!(
            "Failed to open database at {}",
            config.database_path.display()
        )
    })
}

/// Where command results go: an aligned table or JSON on stdout.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    pub const fn is_json(self) -> bool {
        self.json
    }

    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("Failed to encode JSON")?
        );
        Ok(())
    }

    /// A ranked or listed set of tracks.
    pub fn tracks(self, tracks: &[Track]) -> Result<()> {
        if self.json {
            return self.json(tracks);
        }
        if tracks.is_empty() {
            println!("No tracks found.");
            return Ok(());
        }
        print!("{}", track_table(tracks));
        Ok(())
    }

    /// A single track with all of its fields.
    pub fn track(self, track: &Track) -> Result<()> {
        if self.json {
            return self.json(track);
        }
        print!("{}", track_detail(track));
        Ok(())
    }
}

const NAME_WIDTH: usize = 36;
const ARTIST_WIDTH: usize = 24;

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn track_table(tracks: &[Track]) -> String {
    let header = format!(
        "{:>3}  {:<22}  {:<NAME_WIDTH$}  {:<ARTIST_WIDTH$}  {:<10}",
        "#", "TRACK ID", "NAME", "ARTIST", "GENRE"
    );
    let rows = tracks.iter().enumerate().map(|(i, t)| {
        format!(
            "{:>3}  {:<22}  {:<NAME_WIDTH$}  {:<ARTIST_WIDTH$}  {:<10}",
            i + 1,
            t.track_id,
            truncate(&t.track_name, NAME_WIDTH),
            truncate(&t.track_artist, ARTIST_WIDTH),
            t.playlist_genre.as_deref().unwrap_or("-"),
        )
    });
    lines(std::iter::once(header).chain(rows))
}

fn track_detail(t: &Track) -> String {
    let f = &t.features;
    let mut out = vec![
        format!("{} - {}", t.track_artist, t.track_name),
        format!("  id:               {}", t.track_id),
        format!(
            "  album:            {} ({})",
            t.track_album_name, t.track_album_release_date
        ),
        format!("  popularity:       {}", t.track_popularity),
    ];
    if let Some(genre) = &t.playlist_genre {
        out.push(format!(
            "  genre:            {genre} / {}",
            t.playlist_subgenre.as_deref().unwrap_or("-")
        ));
    }
    out.extend([
        format!("  danceability:     {:.3}", f.danceability),
        format!("  energy:           {:.3}", f.energy),
        format!("  key:              {}", f.key),
        format!("  loudness:         {:.2} dB", f.loudness),
        format!(
            "  mode:             {}",
            if t.mode == 1 { "major" } else { "minor" }
        ),
        format!("  speechiness:      {:.3}", f.speechiness),
        format!("  acousticness:     {:.3}", f.acousticness),
        format!("  instrumentalness: {:.3}", f.instrumentalness),
        format!("  liveness:         {:.3}", f.liveness),
        format!("  valence:          {:.3}", f.valence),
        format!("  tempo:            {:.1} BPM", f.tempo),
        format!("  duration:         {}", format_duration(t.duration_ms)),
    ]);
    lines(out)
}

/// Join lines with a trailing newline.
pub fn lines(lines: impl IntoIterator<Item = String>) -> String {
    lines.into_iter().map(|l| l + "\n").collect()
}

fn format_duration(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
