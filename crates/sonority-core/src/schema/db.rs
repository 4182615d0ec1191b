use chrono::Utc;
use rusqlite::{ffi, params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{AudioFeatures, Track, TrackUpdate};

use super::migrations::MIGRATIONS;

const TRACK_COLUMNS: &str = "track_id, track_name, track_artist, track_popularity,
    track_album_id, track_album_name, track_album_release_date,
    playlist_name, playlist_id, playlist_genre, playlist_subgenre,
    danceability, energy, key, loudness, mode, speechiness, acousticness,
    instrumentalness, liveness, valence, tempo, duration_ms";

const INSERT_TRACK: &str = "INSERT INTO tracks (
    track_id, track_name, track_artist, track_popularity,
    track_album_id, track_album_name, track_album_release_date,
    playlist_name, playlist_id, playlist_genre, playlist_subgenre,
    danceability, energy, key, loudness, mode, speechiness, acousticness,
    instrumentalness, liveness, valence, tempo, duration_ms,
    created_at, updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
          ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?24)";

/// A catalog database connection with CRUD methods for tracks.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

// Track CRUD
impl Database {
    /// Insert a new track.
    ///
    /// Fails with [`Error::DuplicateTrack`] if the `track_id` already exists,
    /// and with [`Error::InvalidData`] if any feature is NaN or infinite.
    pub fn insert_track(&self, track: &Track) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(INSERT_TRACK)?;
        execute_insert(&mut stmt, track)
    }

    /// Insert many tracks in a single transaction.
    ///
    /// Either every track is inserted or none are. Returns the number inserted.
    pub fn insert_tracks(&self, tracks: &[Track]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_TRACK)?;
            for track in tracks {
                execute_insert(&mut stmt, track)?;
            }
        }
        tx.commit()?;
        Ok(tracks.len())
    }

    /// Fetch a single track by ID.
    pub fn get_track(&self, track_id: &str) -> Result<Option<Track>> {
        let sql = format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE track_id = ?1");
        let track = self
            .conn
            .query_row(&sql, [track_id], row_to_track)
            .optional()?;
        Ok(track)
    }

    /// List tracks in insertion order.
    ///
    /// The order is stable across calls as long as the table is not mutated,
    /// so it is safe to use as a catalog snapshot.
    pub fn list_tracks(&self, limit: usize, offset: usize) -> Result<Vec<Track>> {
        let sql = format!("SELECT {TRACK_COLUMNS} FROM tracks ORDER BY rowid LIMIT ?1 OFFSET ?2");
        let mut stmt = self.conn.prepare(&sql)?;
        let tracks = stmt
            .query_map(params![to_sql_count(limit), to_sql_count(offset)], row_to_track)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tracks)
    }

    /// Case-insensitive substring search over track name and artist.
    pub fn search_tracks(&self, query: &str, limit: usize, offset: usize) -> Result<Vec<Track>> {
        let sql = format!(
            "SELECT {TRACK_COLUMNS} FROM tracks
             WHERE track_name LIKE ?1 ESCAPE '\\' OR track_artist LIKE ?1 ESCAPE '\\'
             ORDER BY rowid LIMIT ?2 OFFSET ?3"
        );
        let pattern = format!("%{}%", escape_like(query));
        let mut stmt = self.conn.prepare(&sql)?;
        let tracks = stmt
            .query_map(
                params![pattern, to_sql_count(limit), to_sql_count(offset)],
                row_to_track,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tracks)
    }

    /// Number of tracks in the catalog.
    pub fn count_tracks(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| Error::InvalidData(format!("negative count {count}")))
    }

    /// Track counts per playlist genre, largest first.
    ///
    /// Tracks without a genre are grouped under `None`.
    pub fn genre_counts(&self) -> Result<Vec<(Option<String>, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT playlist_genre, COUNT(*) AS n FROM tracks
             GROUP BY playlist_genre ORDER BY n DESC, playlist_genre",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let genre: Option<String> = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((genre, count))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(genre, count)| {
                usize::try_from(count)
                    .map(|n| (genre, n))
                    .map_err(|_| Error::InvalidData(format!("negative count {count}")))
            })
            .collect()
    }

    /// Apply a partial update and return the updated track.
    ///
    /// Returns `None` if no track has this ID.
    pub fn update_track(&self, track_id: &str, update: &TrackUpdate) -> Result<Option<Track>> {
        let changed = self.conn.execute(
            "UPDATE tracks SET
                track_name = COALESCE(?2, track_name),
                track_artist = COALESCE(?3, track_artist),
                track_popularity = COALESCE(?4, track_popularity),
                updated_at = ?5
             WHERE track_id = ?1",
            params![
                track_id,
                update.track_name,
                update.track_artist,
                update.track_popularity,
                Utc::now().to_rfc3339(),
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        self.get_track(track_id)
    }

    /// Delete a track. Returns `true` if a row was removed.
    pub fn delete_track(&self, track_id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tracks WHERE track_id = ?1", [track_id])?;
        Ok(changed > 0)
    }
}

fn execute_insert(stmt: &mut rusqlite::CachedStatement<'_>, track: &Track) -> Result<()> {
    let f = &track.features;
    if let Some(name) = f.first_non_finite() {
        return Err(Error::InvalidData(format!(
            "track {}: {name} is not a finite number",
            track.track_id
        )));
    }

    let result = stmt.execute(params![
        track.track_id,
        track.track_name,
        track.track_artist,
        track.track_popularity,
        track.track_album_id,
        track.track_album_name,
        track.track_album_release_date,
        track.playlist_name,
        track.playlist_id,
        track.playlist_genre,
        track.playlist_subgenre,
        f.danceability,
        f.energy,
        f.key,
        f.loudness,
        track.mode,
        f.speechiness,
        f.acousticness,
        f.instrumentalness,
        f.liveness,
        f.valence,
        f.tempo,
        track.duration_ms,
        Utc::now().to_rfc3339(),
    ]);

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            Err(Error::DuplicateTrack(track.track_id.clone()))
        }
        Err(e) => Err(e.into()),
    }
}

fn row_to_track(row: &rusqlite::Row) -> rusqlite::Result<Track> {
    Ok(Track {
        track_id: row.get(0)?,
        track_name: row.get(1)?,
        track_artist: row.get(2)?,
        track_popularity: row.get(3)?,
        track_album_id: row.get(4)?,
        track_album_name: row.get(5)?,
        track_album_release_date: row.get(6)?,
        playlist_name: row.get(7)?,
        playlist_id: row.get(8)?,
        playlist_genre: row.get(9)?,
        playlist_subgenre: row.get(10)?,
        features: AudioFeatures {
            danceability: row.get(11)?,
            energy: row.get(12)?,
            key: row.get(13)?,
            loudness: row.get(14)?,
            speechiness: row.get(16)?,
            acousticness: row.get(17)?,
            instrumentalness: row.get(18)?,
            liveness: row.get(19)?,
            valence: row.get(20)?,
            tempo: row.get(21)?,
        },
        mode: row.get(15)?,
        duration_ms: row.get(22)?,
    })
}

fn to_sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn escape_like(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
