/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Catalog tracks with their audio features
CREATE TABLE IF NOT EXISTS tracks (
    track_id TEXT PRIMARY KEY,
    track_name TEXT NOT NULL,
    track_artist TEXT NOT NULL,
    track_popularity INTEGER NOT NULL DEFAULT 0,
    track_album_id TEXT NOT NULL DEFAULT '',
    track_album_name TEXT NOT NULL DEFAULT '',
    track_album_release_date TEXT NOT NULL DEFAULT '',
    playlist_name TEXT,
    playlist_id TEXT,
    playlist_genre TEXT,
    playlist_subgenre TEXT,
    danceability REAL NOT NULL,
    energy REAL NOT NULL,
    key INTEGER NOT NULL,
    loudness REAL NOT NULL,
    mode INTEGER NOT NULL,
    speechiness REAL NOT NULL,
    acousticness REAL NOT NULL,
    instrumentalness REAL NOT NULL,
    liveness REAL NOT NULL,
    valence REAL NOT NULL,
    tempo REAL NOT NULL,
    duration_ms INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tracks_artist ON tracks(track_artist);
CREATE INDEX IF NOT EXISTS idx_tracks_name ON tracks(track_name);
"#;

const MIGRATION_002: &str = r#"
CREATE INDEX IF NOT EXISTS idx_tracks_genre ON tracks(playlist_genre);
"#;

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "tracks",
        sql: MIGRATION_001,
    },
    Migration {
        version: 2,
        name: "track_genre_index",
        sql: MIGRATION_002,
    },
];
