use serde::{Deserialize, Serialize};

use crate::model::features::{AudioFeatures, FeatureVector};

/// A catalog track: descriptive metadata plus its audio features.
///
/// Serializes flat, with the feature fields alongside the metadata, which
/// is the shape the Spotify songs dataset uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Spotify track ID; unique within the catalog.
    pub track_id: String,
    pub track_name: String,
    pub track_artist: String,
    pub track_popularity: i32,
    pub track_album_id: String,
    pub track_album_name: String,
    pub track_album_release_date: String,

    pub playlist_name: Option<String>,
    pub playlist_id: Option<String>,
    pub playlist_genre: Option<String>,
    pub playlist_subgenre: Option<String>,

    #[serde(flatten)]
    pub features: AudioFeatures,

    /// 1 = major, 0 = minor. Not a similarity feature.
    pub mode: i32,

    /// Not a similarity feature.
    pub duration_ms: i64,
}

impl Track {
    /// Create a track with empty album metadata and no playlist.
    #[must_use]
    pub fn new(
        track_id: impl Into<String>,
        track_name: impl Into<String>,
        track_artist: impl Into<String>,
        features: AudioFeatures,
    ) -> Self {
        Self {
            track_id: track_id.into(),
            track_name: track_name.into(),
            track_artist: track_artist.into(),
            track_popularity: 0,
            track_album_id: String::new(),
            track_album_name: String::new(),
            track_album_release_date: String::new(),
            playlist_name: None,
            playlist_id: None,
            playlist_genre: None,
            playlist_subgenre: None,
            features,
            mode: 1,
            duration_ms: 0,
        }
    }

    #[must_use]
    pub fn with_album(
        mut self,
        album_id: impl Into<String>,
        album_name: impl Into<String>,
        release_date: impl Into<String>,
    ) -> Self {
        self.track_album_id = album_id.into();
        self.track_album_name = album_name.into();
        self.track_album_release_date = release_date.into();
        self
    }

    #[must_use]
    pub fn with_popularity(mut self, popularity: i32) -> Self {
        self.track_popularity = popularity;
        self
    }

    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<String>, subgenre: impl Into<String>) -> Self {
        self.playlist_genre = Some(genre.into());
        self.playlist_subgenre = Some(subgenre.into());
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: i32) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// The raw (unnormalized) similarity vector.
    #[must_use]
    pub fn feature_vector(&self) -> FeatureVector {
        self.features.to_vector()
    }
}

/// A partial edit of a track's descriptive fields.
///
/// Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackUpdate {
    pub track_name: Option<String>,
    pub track_artist: Option<String>,
    pub track_popularity: Option<i32>,
}

impl TrackUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.track_name.is_none() && self.track_artist.is_none() && self.track_popularity.is_none()
    }
}
