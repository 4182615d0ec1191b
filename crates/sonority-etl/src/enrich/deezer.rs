//! Deezer preview lookup.
//!
//! Deezer's public search API needs no credentials. A catalog track is
//! matched by name and artist, and the first hit supplies a 30-second
//! preview URL and a cover image.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use sonority_core::model::Track;
use sonority_search::TrackLookup;

use crate::enrich::resilience::RateLimiter;
use crate::error::{EnrichError, EnrichResult};

const SOURCE: &str = "Deezer";

/// Deezer's public quota: 50 requests per 5 seconds.
const QUOTA_REQUESTS: usize = 50;
const QUOTA_WINDOW: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<DeezerTrack>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: u32,
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A search hit from Deezer.
#[derive(Debug, Clone, Deserialize)]
pub struct DeezerTrack {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub preview: Option<String>,
    pub link: Option<String>,
    pub album: Option<DeezerAlbum>,
    pub artist: Option<DeezerArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeezerAlbum {
    pub cover_xl: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeezerArtist {
    #[serde(default)]
    pub name: String,
    pub picture_xl: Option<String>,
}

impl DeezerTrack {
    /// Album cover, or the artist picture if the album has none.
    pub fn image(&self) -> Option<&str> {
        let cover = self
            .album
            .as_ref()
            .and_then(|a| a.cover_xl.as_deref())
            .filter(|s| !s.is_empty());
        cover.or_else(|| {
            self.artist
                .as_ref()
                .and_then(|a| a.picture_xl.as_deref())
                .filter(|s| !s.is_empty())
        })
    }
}

/// Playback metadata for a catalog track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPreview {
    pub track_id: String,
    pub track_name: String,
    pub track_artist: String,
    pub deezer_id: u64,
    pub preview_url: Option<String>,
    pub external_url: Option<String>,
    pub album_image: Option<String>,
}

impl TrackPreview {
    fn from_hit(track: &Track, hit: &DeezerTrack) -> Self {
        Self {
            track_id: track.track_id.clone(),
            track_name: track.track_name.clone(),
            track_artist: track.track_artist.clone(),
            deezer_id: hit.id,
            preview_url: hit.preview.clone().filter(|s| !s.is_empty()),
            external_url: hit.link.clone(),
            album_image: hit.image().map(str::to_string),
        }
    }
}

/// Deezer API client.
#[derive(Debug, Clone)]
pub struct DeezerClient {
    http: Client,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl DeezerClient {
    /// Create a client against `base_url` (normally `https://api.deezer.com`).
    pub fn new(base_url: impl Into<String>) -> EnrichResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("sonority/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::new(QUOTA_REQUESTS, QUOTA_WINDOW),
        })
    }

    /// First Deezer hit for a track name and artist, if any.
    pub async fn search_track(
        &self,
        name: &str,
        artist: &str,
    ) -> EnrichResult<Option<DeezerTrack>> {
        self.rate_limiter.acquire().await;

        let url = format!("{}/search", self.base_url);
        let query = search_query(name, artist);
        log::debug!("Deezer search: {query}");

        let response = self
            .http
            .get(&url)
            .query(&[("q", query.as_str()), ("limit", "1")])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EnrichError::RateLimited {
                source_name: SOURCE.to_string(),
            });
        }

        let response = response.error_for_status().map_err(|e| EnrichError::Http {
            source_name: SOURCE.to_string(),
            message: e.to_string(),
        })?;

        let body = response.text().await?;
        parse_search(&body)
    }

    /// Preview metadata for a catalog track.
    ///
    /// # Errors
    /// [`EnrichError::NotFound`] when Deezer has no match.
    pub async fn preview_for(&self, track: &Track) -> EnrichResult<TrackPreview> {
        let hit = self
            .search_track(&track.track_name, &track.track_artist)
            .await?
            .ok_or_else(|| EnrichError::NotFound {
                entity: format!("{} - {}", track.track_artist, track.track_name),
                source_name: SOURCE.to_string(),
            })?;

        Ok(TrackPreview::from_hit(track, &hit))
    }

    /// Resolve a catalog id, then look up its preview.
    ///
    /// # Errors
    /// [`EnrichError::Database`] wrapping a not-found error when the id is
    /// not in the catalog; [`EnrichError::NotFound`] when Deezer has no match.
    pub async fn preview_for_id<L>(&self, catalog: &L, track_id: &str) -> EnrichResult<TrackPreview>
    where
        L: TrackLookup + ?Sized,
    {
        let track = catalog
            .track(track_id)?
            .ok_or_else(|| sonority_core::Error::NotFound {
                entity: "track",
                id: track_id.to_string(),
            })?;

        self.preview_for(&track).await
    }
}

fn search_query(name: &str, artist: &str) -> String {
    format!(
        "track:\"{}\" artist:\"{}\"",
        name.replace('"', ""),
        artist.replace('"', "")
    )
}

fn parse_search(body: &str) -> EnrichResult<Option<DeezerTrack>> {
    let response: SearchResponse = serde_json::from_str(body).map_err(|e| EnrichError::Parse {
        source_name: SOURCE.to_string(),
        message: e.to_string(),
    })?;

    if let Some(err) = response.error {
        // Code 4 is Deezer's quota error, returned with HTTP 200.
        if err.code == 4 {
            return Err(EnrichError::RateLimited {
                source_name: SOURCE.to_string(),
            });
        }
        return Err(EnrichError::Http {
            source_name: SOURCE.to_string(),
            message: err.message,
        });
    }

    Ok(response.data.into_iter().next())
}
