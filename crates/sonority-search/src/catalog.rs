//! Data-access capabilities the recommender consumes.

use sonority_core::model::Track;
use sonority_core::schema::Database;

/// Reads the catalog as an ordered snapshot.
///
/// Implementations must return rows in an order that does not change
/// between two calls unless the catalog itself was mutated.
pub trait CatalogReader {
    fn all_tracks(&self, limit: usize) -> sonority_core::Result<Vec<Track>>;
}

/// Looks up a single track by its identifier.
pub trait TrackLookup {
    fn track(&self, track_id: &str) -> sonority_core::Result<Option<Track>>;
}

impl CatalogReader for Database {
    fn all_tracks(&self, limit: usize) -> sonority_core::Result<Vec<Track>> {
        self.list_tracks(limit, 0)
    }
}

impl TrackLookup for Database {
    fn track(&self, track_id: &str) -> sonority_core::Result<Option<Track>> {
        self.get_track(track_id)
    }
}

impl CatalogReader for [Track] {
    fn all_tracks(&self, limit: usize) -> sonority_core::Result<Vec<Track>> {
        Ok(self.iter().take(limit).cloned().collect())
    }
}

impl TrackLookup for [Track] {
    fn track(&self, track_id: &str) -> sonority_core::Result<Option<Track>> {
        Ok(self.iter().find(|t| t.track_id == track_id).cloned())
    }
}

impl CatalogReader for Vec<Track> {
    fn all_tracks(&self, limit: usize) -> sonority_core::Result<Vec<Track>> {
        self.as_slice().all_tracks(limit)
    }
}

impl TrackLookup for Vec<Track> {
    fn track(&self, track_id: &str) -> sonority_core::Result<Option<Track>> {
        self.as_slice().track(track_id)
    }
}

impl<T: CatalogReader + ?Sized> CatalogReader for &T {
    fn all_tracks(&self, limit: usize) -> sonority_core::Result<Vec<Track>> {
        (**self).all_tracks(limit)
    }
}

impl<T: TrackLookup + ?Sized> TrackLookup for &T {
    fn track(&self, track_id: &str) -> sonority_core::Result<Option<Track>> {
        (**self).track(track_id)
    }
}
