use async_trait::async_trait;

use crate::catalog_error::CatalogError;
use crate::dto::playlist::Playlist;
use crate::dto::track_record::TrackRecord;
use crate::urls;

/// The slice of the backend the playback session depends on.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    fn base_url(&self) -> &str;

    /// Recommended follow-ups for a track. Failures of any kind come back as an empty list.
    async fn get_recommendations(&self, track_id: &str) -> Vec<TrackRecord>;

    async fn get_playlist(&self, playlist_id: &str) -> Result<Playlist, CatalogError>;

    async fn search_songs(&self, query: &str) -> Result<Vec<TrackRecord>, CatalogError>;

    async fn get_playlists(&self) -> Result<Vec<Playlist>, CatalogError>;

    fn stream_url(&self, track_id: &str) -> Result<String, CatalogError> {
        urls::stream_url(self.base_url(), track_id)
    }
}
