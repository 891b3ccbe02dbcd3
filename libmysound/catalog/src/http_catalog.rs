use std::sync::Arc;

use async_trait::async_trait;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::auth::build_client;
use crate::catalog_client::CatalogClient;
use crate::catalog_error::CatalogError;
use crate::credentials::CredentialStore;
use crate::dto::playlist::Playlist;
use crate::dto::track_record::TrackRecord;
use crate::settings::CatalogSettings;
use crate::urls::endpoint;

#[derive(Clone, Debug)]
pub struct HttpCatalogClient {
    client: ClientWithMiddleware,
    settings: CatalogSettings,
}

impl HttpCatalogClient {
    pub fn new(
        settings: CatalogSettings,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, CatalogError> {
        let client = build_client(&settings, credentials)?;
        Ok(Self { client, settings })
    }

    /// The authenticated client, shared with other consumers such as artwork downloads.
    pub fn client(&self) -> ClientWithMiddleware {
        self.client.clone()
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        request: RequestBuilder,
    ) -> Result<T, CatalogError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| CatalogError::Decode {
            url,
            reason: e.to_string(),
        })
    }

    async fn try_get_recommendations(
        &self,
        track_id: &str,
    ) -> Result<Vec<TrackRecord>, CatalogError> {
        let url = endpoint(
            &self.settings.base_url,
            &format!("api/songs/recommendations/{track_id}"),
        );
        self.get_json(url.clone(), self.client.get(&url)).await
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    async fn get_recommendations(&self, track_id: &str) -> Vec<TrackRecord> {
        match self.try_get_recommendations(track_id).await {
            Ok(recommendations) => {
                info!(
                    "Got {} recommendations for track {track_id}",
                    recommendations.len()
                );
                recommendations
            }
            Err(e) => {
                warn!("Error getting recommendations for track {track_id}: {e:?}");
                vec![]
            }
        }
    }

    async fn get_playlist(&self, playlist_id: &str) -> Result<Playlist, CatalogError> {
        let id = playlist_id
            .parse::<u64>()
            .map_err(|_| CatalogError::InvalidPlaylistIdentifier(playlist_id.to_owned()))?;
        let url = endpoint(&self.settings.base_url, &format!("api/playlists/{id}"));
        self.get_json(url.clone(), self.client.get(&url)).await
    }

    async fn search_songs(&self, query: &str) -> Result<Vec<TrackRecord>, CatalogError> {
        let url = endpoint(&self.settings.base_url, "api/songs/search");
        self.get_json(url.clone(), self.client.get(&url).query(&[("query", query)]))
            .await
    }

    async fn get_playlists(&self) -> Result<Vec<Playlist>, CatalogError> {
        let url = endpoint(&self.settings.base_url, "api/playlists");
        self.get_json(url.clone(), self.client.get(&url)).await
    }
}
