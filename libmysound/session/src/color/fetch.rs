use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;

use super::ColorError;

#[async_trait]
pub trait ArtworkFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ColorError>;
}

/// Downloads artwork through the same authenticated client the catalog uses.
#[derive(Clone, Debug)]
pub struct HttpArtworkFetcher {
    client: ClientWithMiddleware,
}

impl HttpArtworkFetcher {
    pub fn new(client: ClientWithMiddleware) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtworkFetcher for HttpArtworkFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ColorError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ColorError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ColorError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ColorError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
