use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Track id {0:?} is not a valid numeric identifier")]
    InvalidTrackIdentifier(String),
    #[error("Playlist id {0:?} is not a valid numeric identifier")]
    InvalidPlaylistIdentifier(String),
    #[error("Network failure: {0}")]
    NetworkFailure(String),
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },
    #[error("Error decoding response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("Error building http client: {0}")]
    ClientBuild(String),
}

impl From<reqwest_middleware::Error> for CatalogError {
    fn from(e: reqwest_middleware::Error) -> Self {
        Self::NetworkFailure(e.to_string())
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        Self::NetworkFailure(e.to_string())
    }
}
