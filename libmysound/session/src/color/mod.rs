mod extract;
mod fetch;

pub use extract::dark_vibrant;
pub(crate) use extract::accent_from_bytes;
pub use fetch::{ArtworkFetcher, HttpArtworkFetcher};

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dto::accent_color::AccentColor;
use crate::dto::command::Command;
use crate::dto::session_response::SessionResponse;
use crate::two_way_channel::WeakTwoWaySender;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("Error fetching artwork: {0}")]
    Fetch(String),
    #[error("Artwork request to {url} failed with status {status}")]
    Status { url: String, status: u16 },
    #[error("Error decoding artwork: {0}")]
    Decode(String),
    #[error("Artwork decode task failed: {0}")]
    Task(String),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ExtractionRequest {
    pub(crate) request: u64,
    pub(crate) sample_size: u32,
    pub(crate) fallback: AccentColor,
}

/// Resolves the accent color for `url` in the background and reports it back tagged with the
/// request token. Every failure resolves to the fallback color.
pub(crate) fn spawn_extraction(
    fetcher: Arc<dyn ArtworkFetcher>,
    url: String,
    extraction: ExtractionRequest,
    mailbox: WeakTwoWaySender<Command, SessionResponse>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let color = match extract_accent(fetcher.as_ref(), &url, extraction.sample_size).await {
            Ok(Some(color)) => {
                info!("Extracted accent color {color} from {url}");
                color
            }
            Ok(None) => {
                debug!("No vibrant color found in {url}");
                extraction.fallback
            }
            Err(e) => {
                warn!("Error extracting accent color from {url}: {e}");
                extraction.fallback
            }
        };

        mailbox
            .send_async(Command::AccentExtracted {
                request: extraction.request,
                color,
            })
            .await;
    })
}

async fn extract_accent(
    fetcher: &dyn ArtworkFetcher,
    url: &str,
    sample_size: u32,
) -> Result<Option<AccentColor>, ColorError> {
    let bytes = fetcher.fetch(url).await?;
    // Decoding large artwork is CPU-bound
    tokio::task::spawn_blocking(move || accent_from_bytes(&bytes, sample_size))
        .await
        .map_err(|e| ColorError::Task(e.to_string()))?
}

#[cfg(test)]
#[path = "./color_test.rs"]
mod color_test;
