use libmysound_catalog::TrackRecord;
use libmysound_catalog::urls::{resolve_artwork_url, stream_url};
use tap::TapFallible;
use thiserror::Error;
use tracing::warn;

use crate::dto::queue_item::QueueItem;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Track id {0:?} is not a valid numeric identifier")]
    InvalidTrackIdentifier(String),
}

/// Maps a catalog record to a playable queue item. Pure, no I/O.
pub fn build_queue_item(record: &TrackRecord, base_url: &str) -> Result<QueueItem, DescriptorError> {
    let stream_url = stream_url(base_url, &record.id)
        .map_err(|_| DescriptorError::InvalidTrackIdentifier(record.id.clone()))?;

    Ok(QueueItem::new(
        record.id.clone(),
        record.title.clone(),
        record.artist_names(),
        resolve_artwork_url(base_url, record.image_url.as_deref()),
        stream_url,
    ))
}

/// Builds every record it can. Records that can't be streamed are dropped.
pub fn build_queue_items(records: &[TrackRecord], base_url: &str) -> Vec<QueueItem> {
    records
        .iter()
        .filter_map(|record| {
            build_queue_item(record, base_url)
                .tap_err(|e| warn!("Dropping track: {e}"))
                .ok()
        })
        .collect()
}

#[cfg(test)]
#[path = "./descriptor_test.rs"]
mod descriptor_test;
