use derivative::Derivative;
use libmysound_catalog::{CatalogError, Playlist, TrackRecord};

use super::accent_color::AccentColor;
use super::queue_item::QueueItem;
use crate::engine::{EngineError, EngineEvent, EngineHandle};
use crate::prefetch::PrefetchTag;

#[derive(Derivative)]
#[derivative(Debug)]
pub(crate) enum Command {
    AttachEngine(#[derivative(Debug = "ignore")] EngineHandle),
    Detach,
    PlayTrack(QueueItem),
    PlayCollection {
        items: Vec<QueueItem>,
        start_index: usize,
        collection_id: String,
    },
    PlayPlaylist {
        playlist_id: String,
        start_index: usize,
    },
    TogglePlayPause,
    SkipNext,
    SkipPrevious,
    Seek(i64),
    GetCurrentStatus,
    Shutdown,

    // Sent by background tasks
    EngineConnected {
        generation: u64,
        result: Result<(), EngineError>,
    },
    Engine {
        generation: u64,
        event: EngineEvent,
    },
    EngineLagged {
        generation: u64,
        skipped: u64,
    },
    ProgressTick {
        epoch: u64,
    },
    PrefetchCompleted {
        tag: PrefetchTag,
        trigger_id: String,
        recommendations: Vec<TrackRecord>,
    },
    PlaylistLoaded {
        generation: u64,
        queue_generation: u64,
        request: u64,
        playlist_id: String,
        start_index: usize,
        result: Result<Playlist, CatalogError>,
    },
    AccentExtracted {
        request: u64,
        color: AccentColor,
    },
}
