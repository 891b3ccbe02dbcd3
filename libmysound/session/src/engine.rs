use std::sync::Arc;

use async_trait::async_trait;
use strum::Display;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::dto::queue_item::QueueItem;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum EnginePhase {
    #[default]
    Idle,
    Buffering,
    Ready,
    Ended,
}

/// Why the engine moved to a different item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum TransitionReason {
    /// The previous item finished and playback advanced on its own.
    Auto,
    /// A seek or skip landed on a different item.
    Seek,
    /// The item list was replaced.
    QueueChanged,
}

#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum EngineEvent {
    MetadataChanged(Option<QueueItem>),
    IsPlayingChanged(bool),
    TimelineChanged,
    ItemTransition {
        index: usize,
        reason: TransitionReason,
    },
    PlaybackStateChanged(EnginePhase),
    Disconnected,
}

/// The engine's own view of playback, read synchronously.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub timeline: Vec<QueueItem>,
    pub current_index: Option<usize>,
    pub is_playing: bool,
    pub phase: EnginePhase,
    pub position_ms: u64,
    pub duration_ms: u64,
}

impl EngineSnapshot {
    pub fn timeline_ids(&self) -> Vec<String> {
        self.timeline.iter().map(|i| i.id().to_owned()).collect()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Failed to connect to engine: {0}")]
    ConnectionFailed(String),
    #[error("Engine is unavailable")]
    Unavailable,
}

/// Capability surface of the platform media engine. Commands are fire-and-forget; their effects
/// are reported back through [`Engine::subscribe`].
#[async_trait]
pub trait Engine: Send + Sync {
    async fn connect(&self) -> Result<(), EngineError>;
    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;
    fn snapshot(&self) -> EngineSnapshot;

    /// Replaces the item list and positions the engine on `start_index`.
    fn set_items(&self, items: Vec<QueueItem>, start_index: usize) -> Result<(), EngineError>;
    fn add_items(&self, items: Vec<QueueItem>) -> Result<(), EngineError>;
    fn clear(&self) -> Result<(), EngineError>;
    fn seek_to_index(&self, index: usize, position_ms: u64) -> Result<(), EngineError>;
    fn prepare(&self) -> Result<(), EngineError>;
    fn play(&self) -> Result<(), EngineError>;
    fn pause(&self) -> Result<(), EngineError>;
    fn seek(&self, position_ms: u64) -> Result<(), EngineError>;
    fn skip_next(&self) -> Result<(), EngineError>;
    fn skip_previous(&self) -> Result<(), EngineError>;
}

pub type EngineHandle = Arc<dyn Engine>;

pub(crate) fn same_engine(a: &EngineHandle, b: &EngineHandle) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
