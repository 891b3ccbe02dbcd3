use super::connection_state::AttachmentState;
use super::playback_state::PlaybackState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: PlaybackState,
    pub queue_ids: Vec<String>,
    pub current_index: Option<usize>,
    pub active_collection_id: Option<String>,
    pub attachment: AttachmentState,
    pub progress_running: bool,
    /// Recommendation requests issued since the session started.
    pub prefetch_requests: u64,
}
