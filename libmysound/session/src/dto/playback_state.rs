use super::accent_color::AccentColor;
use super::connection_state::ConnectionState;
use super::queue_item::QueueItem;

/// Snapshot of what the UI should render. Rebuilt by the session on every engine event and
/// progress tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_item: Option<QueueItem>,
    pub position_ms: u64,
    /// Zero while the engine doesn't know the duration yet.
    pub duration_ms: u64,
    pub accent_color: AccentColor,
    pub connection_state: ConnectionState,
}
