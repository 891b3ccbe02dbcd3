use strum::Display;

use super::accent_color::AccentColor;

#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum SessionEvent {
    Attached,
    AttachFailed(String),
    Detached,
    ConnectionLost,
    QueueReplaced {
        ids: Vec<String>,
        collection_id: Option<String>,
    },
    QueueExtended {
        trigger_id: String,
        appended_ids: Vec<String>,
    },
    PrefetchSkipped {
        trigger_id: String,
    },
    QueueEnded,
    TrackChanged {
        index: usize,
        item_id: String,
    },
    AccentColorChanged(AccentColor),
}
