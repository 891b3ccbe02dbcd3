use std::hash::{Hash, Hasher};

/// Placeholder for tracks that came back without any artists.
pub const UNKNOWN_ARTIST: &str = "Unknown artist";

/// A playable entry in the session queue. Two items are the same item if their ids match,
/// regardless of display fields.
#[derive(Clone, Debug)]
pub struct QueueItem {
    id: String,
    title: String,
    artist: String,
    artwork_url: Option<String>,
    stream_url: String,
}

impl QueueItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        artwork_url: Option<String>,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            artwork_url,
            stream_url: stream_url.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn artist_or_unknown(&self) -> &str {
        if self.artist.is_empty() {
            UNKNOWN_ARTIST
        } else {
            &self.artist
        }
    }

    pub fn artwork_url(&self) -> Option<&str> {
        self.artwork_url.as_deref()
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for QueueItem {}

impl Hash for QueueItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
