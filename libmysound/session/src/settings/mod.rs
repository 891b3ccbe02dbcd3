use std::time::Duration;

use crate::dto::accent_color::AccentColor;

#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub progress_interval: Duration,
    pub prefetch_timeout: Duration,
    /// How close to the end of the queue playback gets before recommendations are fetched.
    pub tail_window: usize,
    pub neutral_accent: AccentColor,
    /// Artwork is downscaled to fit in a square of this size before picking a color.
    pub artwork_sample_size: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(500),
            prefetch_timeout: Duration::from_secs(10),
            tail_window: 2,
            neutral_accent: AccentColor::NEUTRAL,
            artwork_sample_size: 64,
        }
    }
}
