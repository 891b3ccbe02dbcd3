mod color;
mod descriptor;
mod dto;
mod engine;
mod event_loop;
mod listener;
pub mod mock_engine;
mod prefetch;
mod progress;
mod queue;
mod session;
mod settings;
mod two_way_channel;

pub use color::{ArtworkFetcher, ColorError, HttpArtworkFetcher, dark_vibrant};
pub use descriptor::{DescriptorError, build_queue_item, build_queue_items};
pub use engine::{
    Engine, EngineError, EngineEvent, EngineHandle, EnginePhase, EngineSnapshot, TransitionReason,
};

pub mod mysound_session {
    use std::sync::Arc;

    use libmysound_catalog::CatalogClient;
    use thiserror::Error;
    use tokio::sync::{broadcast, watch};
    use tracing::error;

    use crate::color::ArtworkFetcher;
    pub use crate::dto::accent_color::AccentColor;
    use crate::dto::command::Command;
    pub use crate::dto::connection_state::{AttachmentState, ConnectionState};
    pub use crate::dto::playback_state::PlaybackState;
    pub use crate::dto::queue_item::{QueueItem, UNKNOWN_ARTIST};
    pub use crate::dto::session_event::SessionEvent;
    use crate::dto::session_response::SessionResponse;
    pub use crate::dto::session_status::SessionStatus;
    use crate::engine::EngineHandle;
    use crate::event_loop::main_loop;
    use crate::session::Session;
    pub use crate::settings::SessionSettings;
    use crate::two_way_channel::{TwoWaySender, two_way_channel};

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum SessionError {
        #[error("Session controller has stopped")]
        ControllerStopped,
    }

    /// Handle to the playback session. Clones share the same session; commands are queued and
    /// return immediately.
    #[derive(Debug, Clone)]
    pub struct SessionController {
        cmd_sender: TwoWaySender<Command, SessionResponse>,
        event_tx: broadcast::Sender<SessionEvent>,
        state_rx: watch::Receiver<PlaybackState>,
    }

    impl SessionController {
        /// Starts the session loop. Must be called from within a tokio runtime.
        pub fn new(
            catalog: Arc<dyn CatalogClient>,
            artwork: Arc<dyn ArtworkFetcher>,
            settings: SessionSettings,
        ) -> Self {
            let (event_tx, _) = broadcast::channel(64);
            let (state_tx, state_rx) = watch::channel(PlaybackState::default());
            let (cmd_tx, cmd_rx) = two_way_channel();

            let session = Session::new(
                catalog,
                artwork,
                settings,
                cmd_tx.downgrade(),
                state_tx,
                event_tx.clone(),
            );
            tokio::spawn(main_loop(cmd_rx, session));

            Self {
                cmd_sender: cmd_tx,
                event_tx,
                state_rx,
            }
        }

        fn send(&self, command: Command) -> Result<(), SessionError> {
            self.cmd_sender.send(command).map_err(|e| {
                error!("Error sending command {:?}", e.0.0);
                SessionError::ControllerStopped
            })
        }

        pub fn attach_engine(&self, engine: EngineHandle) -> Result<(), SessionError> {
            self.send(Command::AttachEngine(engine))
        }

        pub fn detach(&self) -> Result<(), SessionError> {
            self.send(Command::Detach)
        }

        pub fn play_track(&self, item: QueueItem) -> Result<(), SessionError> {
            self.send(Command::PlayTrack(item))
        }

        pub fn play_collection(
            &self,
            items: Vec<QueueItem>,
            start_index: usize,
            collection_id: impl Into<String>,
        ) -> Result<(), SessionError> {
            self.send(Command::PlayCollection {
                items,
                start_index,
                collection_id: collection_id.into(),
            })
        }

        pub fn play_playlist(
            &self,
            playlist_id: impl Into<String>,
            start_index: usize,
        ) -> Result<(), SessionError> {
            self.send(Command::PlayPlaylist {
                playlist_id: playlist_id.into(),
                start_index,
            })
        }

        pub fn toggle_play_pause(&self) -> Result<(), SessionError> {
            self.send(Command::TogglePlayPause)
        }

        pub fn skip_next(&self) -> Result<(), SessionError> {
            self.send(Command::SkipNext)
        }

        pub fn skip_previous(&self) -> Result<(), SessionError> {
            self.send(Command::SkipPrevious)
        }

        /// Out of range positions are clamped to the current track.
        pub fn seek(&self, position_ms: i64) -> Result<(), SessionError> {
            self.send(Command::Seek(position_ms))
        }

        pub fn state(&self) -> PlaybackState {
            self.state_rx.borrow().clone()
        }

        pub fn subscribe_state(&self) -> watch::Receiver<PlaybackState> {
            self.state_rx.clone()
        }

        pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
            self.event_tx.subscribe()
        }

        pub async fn get_current_status(&self) -> Result<SessionStatus, SessionError> {
            match self.cmd_sender.get_response(Command::GetCurrentStatus).await {
                Ok(SessionResponse::Status(status)) => Ok(status),
                Ok(response) => {
                    error!("Unexpected response to status request: {response:?}");
                    Err(SessionError::ControllerStopped)
                }
                Err(e) => {
                    error!("Error getting session status: {e}");
                    Err(SessionError::ControllerStopped)
                }
            }
        }

        /// Detaches from the engine and stops the session loop. Every handle stops working
        /// afterwards.
        pub async fn shutdown(&self) -> Result<(), SessionError> {
            self.cmd_sender
                .get_response(Command::Shutdown)
                .await
                .map(|_| ())
                .map_err(|e| {
                    error!("Error shutting down session: {e}");
                    SessionError::ControllerStopped
                })
        }
    }
}
