use tap::TapFallible;
use tracing::{error, info, trace};

use crate::dto::command::Command;
use crate::dto::session_response::SessionResponse;
use crate::session::{PlaylistTag, Session};
use crate::two_way_channel::TwoWayReceiver;

pub(crate) async fn main_loop(
    mut receiver: TwoWayReceiver<Command, SessionResponse>,
    mut session: Session,
) {
    while let Ok(next_command) = receiver.recv_async().await {
        trace!("Got command {next_command:?}");
        match next_command {
            Command::AttachEngine(engine) => {
                session.attach_engine(engine);
            }
            Command::Detach => {
                session.detach();
            }
            Command::PlayTrack(item) => {
                session.play_track(item);
            }
            Command::PlayCollection {
                items,
                start_index,
                collection_id,
            } => {
                session.play_collection(items, start_index, collection_id);
            }
            Command::PlayPlaylist {
                playlist_id,
                start_index,
            } => {
                session.play_playlist(playlist_id, start_index);
            }
            Command::TogglePlayPause => {
                session.toggle_play_pause();
            }
            Command::SkipNext => {
                session.skip_next();
            }
            Command::SkipPrevious => {
                session.skip_previous();
            }
            Command::Seek(position_ms) => {
                session.seek(position_ms);
            }
            Command::GetCurrentStatus => {
                let current_status = session.get_current_status();
                receiver
                    .respond(SessionResponse::Status(current_status))
                    .tap_err(|e| error!("Error sending session status: {e:?}"))
                    .ok();
            }
            Command::Shutdown => {
                session.shutdown();
                receiver
                    .respond(SessionResponse::Stopped)
                    .tap_err(|e| error!("Error acknowledging shutdown: {e:?}"))
                    .ok();
                info!("Session loop stopped");
                return;
            }
            Command::EngineConnected { generation, result } => {
                session.on_engine_connected(generation, result);
            }
            Command::Engine { generation, event } => {
                session.on_engine_event(generation, event);
            }
            Command::EngineLagged {
                generation,
                skipped,
            } => {
                session.on_engine_lagged(generation, skipped);
            }
            Command::ProgressTick { epoch } => {
                session.on_progress_tick(epoch);
            }
            Command::PrefetchCompleted {
                tag,
                trigger_id,
                recommendations,
            } => {
                session.on_prefetch_completed(tag, trigger_id, recommendations);
            }
            Command::PlaylistLoaded {
                generation,
                queue_generation,
                request,
                playlist_id,
                start_index,
                result,
            } => {
                session.on_playlist_loaded(
                    PlaylistTag {
                        generation,
                        queue_generation,
                        request,
                    },
                    playlist_id,
                    start_index,
                    result,
                );
            }
            Command::AccentExtracted { request, color } => {
                session.on_accent_extracted(request, color);
            }
        }
    }
    session.shutdown();
    info!("Session loop completed");
}
