use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::dto::command::Command;
use crate::dto::session_response::SessionResponse;
use crate::engine::EngineEvent;
use crate::two_way_channel::WeakTwoWaySender;

/// Forwards engine events into the session mailbox, tagged with the binding generation they
/// belong to.
pub(crate) fn spawn_listener(
    mut receiver: broadcast::Receiver<EngineEvent>,
    generation: u64,
    cancel: CancellationToken,
    mailbox: WeakTwoWaySender<Command, SessionResponse>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let command = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Engine listener {generation} cancelled");
                    return;
                }
                event = receiver.recv() => match event {
                    Ok(event) => Command::Engine { generation, event },
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Engine listener fell behind by {skipped} events");
                        Command::EngineLagged { generation, skipped }
                    }
                    Err(RecvError::Closed) => {
                        info!("Engine event stream closed");
                        Command::Engine { generation, event: EngineEvent::Disconnected }
                    }
                }
            };

            let disconnected = matches!(
                command,
                Command::Engine {
                    event: EngineEvent::Disconnected,
                    ..
                }
            );
            if !mailbox.send_async(command).await || disconnected {
                return;
            }
        }
    })
}
