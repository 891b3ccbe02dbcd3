use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use crate::dto::command::Command;
use crate::dto::session_response::SessionResponse;
use crate::two_way_channel::WeakTwoWaySender;

/// Periodically asks the session to refresh the playback position. Dropping the loop stops it.
#[derive(Debug)]
pub(crate) struct ProgressLoop {
    handle: JoinHandle<()>,
}

impl ProgressLoop {
    pub(crate) fn start(
        period: Duration,
        epoch: u64,
        mailbox: WeakTwoWaySender<Command, SessionResponse>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !mailbox.send_async(Command::ProgressTick { epoch }).await {
                    debug!("Session stopped, ending progress loop");
                    return;
                }
            }
        });
        Self { handle }
    }
}

impl Drop for ProgressLoop {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
