use std::sync::Arc;

use libmysound_catalog::{CatalogClient, CatalogError, Playlist, TrackRecord};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::color::{ArtworkFetcher, ExtractionRequest, spawn_extraction};
use crate::descriptor::build_queue_items;
use crate::dto::accent_color::AccentColor;
use crate::dto::command::Command;
use crate::dto::connection_state::{AttachmentState, ConnectionState};
use crate::dto::playback_state::PlaybackState;
use crate::dto::queue_item::QueueItem;
use crate::dto::session_event::SessionEvent;
use crate::dto::session_response::SessionResponse;
use crate::dto::session_status::SessionStatus;
use crate::engine::{
    EngineError, EngineEvent, EngineHandle, EnginePhase, TransitionReason, same_engine,
};
use crate::listener::spawn_listener;
use crate::prefetch::{PrefetchTag, PrefetchTracker, plan_append, spawn_prefetch};
use crate::progress::ProgressLoop;
use crate::queue::PlaybackQueue;
use crate::settings::SessionSettings;
use crate::two_way_channel::WeakTwoWaySender;

struct EngineBinding {
    engine: EngineHandle,
    generation: u64,
    connected: bool,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl EngineBinding {
    fn release(self) {
        self.cancel.cancel();
        for task in self.tasks {
            task.abort();
        }
    }
}

/// Identifies the play intent a playlist load was issued for.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlaylistTag {
    pub(crate) generation: u64,
    pub(crate) queue_generation: u64,
    pub(crate) request: u64,
}

#[derive(Default)]
struct AccentTracker {
    request: u64,
    artwork_url: Option<String>,
    task: Option<JoinHandle<()>>,
}

impl AccentTracker {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.request += 1;
        self.artwork_url = None;
    }
}

fn run(action: &str, result: Result<(), EngineError>) {
    if let Err(e) = result {
        debug!("Engine ignored {action}: {e}");
    }
}

// An unknown duration is reported as zero and doesn't bound anything
fn bound_position(position_ms: u64, duration_ms: u64) -> u64 {
    if duration_ms > 0 {
        position_ms.min(duration_ms)
    } else {
        position_ms
    }
}

fn clamp_position(position_ms: i64, duration_ms: u64) -> u64 {
    bound_position(position_ms.max(0) as u64, duration_ms)
}

/// Owns the queue and the published playback state. Only the session loop touches it, so every
/// mutation is applied in mailbox order.
pub(crate) struct Session {
    catalog: Arc<dyn CatalogClient>,
    artwork: Arc<dyn ArtworkFetcher>,
    settings: SessionSettings,
    mailbox: WeakTwoWaySender<Command, SessionResponse>,
    state_tx: watch::Sender<PlaybackState>,
    event_tx: broadcast::Sender<SessionEvent>,
    state: PlaybackState,
    queue: PlaybackQueue,
    binding: Option<EngineBinding>,
    generation: u64,
    queue_generation: u64,
    playlist_request: u64,
    progress: Option<ProgressLoop>,
    progress_epoch: u64,
    prefetch: PrefetchTracker,
    accent: AccentTracker,
}

impl Session {
    pub(crate) fn new(
        catalog: Arc<dyn CatalogClient>,
        artwork: Arc<dyn ArtworkFetcher>,
        settings: SessionSettings,
        mailbox: WeakTwoWaySender<Command, SessionResponse>,
        state_tx: watch::Sender<PlaybackState>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        let state = PlaybackState {
            accent_color: settings.neutral_accent,
            ..Default::default()
        };
        state_tx.send_replace(state.clone());
        Self {
            catalog,
            artwork,
            settings,
            mailbox,
            state_tx,
            event_tx,
            state,
            queue: PlaybackQueue::default(),
            binding: None,
            generation: 0,
            queue_generation: 0,
            playlist_request: 0,
            progress: None,
            progress_epoch: 0,
            prefetch: PrefetchTracker::default(),
            accent: AccentTracker::default(),
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }

    fn notify(&self, event: SessionEvent) {
        self.event_tx.send(event).unwrap_or_default();
    }

    fn attached_engine(&self, action: &str) -> Option<EngineHandle> {
        match &self.binding {
            Some(binding) if binding.connected => Some(binding.engine.clone()),
            _ => {
                debug!("Ignoring {action}, no engine attached");
                None
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| b.connected && b.generation == generation)
    }

    pub(crate) fn attach_engine(&mut self, engine: EngineHandle) {
        if let Some(binding) = &self.binding
            && same_engine(&binding.engine, &engine)
        {
            debug!("Engine is already attached");
            return;
        }
        if self.binding.is_some() {
            info!("Replacing attached engine");
            self.detach();
        }

        self.generation += 1;
        let generation = self.generation;
        let connect_engine = engine.clone();
        let mailbox = self.mailbox.clone();
        let connect_task = tokio::spawn(async move {
            let result = connect_engine.connect().await;
            mailbox
                .send_async(Command::EngineConnected { generation, result })
                .await;
        });

        self.binding = Some(EngineBinding {
            engine,
            generation,
            connected: false,
            cancel: CancellationToken::new(),
            tasks: vec![connect_task],
        });
        info!("Connecting to engine");
        self.state.connection_state = ConnectionState::Connecting;
        self.publish();
    }

    pub(crate) fn on_engine_connected(&mut self, generation: u64, result: Result<(), EngineError>) {
        let Some(binding) = self
            .binding
            .as_mut()
            .filter(|b| b.generation == generation && !b.connected)
        else {
            debug!("Ignoring stale connection result for generation {generation}");
            return;
        };

        match result {
            Ok(()) => {
                let receiver = binding.engine.subscribe();
                binding.tasks.push(spawn_listener(
                    receiver,
                    generation,
                    binding.cancel.clone(),
                    self.mailbox.clone(),
                ));
                binding.connected = true;
                info!("Engine attached");
                self.state.connection_state = ConnectionState::Connected;
                self.resync();
                self.notify(SessionEvent::Attached);
            }
            Err(e) => {
                warn!("Error connecting to engine: {e}");
                if let Some(binding) = self.binding.take() {
                    binding.release();
                }
                self.state.connection_state = ConnectionState::Disconnected;
                self.publish();
                self.notify(SessionEvent::AttachFailed(e.to_string()));
            }
        }
    }

    pub(crate) fn detach(&mut self) {
        if self.release_binding() {
            info!("Engine detached");
            self.notify(SessionEvent::Detached);
        } else {
            debug!("No engine to detach");
        }
    }

    fn on_connection_lost(&mut self) {
        if self.release_binding() {
            warn!("Lost connection to engine");
            self.state.is_playing = false;
            self.publish();
            self.notify(SessionEvent::ConnectionLost);
        }
    }

    fn release_binding(&mut self) -> bool {
        let Some(binding) = self.binding.take() else {
            return false;
        };
        binding.release();
        self.progress = None;
        self.prefetch.cancel_in_flight();
        self.accent.cancel();
        self.state.connection_state = ConnectionState::Disconnected;
        self.publish();
        true
    }

    /// Rebuilds everything from the engine's own view. The engine may have been playing before
    /// this session attached to it.
    fn resync(&mut self) {
        let Some(engine) = self.attached_engine("resync") else {
            return;
        };
        let snapshot = engine.snapshot();
        self.queue
            .sync_timeline(snapshot.timeline, snapshot.current_index);
        self.state.is_playing = snapshot.is_playing;
        self.state.duration_ms = snapshot.duration_ms;
        self.state.position_ms = bound_position(snapshot.position_ms, snapshot.duration_ms);
        self.state.current_item = self.queue.current().cloned();
        info!(
            "Synchronized {} items from engine, playing: {}",
            self.queue.len(),
            self.state.is_playing
        );
        self.refresh_accent();
        self.update_progress();
        self.publish();
    }

    fn refresh_position(&mut self) {
        let Some(engine) = self.attached_engine("position refresh") else {
            return;
        };
        let snapshot = engine.snapshot();
        self.state.duration_ms = snapshot.duration_ms;
        self.state.position_ms = bound_position(snapshot.position_ms, snapshot.duration_ms);
    }

    fn replace_queue(
        &mut self,
        items: Vec<QueueItem>,
        start_index: usize,
        collection_id: Option<String>,
    ) -> Option<usize> {
        self.queue_generation += 1;
        self.prefetch.reset();
        let start = self
            .queue
            .replace(items, start_index, collection_id.clone());
        self.state.current_item = self.queue.current().cloned();
        self.state.position_ms = 0;
        self.state.duration_ms = 0;
        if start.is_none() {
            self.state.is_playing = false;
            self.update_progress();
        }
        self.refresh_accent();
        self.publish();
        self.notify(SessionEvent::QueueReplaced {
            ids: self.queue.ids(),
            collection_id,
        });
        start
    }

    pub(crate) fn play_track(&mut self, item: QueueItem) {
        let Some(engine) = self.attached_engine("play track") else {
            return;
        };
        info!("Playing track {}", item.id());
        let trigger_id = item.id().to_owned();
        self.replace_queue(vec![item.clone()], 0, None);
        run("set items", engine.set_items(vec![item], 0));
        run("prepare", engine.prepare());
        run("play", engine.play());
        self.request_prefetch(trigger_id, false);
    }

    pub(crate) fn play_collection(
        &mut self,
        items: Vec<QueueItem>,
        start_index: usize,
        collection_id: String,
    ) {
        let Some(engine) = self.attached_engine("play collection") else {
            return;
        };
        if items.is_empty() {
            info!("Collection {collection_id} is empty, clearing queue");
            self.replace_queue(vec![], 0, Some(collection_id));
            run("clear", engine.clear());
            return;
        }
        if start_index >= items.len() {
            warn!(
                "Start index {start_index} is out of range for {} items, clamping",
                items.len()
            );
        }

        info!(
            "Playing collection {collection_id} with {} items from {start_index}",
            items.len()
        );
        let start = self
            .replace_queue(items.clone(), start_index, Some(collection_id))
            .unwrap_or_default();
        run("set items", engine.set_items(items, start));
        run("prepare", engine.prepare());
        run("play", engine.play());
    }

    pub(crate) fn play_playlist(&mut self, playlist_id: String, start_index: usize) {
        let Some(generation) = self
            .binding
            .as_ref()
            .filter(|b| b.connected)
            .map(|b| b.generation)
        else {
            debug!("Ignoring play playlist, no engine attached");
            return;
        };

        self.playlist_request += 1;
        let tag = PlaylistTag {
            generation,
            queue_generation: self.queue_generation,
            request: self.playlist_request,
        };
        info!("Loading playlist {playlist_id}");
        let catalog = self.catalog.clone();
        let mailbox = self.mailbox.clone();
        tokio::spawn(async move {
            let result = catalog.get_playlist(&playlist_id).await;
            mailbox
                .send_async(Command::PlaylistLoaded {
                    generation: tag.generation,
                    queue_generation: tag.queue_generation,
                    request: tag.request,
                    playlist_id,
                    start_index,
                    result,
                })
                .await;
        });
    }

    pub(crate) fn on_playlist_loaded(
        &mut self,
        tag: PlaylistTag,
        playlist_id: String,
        start_index: usize,
        result: Result<Playlist, CatalogError>,
    ) {
        if !self.is_current(tag.generation) {
            debug!("Ignoring playlist {playlist_id} loaded for a previous engine");
            return;
        }
        // Any play intent issued after this load wins over it
        if tag.request != self.playlist_request || tag.queue_generation != self.queue_generation {
            debug!("Ignoring playlist {playlist_id}, a newer play request replaced it");
            return;
        }
        match result {
            Ok(playlist) => {
                let items = build_queue_items(&playlist.songs, self.catalog.base_url());
                self.play_collection(items, start_index, playlist_id);
            }
            Err(e) => warn!("Error loading playlist {playlist_id}: {e}"),
        }
    }

    pub(crate) fn toggle_play_pause(&mut self) {
        let Some(engine) = self.attached_engine("toggle") else {
            return;
        };
        let snapshot = engine.snapshot();
        if snapshot.phase == EnginePhase::Idle {
            run("prepare", engine.prepare());
        }
        if snapshot.is_playing {
            run("pause", engine.pause());
        } else {
            run("play", engine.play());
        }
    }

    pub(crate) fn skip_next(&mut self) {
        if let Some(engine) = self.attached_engine("skip next") {
            run("skip next", engine.skip_next());
        }
    }

    pub(crate) fn skip_previous(&mut self) {
        if let Some(engine) = self.attached_engine("skip previous") {
            run("skip previous", engine.skip_previous());
        }
    }

    pub(crate) fn seek(&mut self, position_ms: i64) {
        let Some(engine) = self.attached_engine("seek") else {
            return;
        };
        let duration_ms = engine.snapshot().duration_ms;
        let target = clamp_position(position_ms, duration_ms);
        debug!("Seeking to {target} (requested {position_ms})");
        run("seek", engine.seek(target));
        self.state.duration_ms = duration_ms;
        self.state.position_ms = target;
        self.publish();
    }

    pub(crate) fn on_engine_event(&mut self, generation: u64, event: EngineEvent) {
        if !self.is_current(generation) {
            debug!("Ignoring {event} from a previous engine");
            return;
        }
        match event {
            EngineEvent::MetadataChanged(item) => {
                self.state.current_item = item;
                self.refresh_accent();
                self.publish();
            }
            EngineEvent::IsPlayingChanged(is_playing) => {
                self.state.is_playing = is_playing;
                self.refresh_position();
                self.update_progress();
                self.publish();
            }
            EngineEvent::TimelineChanged => {
                if let Some(engine) = self.attached_engine("timeline sync") {
                    let snapshot = engine.snapshot();
                    self.queue
                        .sync_timeline(snapshot.timeline, snapshot.current_index);
                    self.state.current_item = self.queue.current().cloned();
                    self.publish();
                }
            }
            EngineEvent::ItemTransition { index, reason } => {
                self.on_item_transition(index, reason);
            }
            EngineEvent::PlaybackStateChanged(phase) => {
                self.on_phase_changed(phase);
            }
            EngineEvent::Disconnected => {
                self.on_connection_lost();
            }
        }
    }

    pub(crate) fn on_engine_lagged(&mut self, generation: u64, skipped: u64) {
        if self.is_current(generation) {
            warn!("Missed {skipped} engine events, resynchronizing");
            self.resync();
        }
    }

    fn on_item_transition(&mut self, index: usize, reason: TransitionReason) {
        if !self.queue.set_current(index) {
            // The mirror is behind the engine
            self.resync();
        }
        self.state.current_item = self.queue.current().cloned();
        self.refresh_position();
        self.refresh_accent();
        self.publish();

        let Some(item_id) = self.queue.current().map(|i| i.id().to_owned()) else {
            return;
        };
        debug!("Moved to item {index} ({item_id}) because of {reason}");
        self.notify(SessionEvent::TrackChanged {
            index,
            item_id: item_id.clone(),
        });

        // Loading a new queue isn't progress through it
        if reason != TransitionReason::QueueChanged
            && self.queue.in_tail_window(index, self.settings.tail_window)
        {
            self.request_prefetch(item_id, false);
        }
    }

    fn on_phase_changed(&mut self, phase: EnginePhase) {
        debug!("Engine phase changed to {phase}");
        if phase != EnginePhase::Ended {
            self.refresh_position();
            self.publish();
            return;
        }
        if self.queue.has_next() {
            return;
        }
        match self.queue.current().map(|i| i.id().to_owned()) {
            Some(trigger_id) => {
                info!("Reached the end of the queue on {trigger_id}, fetching more");
                self.request_prefetch(trigger_id, true);
            }
            None => self.finish_queue(),
        }
    }

    fn finish_queue(&mut self) {
        info!("Queue ended");
        self.state.is_playing = false;
        self.update_progress();
        self.publish();
        self.notify(SessionEvent::QueueEnded);
    }

    fn request_prefetch(&mut self, trigger_id: String, terminal: bool) {
        let Some(binding) = self.binding.as_ref().filter(|b| b.connected) else {
            return;
        };
        if !self.prefetch.begin(&trigger_id, terminal) {
            if terminal {
                debug!("Prefetch for {trigger_id} is in flight, continuing once it completes");
            } else {
                debug!("Prefetch for {trigger_id} was already requested");
            }
            return;
        }

        info!("Requesting recommendations for {trigger_id}");
        spawn_prefetch(
            self.catalog.clone(),
            trigger_id,
            self.settings.prefetch_timeout,
            PrefetchTag {
                generation: binding.generation,
                queue_generation: self.queue_generation,
                terminal,
            },
            binding.cancel.clone(),
            self.mailbox.clone(),
        );
    }

    pub(crate) fn on_prefetch_completed(
        &mut self,
        tag: PrefetchTag,
        trigger_id: String,
        recommendations: Vec<TrackRecord>,
    ) {
        if !self.is_current(tag.generation) {
            debug!("Discarding recommendations for {trigger_id} from a previous engine");
            return;
        }
        if tag.queue_generation != self.queue_generation {
            debug!("Discarding recommendations for {trigger_id}, the queue was replaced");
            return;
        }
        let continue_playback = self.prefetch.finish(&trigger_id) || tag.terminal;
        let Some(engine) = self.attached_engine("append") else {
            return;
        };

        // Diff against the live timeline and append in one step
        let live_ids = engine.snapshot().timeline_ids();
        let items = plan_append(&live_ids, &recommendations, self.catalog.base_url());
        if items.is_empty() {
            info!("Nothing new to append for {trigger_id}");
            self.notify(SessionEvent::PrefetchSkipped { trigger_id });
        } else {
            let appended_ids: Vec<String> = items.iter().map(|i| i.id().to_owned()).collect();
            info!("Appending {appended_ids:?} after {trigger_id}");
            run("add items", engine.add_items(items.clone()));
            self.queue.append(items);
            self.notify(SessionEvent::QueueExtended {
                trigger_id,
                appended_ids,
            });
        }

        if continue_playback {
            self.continue_after_end(&engine);
        }
    }

    fn continue_after_end(&mut self, engine: &EngineHandle) {
        match self.queue.current_index() {
            Some(index) if self.queue.has_next() => {
                info!("Continuing playback from item {}", index + 1);
                run("seek to index", engine.seek_to_index(index + 1, 0));
                run("play", engine.play());
            }
            _ => self.finish_queue(),
        }
    }

    fn update_progress(&mut self) {
        let should_run = self.state.is_playing && self.binding.as_ref().is_some_and(|b| b.connected);
        match (should_run, self.progress.is_some()) {
            (true, false) => {
                self.progress_epoch += 1;
                debug!("Starting progress loop {}", self.progress_epoch);
                self.progress = Some(ProgressLoop::start(
                    self.settings.progress_interval,
                    self.progress_epoch,
                    self.mailbox.clone(),
                ));
            }
            (false, true) => {
                debug!("Stopping progress loop {}", self.progress_epoch);
                self.progress = None;
            }
            _ => {}
        }
    }

    pub(crate) fn on_progress_tick(&mut self, epoch: u64) {
        if self.progress.is_none() || epoch != self.progress_epoch {
            return;
        }
        self.refresh_position();
        self.publish();
    }

    fn refresh_accent(&mut self) {
        let artwork_url = self
            .state
            .current_item
            .as_ref()
            .and_then(|i| i.artwork_url())
            .map(|u| u.to_owned());

        match artwork_url {
            Some(url) if self.accent.artwork_url.as_ref() != Some(&url) => {
                self.accent.cancel();
                self.accent.artwork_url = Some(url.clone());
                let extraction = ExtractionRequest {
                    request: self.accent.request,
                    sample_size: self.settings.artwork_sample_size,
                    fallback: self.settings.neutral_accent,
                };
                self.accent.task = Some(spawn_extraction(
                    self.artwork.clone(),
                    url,
                    extraction,
                    self.mailbox.clone(),
                ));
            }
            Some(_) => {}
            None => {
                if self.accent.artwork_url.is_some() || self.accent.task.is_some() {
                    self.accent.cancel();
                }
                self.set_accent(self.settings.neutral_accent);
            }
        }
    }

    pub(crate) fn on_accent_extracted(&mut self, request: u64, color: AccentColor) {
        if request != self.accent.request {
            debug!("Discarding stale accent color {color}");
            return;
        }
        self.accent.task = None;
        self.set_accent(color);
    }

    fn set_accent(&mut self, color: AccentColor) {
        if self.state.accent_color != color {
            self.state.accent_color = color;
            self.publish();
            self.notify(SessionEvent::AccentColorChanged(color));
        }
    }

    pub(crate) fn get_current_status(&self) -> SessionStatus {
        let attachment = match &self.binding {
            None => AttachmentState::Unattached,
            Some(binding) if binding.connected => AttachmentState::Attached,
            Some(_) => AttachmentState::Connecting,
        };
        SessionStatus {
            state: self.state.clone(),
            queue_ids: self.queue.ids(),
            current_index: self.queue.current_index(),
            active_collection_id: self.queue.active_collection_id().map(|c| c.to_owned()),
            attachment,
            progress_running: self.progress.is_some(),
            prefetch_requests: self.prefetch.requests(),
        }
    }

    pub(crate) fn shutdown(&mut self) {
        self.detach();
        self.accent.cancel();
        info!("Session shut down");
    }
}
