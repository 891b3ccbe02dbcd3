use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::dto::queue_item::QueueItem;
use crate::engine::{
    Engine, EngineError, EngineEvent, EnginePhase, EngineSnapshot, TransitionReason,
};

pub const DEFAULT_DURATION_MS: u64 = 200_000;

/// Every command the mock received, in order. Items are recorded by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineCommand {
    SetItems(Vec<String>, usize),
    AddItems(Vec<String>),
    Clear,
    SeekToIndex(usize, u64),
    Prepare,
    Play,
    Pause,
    Seek(u64),
    SkipNext,
    SkipPrevious,
}

#[derive(Debug, Default)]
struct MockState {
    snapshot: EngineSnapshot,
    commands: Vec<EngineCommand>,
    fail_connect: bool,
    disconnected: bool,
}

/// In-memory engine that behaves like a simple playlist player and reports through the same event
/// stream a platform engine would.
#[derive(Debug)]
pub struct MockEngine {
    state: Mutex<MockState>,
    event_tx: broadcast::Sender<EngineEvent>,
}

impl Default for MockEngine {
    fn default() -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(MockState::default()),
            event_tx,
        }
    }
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose `connect` always fails.
    pub fn failing() -> Self {
        let engine = Self::default();
        engine.lock().fail_connect = true;
        engine
    }

    /// An engine that was already playing before anyone attached to it.
    pub fn playing(items: Vec<QueueItem>, current_index: usize, position_ms: u64) -> Self {
        let engine = Self::default();
        {
            let mut state = engine.lock();
            state.snapshot = EngineSnapshot {
                current_index: (!items.is_empty()).then(|| current_index.min(items.len() - 1)),
                is_playing: !items.is_empty(),
                phase: EnginePhase::Ready,
                position_ms,
                duration_ms: DEFAULT_DURATION_MS,
                timeline: items,
            };
        }
        engine
    }

    pub fn commands(&self) -> Vec<EngineCommand> {
        self.lock().commands.clone()
    }

    pub fn timeline_ids(&self) -> Vec<String> {
        self.lock().snapshot.timeline_ids()
    }

    pub fn subscriber_count(&self) -> usize {
        self.event_tx.receiver_count()
    }

    /// Lets the current item run out and advance on its own.
    pub fn transition_to(&self, index: usize) {
        let events = {
            let mut state = self.lock();
            if index >= state.snapshot.timeline.len() {
                return;
            }
            move_to(&mut state.snapshot, index, 0, TransitionReason::Auto)
        };
        self.emit(events);
    }

    /// The last item finished with nothing queued after it.
    pub fn finish(&self) {
        let mut events = vec![];
        {
            let mut state = self.lock();
            if state.snapshot.is_playing {
                state.snapshot.is_playing = false;
                events.push(EngineEvent::IsPlayingChanged(false));
            }
            state.snapshot.position_ms = state.snapshot.duration_ms;
            state.snapshot.phase = EnginePhase::Ended;
            events.push(EngineEvent::PlaybackStateChanged(EnginePhase::Ended));
        }
        self.emit(events);
    }

    pub fn set_position(&self, position_ms: u64) {
        self.lock().snapshot.position_ms = position_ms;
    }

    pub fn set_duration(&self, duration_ms: u64) {
        self.lock().snapshot.duration_ms = duration_ms;
    }

    /// Simulates the engine service going away.
    pub fn disconnect(&self) {
        self.lock().disconnected = true;
        self.emit(vec![EngineEvent::Disconnected]);
    }

    pub fn emit_event(&self, event: EngineEvent) {
        self.emit(vec![event]);
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, events: Vec<EngineEvent>) {
        for event in events {
            self.event_tx.send(event).unwrap_or_default();
        }
    }

    fn command(
        &self,
        command: EngineCommand,
        apply: impl FnOnce(&mut EngineSnapshot) -> Vec<EngineEvent>,
    ) -> Result<(), EngineError> {
        let events = {
            let mut state = self.lock();
            if state.disconnected {
                return Err(EngineError::Unavailable);
            }
            state.commands.push(command);
            apply(&mut state.snapshot)
        };
        self.emit(events);
        Ok(())
    }
}

fn ids(items: &[QueueItem]) -> Vec<String> {
    items.iter().map(|i| i.id().to_owned()).collect()
}

fn move_to(
    snapshot: &mut EngineSnapshot,
    index: usize,
    position_ms: u64,
    reason: TransitionReason,
) -> Vec<EngineEvent> {
    snapshot.current_index = Some(index);
    snapshot.position_ms = position_ms;
    snapshot.duration_ms = DEFAULT_DURATION_MS;
    if snapshot.phase == EnginePhase::Ended {
        snapshot.phase = EnginePhase::Ready;
    }
    vec![
        EngineEvent::ItemTransition { index, reason },
        EngineEvent::MetadataChanged(snapshot.timeline.get(index).cloned()),
    ]
}

#[async_trait]
impl Engine for MockEngine {
    async fn connect(&self) -> Result<(), EngineError> {
        if self.lock().fail_connect {
            Err(EngineError::ConnectionFailed("service unavailable".to_owned()))
        } else {
            Ok(())
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    fn snapshot(&self) -> EngineSnapshot {
        self.lock().snapshot.clone()
    }

    fn set_items(&self, items: Vec<QueueItem>, start_index: usize) -> Result<(), EngineError> {
        self.command(EngineCommand::SetItems(ids(&items), start_index), |s| {
            s.timeline = items;
            s.phase = EnginePhase::Idle;
            let mut events = vec![EngineEvent::TimelineChanged];
            if s.timeline.is_empty() {
                s.current_index = None;
                events.push(EngineEvent::MetadataChanged(None));
            } else {
                let index = start_index.min(s.timeline.len() - 1);
                events.extend(move_to(s, index, 0, TransitionReason::QueueChanged));
            }
            events
        })
    }

    fn add_items(&self, items: Vec<QueueItem>) -> Result<(), EngineError> {
        self.command(EngineCommand::AddItems(ids(&items)), |s| {
            s.timeline.extend(items);
            vec![EngineEvent::TimelineChanged]
        })
    }

    fn clear(&self) -> Result<(), EngineError> {
        self.command(EngineCommand::Clear, |s| {
            let mut events = vec![EngineEvent::TimelineChanged, EngineEvent::MetadataChanged(None)];
            if s.is_playing {
                events.push(EngineEvent::IsPlayingChanged(false));
            }
            *s = EngineSnapshot::default();
            events
        })
    }

    fn seek_to_index(&self, index: usize, position_ms: u64) -> Result<(), EngineError> {
        self.command(EngineCommand::SeekToIndex(index, position_ms), |s| {
            if index < s.timeline.len() {
                move_to(s, index, position_ms, TransitionReason::Seek)
            } else {
                vec![]
            }
        })
    }

    fn prepare(&self) -> Result<(), EngineError> {
        self.command(EngineCommand::Prepare, |s| {
            if s.timeline.is_empty() || s.phase == EnginePhase::Ready {
                return vec![];
            }
            s.phase = EnginePhase::Ready;
            vec![EngineEvent::PlaybackStateChanged(EnginePhase::Ready)]
        })
    }

    fn play(&self) -> Result<(), EngineError> {
        self.command(EngineCommand::Play, |s| {
            if s.timeline.is_empty() || s.is_playing {
                return vec![];
            }
            s.is_playing = true;
            vec![EngineEvent::IsPlayingChanged(true)]
        })
    }

    fn pause(&self) -> Result<(), EngineError> {
        self.command(EngineCommand::Pause, |s| {
            if !s.is_playing {
                return vec![];
            }
            s.is_playing = false;
            vec![EngineEvent::IsPlayingChanged(false)]
        })
    }

    fn seek(&self, position_ms: u64) -> Result<(), EngineError> {
        self.command(EngineCommand::Seek(position_ms), |s| {
            s.position_ms = position_ms;
            vec![]
        })
    }

    fn skip_next(&self) -> Result<(), EngineError> {
        self.command(EngineCommand::SkipNext, |s| {
            let len = s.timeline.len();
            match s.current_index {
                Some(index) if index + 1 < len => move_to(s, index + 1, 0, TransitionReason::Seek),
                _ => vec![],
            }
        })
    }

    fn skip_previous(&self) -> Result<(), EngineError> {
        self.command(EngineCommand::SkipPrevious, |s| {
            let current = s.current_index;
            match current {
                Some(index) if index > 0 => move_to(s, index - 1, 0, TransitionReason::Seek),
                _ => vec![],
            }
        })
    }
}
