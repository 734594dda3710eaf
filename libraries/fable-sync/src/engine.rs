//! Progress synchronization engine
//!
//! Event-driven loop around the media channel: player events trigger an
//! immediate tick, and while playback progresses a background task keeps
//! ticking on an adaptive interval (short near track boundaries, long
//! otherwise). One tick snapshots progress, reconciles the playback session,
//! and pushes the snapshot to the server.

use crate::config::SyncConfig;
use crate::gate::TickGate;
use crate::probe::PlayerProbe;
use fable_core::{Book, ChannelError, MediaChannel, PlaybackSession, SessionSource};
use fable_playback::timeline::locate_chapter;
use fable_playback::PlayerEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Synchronizes listening progress for the currently playing item.
///
/// Cheap to clone; clones share the same state. All mutation of the current
/// session goes through this engine, nothing else reads or writes it.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<Inner>,
}

struct Inner {
    channel: Arc<dyn MediaChannel>,
    probe: Arc<dyn PlayerProbe>,
    config: SyncConfig,
    state: Mutex<SyncState>,
    gate: TickGate,
}

#[derive(Default)]
struct SyncState {
    item: Option<Arc<Book>>,
    chapter_index: Option<usize>,
    session: Option<PlaybackSession>,
    loop_task: Option<JoinHandle<()>>,
}

impl SyncEngine {
    /// Create an engine over the given collaborators.
    pub fn new(
        channel: Arc<dyn MediaChannel>,
        probe: Arc<dyn PlayerProbe>,
        config: SyncConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                channel,
                probe,
                config,
                state: Mutex::new(SyncState::default()),
                gate: TickGate::new(),
            }),
        }
    }

    /// Start tracking a new item.
    ///
    /// Any loop still running for the previous item is aborted first, so a
    /// stale tick can never attach progress to the new item.
    pub async fn start_synchronization(&self, item: Book) {
        let mut state = self.inner.state.lock().await;
        if let Some(task) = state.loop_task.take() {
            task.abort();
        }
        info!(item_id = %item.id, "starting playback synchronization");
        state.item = Some(Arc::new(item));
        state.chapter_index = None;
    }

    /// Stop the periodic loop. Already-running ticks finish on their own.
    pub async fn cancel_synchronization(&self) {
        let mut state = self.inner.state.lock().await;
        if let Some(task) = state.loop_task.take() {
            task.abort();
        }
    }

    /// Feed a player event into the engine.
    ///
    /// Runs one immediate tick (so a pause still reports its final
    /// position), then keeps the periodic loop alive while playback is
    /// actively progressing.
    pub async fn on_player_event(&self, event: PlayerEvent) {
        if !self.inner.probe.is_prepared() {
            return;
        }
        debug!(?event, "sync trigger");

        self.run_tick().await;
        self.ensure_loop().await;
    }

    /// Execute one sync tick: snapshot, session reconciliation, push.
    ///
    /// Skips without queueing when another tick is in flight.
    async fn run_tick(&self) {
        let inner = &self.inner;

        let Some(_permit) = inner.gate.try_begin() else {
            debug!("sync is already running, skipping tick");
            return;
        };
        let Some(progress) = inner.probe.progress() else {
            return;
        };

        let (item, mut session, last_chapter) = {
            let state = inner.state.lock().await;
            (state.item.clone(), state.session.clone(), state.chapter_index)
        };
        let Some(item) = item else {
            return;
        };
        let Some(located) = locate_chapter(&item.chapters, progress.current_total_time) else {
            return;
        };

        debug!(
            item_id = %item.id,
            total_time = progress.current_total_time,
            chapter = located.index,
            "sync tick"
        );

        if needs_new_session(session.as_ref(), &item.id, located.index, last_chapter) {
            session = self.open_session(&item, located.index).await;
        }

        let Some(session) = session else {
            return;
        };
        match inner
            .channel
            .sync_progress(&session.session_id, &session.item_id, progress)
            .await
        {
            Ok(()) => {}
            Err(ChannelError::NotFound) => {
                warn!(
                    session_id = %session.session_id,
                    "server no longer knows the session, reopening"
                );
                self.open_session(&item, located.index).await;
            }
            Err(err) => {
                // Absorbed; the next tick resubmits the current position.
                warn!(error = %err, "progress sync failed");
            }
        }
    }

    /// Open a session for `item` at `chapter_index` and store it, unless the
    /// current item changed while the call was in flight.
    async fn open_session(&self, item: &Book, chapter_index: usize) -> Option<PlaybackSession> {
        let inner = &self.inner;
        let chapter = item.chapters.get(chapter_index)?;

        let opened = inner
            .channel
            .start_playback(
                &item.id,
                &chapter.id,
                &inner.config.device_id,
                &inner.config.supported_mime_types,
            )
            .await;

        match opened {
            Ok(session) => {
                let mut state = inner.state.lock().await;
                if state.item.as_deref().map(|i| i.id.as_str()) != Some(item.id.as_str()) {
                    debug!(item_id = %item.id, "item changed while opening session, discarding");
                    return None;
                }
                info!(
                    item_id = %item.id,
                    session_id = %session.session_id,
                    chapter = chapter_index,
                    "opened playback session"
                );
                state.session = Some(session.clone());
                state.chapter_index = Some(chapter_index);
                Some(session)
            }
            Err(err) => {
                warn!(item_id = %item.id, error = %err, "failed to open playback session");
                None
            }
        }
    }

    /// Spawn the periodic loop if none is running and playback progresses.
    async fn ensure_loop(&self) {
        let inner = &self.inner;
        let mut state = inner.state.lock().await;
        if state.item.is_none() {
            return;
        }
        if let Some(task) = &state.loop_task {
            if !task.is_finished() {
                return;
            }
        }
        if !playback_progressing(inner.probe.as_ref()) {
            return;
        }

        let engine = self.clone();
        state.loop_task = Some(tokio::spawn(async move {
            let inner = &engine.inner;
            while playback_progressing(inner.probe.as_ref()) {
                let interval = if near_track_boundary(inner.probe.as_ref(), inner.config.short_sync_window)
                {
                    inner.config.short_interval
                } else {
                    inner.config.long_interval
                };
                tokio::time::sleep(interval).await;

                if !playback_progressing(inner.probe.as_ref()) {
                    break;
                }
                engine.run_tick().await;
            }
        }));
    }
}

fn playback_progressing(probe: &dyn PlayerProbe) -> bool {
    probe.is_playing() && !probe.is_ended()
}

/// Whether the current position sits within `window` of the track's start or
/// end, where chapter transitions warrant the short sync interval.
fn near_track_boundary(probe: &dyn PlayerProbe, window: Duration) -> bool {
    let window_ms = window.as_millis() as u64;
    let position = probe.track_position_ms();

    let near_start = position < window_ms;
    let near_end = probe
        .track_duration_ms()
        .is_some_and(|duration| duration.saturating_sub(position) < window_ms);

    near_start || near_end
}

/// Decision table for (re)opening a playback session.
///
/// Open when there is no session, when the session tracks a different item,
/// when it originated locally (promote to a server session), or when the
/// chapter moved since the last known one.
fn needs_new_session(
    session: Option<&PlaybackSession>,
    item_id: &str,
    chapter_index: usize,
    last_known_chapter: Option<usize>,
) -> bool {
    match session {
        None => true,
        Some(s) if s.item_id != item_id => true,
        Some(s) if s.source == SessionSource::Local => true,
        Some(_) => last_known_chapter != Some(chapter_index),
    }
}
