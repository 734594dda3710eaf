//! Sync engine integration tests against fake channel and player.

use async_trait::async_trait;
use fable_core::{
    Book, Chapter, ChannelError, MediaChannel, PlaybackProgress, PlaybackSession,
};
use fable_playback::{PlayerEvent, PlayerState};
use fable_sync::{PlayerProbe, SyncConfig, SyncEngine};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
enum ChannelCall {
    StartPlayback { item_id: String, chapter_id: String },
    SyncProgress { session_id: String },
}

#[derive(Default)]
struct FakeChannel {
    calls: Mutex<Vec<ChannelCall>>,
    session_counter: AtomicUsize,
    offline: AtomicBool,
    fail_next_sync_not_found: AtomicBool,
    sync_delay: Mutex<Option<Duration>>,
}

impl FakeChannel {
    fn calls(&self) -> Vec<ChannelCall> {
        self.calls.lock().unwrap().clone()
    }

    fn sync_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ChannelCall::SyncProgress { .. }))
            .count()
    }

    fn start_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ChannelCall::StartPlayback { .. }))
            .count()
    }
}

#[async_trait]
impl MediaChannel for FakeChannel {
    async fn fetch_book(&self, _item_id: &str) -> fable_core::Result<Book> {
        Err(ChannelError::Unsupported)
    }

    async fn start_playback(
        &self,
        item_id: &str,
        chapter_id: &str,
        _device_id: &str,
        _supported_mime_types: &[String],
    ) -> fable_core::Result<PlaybackSession> {
        self.calls.lock().unwrap().push(ChannelCall::StartPlayback {
            item_id: item_id.to_owned(),
            chapter_id: chapter_id.to_owned(),
        });
        if self.offline.load(Ordering::SeqCst) {
            return Ok(PlaybackSession::local(item_id));
        }
        let n = self.session_counter.fetch_add(1, Ordering::SeqCst);
        Ok(PlaybackSession::remote(format!("sess-{n}"), item_id))
    }

    async fn sync_progress(
        &self,
        session_id: &str,
        _item_id: &str,
        _progress: PlaybackProgress,
    ) -> fable_core::Result<()> {
        self.calls.lock().unwrap().push(ChannelCall::SyncProgress {
            session_id: session_id.to_owned(),
        });
        let delay = *self.sync_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_next_sync_not_found.swap(false, Ordering::SeqCst) {
            return Err(ChannelError::NotFound);
        }
        Ok(())
    }

    async fn provide_file_uri(&self, _item_id: &str, _file_id: &str) -> fable_core::Result<Url> {
        Err(ChannelError::Unsupported)
    }
}

#[derive(Default)]
struct FakeProbe {
    total_time_secs: AtomicU64,
    prepared: AtomicBool,
    playing: AtomicBool,
    ended: AtomicBool,
    position_ms: AtomicU64,
    duration_ms: AtomicU64,
}

impl FakeProbe {
    fn prepared() -> Self {
        let probe = Self::default();
        probe.prepared.store(true, Ordering::SeqCst);
        probe.duration_ms.store(600_000, Ordering::SeqCst);
        probe.position_ms.store(300_000, Ordering::SeqCst);
        probe
    }

    fn set_total_time(&self, secs: u64) {
        self.total_time_secs.store(secs, Ordering::SeqCst);
    }

    fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::SeqCst);
    }
}

impl PlayerProbe for FakeProbe {
    fn progress(&self) -> Option<PlaybackProgress> {
        let total = self.total_time_secs.load(Ordering::SeqCst) as f64;
        Some(PlaybackProgress {
            current_total_time: total,
            current_chapter_time: total % 100.0,
        })
    }

    fn is_prepared(&self) -> bool {
        self.prepared.load(Ordering::SeqCst)
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn is_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    fn track_position_ms(&self) -> u64 {
        self.position_ms.load(Ordering::SeqCst)
    }

    fn track_duration_ms(&self) -> Option<u64> {
        Some(self.duration_ms.load(Ordering::SeqCst))
    }
}

/// Three contiguous 100-second chapters.
fn book(id: &str) -> Book {
    Book {
        id: id.to_owned(),
        title: format!("Book {id}"),
        chapters: vec![
            Chapter::from_duration("ch1", "One", 0.0, 100.0),
            Chapter::from_duration("ch2", "Two", 100.0, 100.0),
            Chapter::from_duration("ch3", "Three", 200.0, 100.0),
        ],
        files: Vec::new(),
        progress: None,
    }
}

fn paused_event() -> PlayerEvent {
    PlayerEvent::IsPlayingChanged(false)
}

fn state_event() -> PlayerEvent {
    PlayerEvent::PlaybackStateChanged(PlayerState::Ready)
}

fn engine_with(
    channel: &Arc<FakeChannel>,
    probe: &Arc<FakeProbe>,
    config: SyncConfig,
) -> SyncEngine {
    SyncEngine::new(
        Arc::clone(channel) as Arc<dyn MediaChannel>,
        Arc::clone(probe) as Arc<dyn PlayerProbe>,
        config,
    )
}

#[tokio::test]
async fn first_event_opens_session_then_pushes() {
    let channel = Arc::new(FakeChannel::default());
    let probe = Arc::new(FakeProbe::prepared());
    probe.set_total_time(50);
    let engine = engine_with(&channel, &probe, SyncConfig::default());

    engine.start_synchronization(book("book-1")).await;
    engine.on_player_event(paused_event()).await;

    assert_eq!(
        channel.calls(),
        vec![
            ChannelCall::StartPlayback {
                item_id: "book-1".into(),
                chapter_id: "ch1".into(),
            },
            ChannelCall::SyncProgress {
                session_id: "sess-0".into(),
            },
        ]
    );
}

#[tokio::test]
async fn steady_state_reuses_the_session() {
    let channel = Arc::new(FakeChannel::default());
    let probe = Arc::new(FakeProbe::prepared());
    probe.set_total_time(50);
    let engine = engine_with(&channel, &probe, SyncConfig::default());

    engine.start_synchronization(book("book-1")).await;
    engine.on_player_event(paused_event()).await;
    probe.set_total_time(60);
    engine.on_player_event(paused_event()).await;

    assert_eq!(channel.start_count(), 1);
    assert_eq!(channel.sync_count(), 2);
}

#[tokio::test]
async fn chapter_change_reopens_the_session() {
    let channel = Arc::new(FakeChannel::default());
    let probe = Arc::new(FakeProbe::prepared());
    probe.set_total_time(50);
    let engine = engine_with(&channel, &probe, SyncConfig::default());

    engine.start_synchronization(book("book-1")).await;
    engine.on_player_event(paused_event()).await;
    probe.set_total_time(150);
    engine.on_player_event(paused_event()).await;

    let starts: Vec<_> = channel
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            ChannelCall::StartPlayback { chapter_id, .. } => Some(chapter_id),
            ChannelCall::SyncProgress { .. } => None,
        })
        .collect();
    assert_eq!(starts, vec!["ch1".to_owned(), "ch2".to_owned()]);
    assert_eq!(channel.sync_count(), 2);
}

#[tokio::test]
async fn expired_session_is_reopened_without_replaying_the_push() {
    let channel = Arc::new(FakeChannel::default());
    let probe = Arc::new(FakeProbe::prepared());
    probe.set_total_time(50);
    let engine = engine_with(&channel, &probe, SyncConfig::default());

    engine.start_synchronization(book("book-1")).await;
    channel.fail_next_sync_not_found.store(true, Ordering::SeqCst);
    engine.on_player_event(paused_event()).await;

    // open, failed push, reopen; the position is resubmitted next tick
    assert_eq!(
        channel.calls(),
        vec![
            ChannelCall::StartPlayback {
                item_id: "book-1".into(),
                chapter_id: "ch1".into(),
            },
            ChannelCall::SyncProgress {
                session_id: "sess-0".into(),
            },
            ChannelCall::StartPlayback {
                item_id: "book-1".into(),
                chapter_id: "ch1".into(),
            },
        ]
    );

    engine.on_player_event(paused_event()).await;
    assert_eq!(channel.sync_count(), 2);
    assert!(matches!(
        channel.calls().last(),
        Some(ChannelCall::SyncProgress { session_id }) if session_id == "sess-1"
    ));
}

#[tokio::test]
async fn local_session_is_promoted_once_back_online() {
    let channel = Arc::new(FakeChannel::default());
    let probe = Arc::new(FakeProbe::prepared());
    probe.set_total_time(50);
    let engine = engine_with(&channel, &probe, SyncConfig::default());

    engine.start_synchronization(book("book-1")).await;
    channel.offline.store(true, Ordering::SeqCst);
    engine.on_player_event(paused_event()).await;

    channel.offline.store(false, Ordering::SeqCst);
    engine.on_player_event(paused_event()).await;

    // the local session forces a reopen even though nothing else changed
    assert_eq!(channel.start_count(), 2);
    assert!(matches!(
        channel.calls().last(),
        Some(ChannelCall::SyncProgress { session_id }) if session_id.starts_with("sess-")
    ));
}

#[tokio::test]
async fn switching_items_opens_a_fresh_session() {
    let channel = Arc::new(FakeChannel::default());
    let probe = Arc::new(FakeProbe::prepared());
    probe.set_total_time(50);
    let engine = engine_with(&channel, &probe, SyncConfig::default());

    engine.start_synchronization(book("book-1")).await;
    engine.on_player_event(paused_event()).await;

    engine.start_synchronization(book("book-2")).await;
    engine.on_player_event(paused_event()).await;

    let starts: Vec<_> = channel
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            ChannelCall::StartPlayback { item_id, .. } => Some(item_id),
            ChannelCall::SyncProgress { .. } => None,
        })
        .collect();
    assert_eq!(starts, vec!["book-1".to_owned(), "book-2".to_owned()]);
}

#[tokio::test]
async fn unprepared_player_events_are_ignored() {
    let channel = Arc::new(FakeChannel::default());
    let probe = Arc::new(FakeProbe::default());
    let engine = engine_with(&channel, &probe, SyncConfig::default());

    engine.start_synchronization(book("book-1")).await;
    engine.on_player_event(state_event()).await;

    assert!(channel.calls().is_empty());
}

#[tokio::test]
async fn overlapping_ticks_are_dropped_not_queued() {
    let channel = Arc::new(FakeChannel::default());
    *channel.sync_delay.lock().unwrap() = Some(Duration::from_millis(200));
    let probe = Arc::new(FakeProbe::prepared());
    probe.set_total_time(50);
    let engine = engine_with(&channel, &probe, SyncConfig::default());

    engine.start_synchronization(book("book-1")).await;

    let slow = {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine.on_player_event(paused_event()).await;
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    engine.on_player_event(paused_event()).await;
    slow.await.unwrap();

    assert_eq!(channel.start_count(), 1);
    assert_eq!(channel.sync_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn periodic_loop_ticks_while_playing_and_stops_on_pause() {
    let channel = Arc::new(FakeChannel::default());
    let probe = Arc::new(FakeProbe::prepared());
    probe.set_total_time(50);
    probe.set_playing(true);
    let config = SyncConfig {
        long_interval: Duration::from_millis(20),
        short_interval: Duration::from_millis(5),
        short_sync_window: Duration::from_millis(1),
        ..SyncConfig::default()
    };
    let engine = engine_with(&channel, &probe, config);

    engine.start_synchronization(book("book-1")).await;
    engine.on_player_event(state_event()).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    let while_playing = channel.sync_count();
    assert!(while_playing >= 3, "loop should keep ticking: {while_playing}");

    probe.set_playing(false);
    tokio::time::sleep(Duration::from_millis(200)).await;
    let after_pause = channel.sync_count();
    // the loop observes the pause within one interval and exits
    assert!(after_pause <= while_playing + 1);

    engine.cancel_synchronization().await;
}

#[tokio::test(start_paused = true)]
async fn near_track_boundary_uses_the_short_interval() {
    let channel = Arc::new(FakeChannel::default());
    let probe = Arc::new(FakeProbe::prepared());
    probe.set_total_time(50);
    probe.position_ms.store(1_000, Ordering::SeqCst);
    probe.set_playing(true);
    let config = SyncConfig {
        long_interval: Duration::from_millis(500),
        short_interval: Duration::from_millis(10),
        short_sync_window: Duration::from_millis(5_000),
        ..SyncConfig::default()
    };
    let engine = engine_with(&channel, &probe, config);

    engine.start_synchronization(book("book-1")).await;
    engine.on_player_event(state_event()).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    // the 500ms long interval would have allowed at most the initial tick
    assert!(channel.sync_count() >= 3, "got {}", channel.sync_count());

    engine.cancel_synchronization().await;
}
