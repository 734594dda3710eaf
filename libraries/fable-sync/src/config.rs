//! Configuration for the sync engine

use std::time::Duration;
use uuid::Uuid;

/// Sync interval while playback sits well inside a track.
pub const SYNC_INTERVAL_LONG: Duration = Duration::from_secs(30);

/// Sync interval near a track boundary, where chapter transitions need to be
/// reported promptly.
pub const SYNC_INTERVAL_SHORT: Duration = Duration::from_secs(5);

/// Distance from a track's start or end within which the short interval
/// applies: just under two long intervals.
pub const SHORT_SYNC_WINDOW: Duration = Duration::from_secs(59);

/// Mime types this client can play, reported when opening a session.
const SUPPORTED_MIME_TYPES: &[&str] = &[
    "audio/flac",
    "audio/mpeg",
    "audio/mp4",
    "audio/aac",
    "audio/ogg",
    "audio/webm",
];

/// Configuration for [`crate::SyncEngine`].
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Device identifier reported when opening sessions
    pub device_id: String,

    /// Mime types reported when opening sessions
    pub supported_mime_types: Vec<String>,

    /// Interval between ticks well inside a track
    pub long_interval: Duration,

    /// Interval between ticks near a track boundary
    pub short_interval: Duration,

    /// Boundary distance that switches to the short interval
    pub short_sync_window: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            device_id: Uuid::new_v4().to_string(),
            supported_mime_types: SUPPORTED_MIME_TYPES
                .iter()
                .map(ToString::to_string)
                .collect(),
            long_interval: SYNC_INTERVAL_LONG,
            short_interval: SYNC_INTERVAL_SHORT,
            short_sync_window: SHORT_SYNC_WINDOW,
        }
    }
}
