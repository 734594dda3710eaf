//! Sequential player abstraction
//!
//! The platform audio engine is driven through [`SequentialPlayer`]: an
//! ordered list of opaque media sources, index/position seeking, and a small
//! set of events. The window controller and sync engine never touch decoding
//! or output directly.

use serde::{Deserialize, Serialize};
use url::Url;

/// One clip of a media source with its playable URI resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedClip {
    /// Where the audio bytes come from (remote stream or local cache)
    pub uri: Url,

    /// Clip start within the file, in seconds
    pub clip_start: f64,

    /// Clip end within the file, in seconds
    pub clip_end: f64,
}

impl ResolvedClip {
    /// Clip length in milliseconds, as handed to the player.
    pub fn duration_ms(&self) -> u64 {
        ((self.clip_end - self.clip_start) * 1000.0) as u64
    }
}

/// An opaque playable unit handed to the underlying player, one per chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSource {
    /// Chapter this source plays
    pub chapter_id: String,

    /// Chapter title for player-surface metadata
    pub title: String,

    /// Ordered clips; the player concatenates them gaplessly
    pub clips: Vec<ResolvedClip>,
}

/// Coarse player state as reported by the platform engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// Not prepared; no sources loaded
    Idle,

    /// Preparing or buffering
    Buffering,

    /// Ready to play (or playing)
    Ready,

    /// Reached the end of the loaded sources
    Ended,
}

/// Events emitted by the underlying player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// The player moved to another source in its list.
    ///
    /// `auto` is true for natural end-of-track transitions and false for
    /// transitions caused by an explicit seek.
    ItemTransitioned {
        /// Whether the transition happened without a seek
        auto: bool,
    },

    /// The player's coarse state changed
    PlaybackStateChanged(PlayerState),

    /// Playback started or stopped progressing
    IsPlayingChanged(bool),
}

/// Contract for the platform's sequential media player.
///
/// The player owns an ordered source list and plays it front to back. Only
/// [`crate::TrackWindowController`] mutates the list; everything else observes
/// playback through events and the read accessors.
pub trait SequentialPlayer {
    /// Replace the source list. Playback position is discarded.
    fn set_sources(&mut self, sources: Vec<MediaSource>);

    /// Append sources to the end of the current list without interrupting
    /// playback.
    fn append_sources(&mut self, sources: Vec<MediaSource>);

    /// Seek to a position within the source at `index` (player-relative).
    ///
    /// May suspend internally until the player is ready; implementations
    /// must not drop seeks.
    fn seek(&mut self, index: usize, position_ms: u64);

    /// Index of the current source within the player's list.
    fn current_index(&self) -> usize;

    /// Position within the current source, in milliseconds.
    fn current_position_ms(&self) -> u64;

    /// Duration of the current source, if known yet.
    fn duration_ms(&self) -> Option<u64>;

    /// Coarse playback state.
    fn playback_state(&self) -> PlayerState;

    /// Whether playback is actively progressing.
    fn is_playing(&self) -> bool;
}
