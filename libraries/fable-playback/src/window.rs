//! Bounded sliding-window track management
//!
//! Materializing every chapter's media sources up front is wasteful for long
//! books and podcasts, so only a fixed-size window of tracks around the
//! current one is ever loaded into the underlying player. Forward playback,
//! the overwhelmingly common case, only extends the window tail; backward and
//! far-forward seeks rebuild the window around the target.
//!
//! All controller operations go through `&mut self`, so window mutations for
//! one player instance are serialized by ownership; no two seeks can race.

use crate::error::{PlaybackError, Result};
use crate::player::{MediaSource, SequentialPlayer};
use crate::types::Track;
use tracing::{debug, warn};

/// Configuration for the track window.
#[derive(Debug, Clone, Copy)]
pub struct WindowConfig {
    /// Number of tracks kept loaded on each side of the current one.
    ///
    /// The loaded window never exceeds `2 * buffer + 1` tracks.
    pub buffer: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { buffer: 4 }
    }
}

/// Wraps a sequential player so that only a bounded window of tracks is ever
/// loaded, while forward playback, explicit seeks, and backward seeks all
/// appear instantaneous to the caller.
pub struct TrackWindowController<P: SequentialPlayer> {
    player: P,
    config: WindowConfig,

    /// Chapter metadata for every track, in chapter order
    tracks: Vec<Track>,

    /// Playable source descriptors, parallel to `tracks`
    sources: Vec<MediaSource>,

    /// Track-list index of the source the player is currently on
    current_index: usize,

    /// Inclusive track-list range currently loaded in the player.
    ///
    /// The head advances as playback moves forward (the player expires
    /// completed items on its own); sources are only ever appended or
    /// replaced wholesale, never removed one by one.
    window_start: usize,
    window_end: usize,
}

impl<P: SequentialPlayer> TrackWindowController<P> {
    /// Create a controller around a platform player.
    pub fn new(player: P, config: WindowConfig) -> Self {
        Self {
            player,
            config,
            tracks: Vec::new(),
            sources: Vec::new(),
            current_index: 0,
            window_start: 0,
            window_end: 0,
        }
    }

    /// Replace all state with a freshly built track list and load the initial
    /// window into the player.
    ///
    /// `tracks` and `sources` are parallel lists, one entry per chapter. A
    /// length mismatch is resolved defensively by truncating to the shorter
    /// list rather than failing playback.
    pub fn load(&mut self, mut tracks: Vec<Track>, mut sources: Vec<MediaSource>) -> Result<()> {
        if tracks.len() != sources.len() {
            warn!(
                tracks = tracks.len(),
                sources = sources.len(),
                "track/source list length mismatch, truncating"
            );
            let len = tracks.len().min(sources.len());
            tracks.truncate(len);
            sources.truncate(len);
        }
        if tracks.is_empty() {
            return Err(PlaybackError::NoTracksLoaded);
        }

        let end = self.config.buffer.min(tracks.len() - 1);
        self.player.set_sources(sources[..=end].to_vec());

        debug!(total = tracks.len(), loaded = end + 1, "loaded track window");

        self.tracks = tracks;
        self.sources = sources;
        self.current_index = 0;
        self.window_start = 0;
        self.window_end = end;
        Ok(())
    }

    /// Handle the player naturally transitioning to the next track.
    ///
    /// Extends the window tail so the configured number of tracks stays
    /// pre-cached ahead of playback.
    pub fn on_auto_advance(&mut self) {
        if self.current_index + 1 >= self.tracks.len() {
            return;
        }

        self.extend_window_for(self.current_index + 1);
        self.current_index += 1;
        self.window_start = self
            .window_start
            .max(self.current_index.saturating_sub(self.config.buffer));
    }

    /// Seek to `position_ms` within the track at `target_index`.
    ///
    /// Same-track seeks go straight to the player; in-window seeks translate
    /// to the player-relative index; out-of-window seeks rebuild the window
    /// around the target.
    pub fn seek(&mut self, target_index: usize, position_ms: u64) -> Result<()> {
        if target_index >= self.tracks.len() {
            warn!(target_index, "seek target out of range");
            return Err(PlaybackError::IndexOutOfBounds(target_index));
        }

        if target_index == self.current_index {
            self.player.seek(self.player.current_index(), position_ms);
        } else if (self.window_start..=self.window_end).contains(&target_index) {
            // The player's list may have expired head items, so translate
            // through the offset from the current track rather than through
            // absolute window coordinates.
            let player_relative = self.player.current_index() as isize + target_index as isize
                - self.current_index as isize;
            self.player.seek(player_relative as usize, position_ms);
            self.extend_window_for(target_index);
        } else {
            let start = target_index.saturating_sub(self.config.buffer);
            let end = (target_index + self.config.buffer).min(self.tracks.len() - 1);

            debug!(target_index, start, end, "rebuilding track window");
            self.player.set_sources(self.sources[start..=end].to_vec());
            self.window_start = start;
            self.window_end = end;
            self.player.seek(target_index - start, position_ms);
        }

        self.current_index = target_index;
        self.window_start = self
            .window_start
            .max(self.current_index.saturating_sub(self.config.buffer));
        Ok(())
    }

    /// Seek to a position on the book's overall timeline.
    ///
    /// Maps the position to a chapter and in-chapter offset against the
    /// loaded track metadata, then delegates to [`Self::seek`].
    pub fn seek_to_overall(&mut self, position: f64) -> Result<()> {
        let position = position.max(0.0);

        let Some(last) = self.tracks.last() else {
            warn!("attempted to seek on an empty track list");
            return Err(PlaybackError::NoTracksLoaded);
        };
        if position > last.end() {
            warn!(position, "attempted to seek past the last chapter");
            return Err(PlaybackError::SeekPastEnd(position));
        }

        let index = self
            .tracks
            .iter()
            .position(|t| t.end() > position)
            .unwrap_or(self.tracks.len() - 1);
        let position_ms = ((position - self.tracks[index].start).max(0.0) * 1000.0) as u64;

        self.seek(index, position_ms)
    }

    /// Seek to the start of the next chapter, clamped to the last one.
    pub fn seek_to_next(&mut self) -> Result<()> {
        if self.tracks.is_empty() {
            return Err(PlaybackError::NoTracksLoaded);
        }
        let target = (self.current_index + 1).min(self.tracks.len() - 1);
        self.seek(target, 0)
    }

    /// Seek to the start of the previous chapter, clamped to the first one.
    pub fn seek_to_previous(&mut self) -> Result<()> {
        if self.tracks.is_empty() {
            return Err(PlaybackError::NoTracksLoaded);
        }
        self.seek(self.current_index.saturating_sub(1), 0)
    }

    /// Current position on the book's overall timeline, in seconds.
    ///
    /// Sum of the completed chapters' durations plus the in-player position
    /// within the current one.
    pub fn current_position_absolute(&self) -> f64 {
        let completed: f64 = self.tracks[..self.current_index.min(self.tracks.len())]
            .iter()
            .map(|t| t.duration)
            .sum();
        completed + self.player.current_position_ms() as f64 / 1000.0
    }

    /// Index of the currently playing track.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Inclusive track-list range currently loaded, as `(start, end)`.
    pub fn window(&self) -> (usize, usize) {
        (self.window_start, self.window_end)
    }

    /// Number of tracks inside the loaded window.
    pub fn window_len(&self) -> usize {
        self.window_end - self.window_start + 1
    }

    /// Loaded track metadata.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Read access to the wrapped player.
    pub fn player(&self) -> &P {
        &self.player
    }

    /// Mutable access to the wrapped player, for transport controls that do
    /// not affect the window.
    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    /// Extend the window tail so `buffer` tracks stay loaded ahead of
    /// `target_index`. No-op when enough headroom is already cached or the
    /// tail has reached the end of the track list.
    fn extend_window_for(&mut self, target_index: usize) {
        if target_index <= self.current_index {
            return;
        }
        if target_index + self.config.buffer <= self.window_end {
            return;
        }

        let advance = target_index - self.current_index;
        let desired_end = self.window_end + advance;
        if desired_end > self.sources.len() - 1 {
            return;
        }

        let appended = self.sources[self.window_end + 1..=desired_end].to_vec();
        debug!(
            from = self.window_end + 1,
            to = desired_end,
            "extending track window tail"
        );
        self.player.append_sources(appended);
        self.window_end = desired_end;
    }
}
