//! Read-only player view for the sync engine

use fable_core::PlaybackProgress;

/// The sync engine's view of the player.
///
/// A snapshot interface: every method reads current player state without
/// blocking. The engine never drives playback through this trait; it only
/// observes.
pub trait PlayerProbe: Send + Sync {
    /// Current progress snapshot, or `None` when the player cannot provide
    /// one (nothing loaded, position unknown). A tick with no snapshot is
    /// ignored.
    fn progress(&self) -> Option<PlaybackProgress>;

    /// Whether the player has sources loaded and prepared. Events from an
    /// unprepared player are not synced.
    fn is_prepared(&self) -> bool;

    /// Whether playback is actively progressing.
    fn is_playing(&self) -> bool;

    /// Whether the player reached the end of its loaded sources.
    fn is_ended(&self) -> bool;

    /// Position within the current track, in milliseconds.
    fn track_position_ms(&self) -> u64;

    /// Duration of the current track, if known.
    fn track_duration_ms(&self) -> Option<u64>;
}
