//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No tracks are currently loaded
    #[error("No tracks loaded")]
    NoTracksLoaded,

    /// Track index out of bounds
    #[error("Track index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Seek target past the end of the last chapter
    #[error("Seek past the last chapter: {0}s")]
    SeekPastEnd(f64),

    /// Media channel failure during source preparation
    #[error("Media channel error: {0}")]
    Channel(#[from] fable_core::ChannelError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
