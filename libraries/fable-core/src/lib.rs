//! Fable Player Core
//!
//! Domain types, collaborator contracts, and error handling shared by the
//! playback and synchronization crates.
//!
//! This crate defines:
//! - **Domain Types**: `Book`, `Chapter`, `BookFile`, `PlaybackProgress`,
//!   `PlaybackSession`
//! - **Contracts**: `MediaChannel` (remote media server) and `LocalCache`
//!   (offline URI resolution)
//! - **Error Handling**: `ChannelError` and the crate `Result` type
//!
//! The core crate is deliberately thin: it holds nothing stateful and knows
//! nothing about players, windows, or sync loops.

#![forbid(unsafe_code)]

pub mod channel;
pub mod error;
pub mod types;

pub use channel::{LocalCache, MediaChannel};
pub use error::{ChannelError, Result};
pub use types::{
    Book, BookFile, Chapter, MediaProgress, PlaybackProgress, PlaybackSession, SessionSource,
};
