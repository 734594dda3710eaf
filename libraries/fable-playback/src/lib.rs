//! Fable Player - Playback Core
//!
//! Chapter-timeline playback management for Fable Player.
//!
//! This crate provides:
//! - Chapter-to-file mapping (`timeline::resolve_chapter_files`)
//! - Chapter lookup from an overall position (`timeline::locate_chapter`)
//! - A bounded sliding window of loaded tracks (`TrackWindowController`)
//! - Track and media-source building from book metadata (`source`)
//!
//! # Architecture
//!
//! `fable-playback` is platform-agnostic. The actual audio engine is provided
//! via the [`SequentialPlayer`] trait: the window controller decides *which*
//! sources are loaded and *where* to seek, the platform player does the
//! decoding and output.
//!
//! Books can consist of hundreds of chapters (long podcasts), so the full
//! track list is never materialized in the player. The controller keeps a
//! fixed-size window of sources loaded around the current chapter; forward
//! playback only ever extends the window tail, while out-of-window seeks
//! rebuild it around the target.

#![forbid(unsafe_code)]

mod error;
pub mod player;
pub mod source;
pub mod timeline;
pub mod types;
mod window;

pub use error::{PlaybackError, Result};
pub use player::{MediaSource, PlayerEvent, PlayerState, ResolvedClip, SequentialPlayer};
pub use source::{build_tracks, SourceResolver};
pub use types::{ChapterPosition, FileClip, Track};
pub use window::{TrackWindowController, WindowConfig};
