//! Core domain types for books, chapters, and playback progress

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named time range within a book's overall timeline.
///
/// Chapter boundaries are independent of how the audio is split across
/// physical files. Chapters are contiguous and ordered: `end == start +
/// duration` and each chapter starts where the previous one ends, within
/// floating-point tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter identifier from the media server
    pub id: String,

    /// Chapter title
    pub title: String,

    /// Offset of the chapter start on the overall timeline, in seconds
    pub start: f64,

    /// Offset of the chapter end on the overall timeline, in seconds
    pub end: f64,

    /// Chapter duration in seconds
    pub duration: f64,
}

/// A physical audio asset, one of possibly several composing a book.
///
/// Files only know their own duration; concatenated in order they cover the
/// same overall timeline as the chapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookFile {
    /// File identifier from the media server
    pub id: String,

    /// File duration in seconds
    pub duration: f64,
}

/// Saved listening progress for a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaProgress {
    /// Last known position on the overall timeline, in seconds
    pub current_time: f64,

    /// Whether the listener finished the book
    pub is_finished: bool,
}

/// A book (or podcast) as fetched from the media channel.
///
/// Chapters and files are immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Item identifier on the media server
    pub id: String,

    /// Book title
    pub title: String,

    /// Ordered chapter timeline
    pub chapters: Vec<Chapter>,

    /// Ordered physical files backing the timeline
    pub files: Vec<BookFile>,

    /// Saved progress, if the listener has started this book before
    pub progress: Option<MediaProgress>,
}

/// A snapshot of the listener's position, pushed to the media channel.
///
/// Derived from the player on every sync tick; never persisted by this core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackProgress {
    /// Position on the book's overall timeline, in seconds
    pub current_total_time: f64,

    /// Position within the current chapter, in seconds
    pub current_chapter_time: f64,
}

/// Where a playback session originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionSource {
    /// Opened against the media server
    Remote,

    /// Generated locally while offline; promoted to a remote session once
    /// real chapter movement occurs
    Local,
}

/// Server-side handle correlating a listening session to progress updates.
///
/// Exactly one session is active per player instance at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    /// Session identifier
    pub session_id: String,

    /// Item the session tracks
    pub item_id: String,

    /// Session origin
    pub source: SessionSource,
}

impl PlaybackSession {
    /// Create a locally-originated session with a generated id.
    pub fn local(item_id: impl Into<String>) -> Self {
        Self {
            session_id: format!("local-{}", Uuid::new_v4()),
            item_id: item_id.into(),
            source: SessionSource::Local,
        }
    }

    /// Create a session handle from a server response.
    pub fn remote(session_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            item_id: item_id.into(),
            source: SessionSource::Remote,
        }
    }
}

impl Chapter {
    /// Build a chapter from its start offset and duration.
    pub fn from_duration(
        id: impl Into<String>,
        title: impl Into<String>,
        start: f64,
        duration: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start,
            end: start + duration,
            duration,
        }
    }
}
