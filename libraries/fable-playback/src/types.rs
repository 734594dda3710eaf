//! Core types for timeline mapping and track management

use serde::{Deserialize, Serialize};

/// The portion of one physical file belonging to one chapter, in
/// file-relative time coordinates.
///
/// Produced by [`crate::timeline::resolve_chapter_files`] and owned by the
/// chapter's track from the moment it is built; never shared or mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileClip {
    /// Identifier of the file the clip cuts into
    pub file_id: String,

    /// Clip start within the file, in seconds
    pub clip_start: f64,

    /// Clip end within the file, in seconds
    pub clip_end: f64,
}

impl FileClip {
    /// Clip length in seconds.
    pub fn duration(&self) -> f64 {
        self.clip_end - self.clip_start
    }
}

/// The playable unit corresponding to one chapter: the chapter's timeline
/// placement plus its ordered file clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Chapter this track plays
    pub chapter_id: String,

    /// Chapter title, carried into player metadata
    pub title: String,

    /// Chapter start on the overall timeline, in seconds
    pub start: f64,

    /// Chapter duration in seconds
    pub duration: f64,

    /// Ordered clips composing the chapter's audio
    pub clips: Vec<FileClip>,
}

impl Track {
    /// Chapter end on the overall timeline, in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A chapter index paired with an in-chapter offset, both derived from an
/// overall timeline position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChapterPosition {
    /// Index into the book's chapter list
    pub index: usize,

    /// Offset within that chapter, in seconds.
    ///
    /// May be marginally negative near a boundary: a position within the
    /// lookup epsilon of a chapter end resolves to the next chapter.
    pub position: f64,
}
