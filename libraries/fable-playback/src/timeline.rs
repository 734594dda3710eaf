//! Chapter timeline mapping
//!
//! Two pure functions reconcile a book's chapter timeline with its physical
//! files:
//!
//! - [`resolve_chapter_files`] cuts the ordered file sequence into per-chapter
//!   clips (one clip list per chapter, in chapter order).
//! - [`locate_chapter`] finds the chapter containing an overall timeline
//!   position, with a forward-biased boundary so that "exactly at a chapter
//!   end" resolves to the start of the next chapter.
//!
//! Both are synchronous, never panic on inconsistent metadata, and are safe
//! to call from any thread.

use crate::types::{ChapterPosition, FileClip};
use fable_core::{Book, BookFile, Chapter};

/// Minimum clip length worth emitting, in seconds.
///
/// Declared chapter boundaries and summed file durations drift by a few
/// milliseconds in real libraries; without the epsilon, near-zero clips would
/// be emitted at almost every file boundary.
pub const CLIP_EPSILON: f64 = 0.01;

/// Forward bias applied when locating a chapter, in seconds.
///
/// A position within this epsilon of a chapter's end belongs to the next
/// chapter, so chapter-transition UI and sync logic see a clean cut. Pinned
/// by the boundary tests below; do not retune without re-validating them.
pub const CHAPTER_EPSILON: f64 = 0.1;

/// Restart threshold when resuming a book, in seconds. A saved position this
/// close to the book end starts over from the beginning.
const RESUME_RESTART_WINDOW: f64 = 5.0;

/// Map each chapter onto the sub-ranges of the physical files that cover it.
///
/// Returns one clip list per chapter, in chapter order. Chapters and files
/// are assumed ordered and contiguous; when they disagree, coverage is
/// truncated rather than failing:
///
/// - chapters outlasting the files stop at the last file's end,
/// - files outlasting the chapters are silently unused,
/// - clips shorter than [`CLIP_EPSILON`] after trimming are dropped.
pub fn resolve_chapter_files(chapters: &[Chapter], files: &[BookFile]) -> Vec<Vec<FileClip>> {
    if chapters.is_empty() || files.is_empty() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(chapters.len());

    let mut file_iter = files.iter();
    let Some(mut current_file) = file_iter.next() else {
        return Vec::new();
    };

    // Cumulative duration of fully-consumed files; the current file spans
    // [allocated_files_end, allocated_files_end + current_file.duration).
    let mut allocated_files_end = 0.0;

    for chapter in chapters {
        // Most chapters sit inside a single file.
        let mut chapter_clips: Vec<FileClip> = Vec::with_capacity(1);
        let mut outstanding_part_start = chapter.start;

        while outstanding_part_start < chapter.end - CLIP_EPSILON {
            let current_file_end = allocated_files_end + current_file.duration;
            let overlap_end = chapter.end.min(current_file_end);

            if overlap_end - outstanding_part_start > CLIP_EPSILON {
                chapter_clips.push(FileClip {
                    file_id: current_file.id.clone(),
                    clip_start: outstanding_part_start - allocated_files_end,
                    clip_end: overlap_end - allocated_files_end,
                });
            }

            if current_file_end < chapter.end {
                match file_iter.next() {
                    Some(next_file) => {
                        allocated_files_end += current_file.duration;
                        current_file = next_file;
                    }
                    // Files exhausted; the chapter stays partially covered.
                    None => break,
                }
            } else {
                break;
            }

            outstanding_part_start = overlap_end;
        }

        result.push(chapter_clips);
    }

    result
}

/// Find the chapter containing `overall_position` and the offset within it.
///
/// Binary search over chapter ends with a forward-biased epsilon: a position
/// within [`CHAPTER_EPSILON`] of a chapter's end resolves to the next
/// chapter (offset marginally negative), except at the very end of the book
/// where the result clamps to the last chapter at offset 0.0.
///
/// Returns `None` only for an empty chapter list. For any non-negative
/// position the returned index is a valid index into `chapters`.
pub fn locate_chapter(chapters: &[Chapter], overall_position: f64) -> Option<ChapterPosition> {
    if chapters.is_empty() {
        return None;
    }

    let target = overall_position + CHAPTER_EPSILON;
    let last_index = chapters.len() - 1;

    // First chapter whose end lies strictly past the biased position.
    let mut lo = 0usize;
    let mut hi = last_index;
    let mut result = last_index;

    while lo <= hi {
        let mid = (lo + hi) / 2;
        if chapters[mid].end > target {
            result = mid;
            match mid.checked_sub(1) {
                Some(new_hi) => hi = new_hi,
                None => break,
            }
        } else {
            lo = mid + 1;
        }
    }

    if result == last_index && overall_position >= chapters[last_index].end - CHAPTER_EPSILON {
        Some(ChapterPosition {
            index: last_index,
            position: 0.0,
        })
    } else {
        Some(ChapterPosition {
            index: result,
            position: overall_position - chapters[result].start,
        })
    }
}

/// Compute where playback should resume for a book.
///
/// Picks the last chapter starting at or before the saved position. A saved
/// position within [`RESUME_RESTART_WINDOW`] of the book end (or no saved
/// progress at all) restarts from the first chapter.
pub fn starting_position(book: &Book) -> ChapterPosition {
    let start = ChapterPosition {
        index: 0,
        position: 0.0,
    };

    let Some(position) = book.progress.as_ref().map(|p| p.current_time) else {
        return start;
    };
    if book.chapters.is_empty() {
        return start;
    }

    let index = book
        .chapters
        .iter()
        .rposition(|c| c.start <= position)
        .unwrap_or(0);

    let last_index = book.chapters.len() - 1;
    let book_end = book.chapters[last_index].end;
    if index == last_index && position >= book_end - RESUME_RESTART_WINDOW {
        return start;
    }

    ChapterPosition {
        index,
        position: position - book.chapters[index].start,
    }
}
