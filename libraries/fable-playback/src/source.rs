//! Track and media-source building
//!
//! Turns fetched book metadata into playable units: one [`Track`] per
//! chapter via the timeline mapping, then one [`MediaSource`] per track with
//! every clip's URI resolved. URI resolution prefers the local cache and
//! falls back to the media channel, so cached books keep playing offline.

use crate::error::Result;
use crate::player::{MediaSource, ResolvedClip};
use crate::timeline::resolve_chapter_files;
use crate::types::Track;
use fable_core::{Book, LocalCache, MediaChannel};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Pair each chapter of a book with its resolved file clips.
pub fn build_tracks(book: &Book) -> Vec<Track> {
    let mappings = resolve_chapter_files(&book.chapters, &book.files);

    book.chapters
        .iter()
        .zip(mappings)
        .map(|(chapter, clips)| Track {
            chapter_id: chapter.id.clone(),
            title: chapter.title.clone(),
            start: chapter.start,
            duration: chapter.duration,
            clips,
        })
        .collect()
}

/// Resolves playable URIs for a book's tracks.
///
/// Consults the local cache per file first; only uncached files hit the
/// channel. A failed channel fetch aborts preparation with a typed error so
/// callers never load a partially resolved window.
pub struct SourceResolver {
    channel: Arc<dyn MediaChannel>,
    cache: Arc<dyn LocalCache>,
}

impl SourceResolver {
    /// Create a resolver over the given collaborators.
    pub fn new(channel: Arc<dyn MediaChannel>, cache: Arc<dyn LocalCache>) -> Self {
        Self { channel, cache }
    }

    /// Produce one media source per track, with all clip URIs resolved.
    pub async fn resolve_sources(&self, book: &Book, tracks: &[Track]) -> Result<Vec<MediaSource>> {
        // Several chapters usually cut into the same file; resolve each file
        // once.
        let mut uris: HashMap<String, Url> = HashMap::new();

        let mut sources = Vec::with_capacity(tracks.len());
        for track in tracks {
            let mut clips = Vec::with_capacity(track.clips.len());
            for clip in &track.clips {
                let uri = match uris.get(&clip.file_id) {
                    Some(uri) => uri.clone(),
                    None => {
                        let uri = self.resolve_file_uri(&book.id, &clip.file_id).await?;
                        uris.insert(clip.file_id.clone(), uri.clone());
                        uri
                    }
                };
                clips.push(ResolvedClip {
                    uri,
                    clip_start: clip.clip_start,
                    clip_end: clip.clip_end,
                });
            }
            sources.push(MediaSource {
                chapter_id: track.chapter_id.clone(),
                title: track.title.clone(),
                clips,
            });
        }

        debug!(
            item_id = %book.id,
            tracks = sources.len(),
            files = uris.len(),
            "resolved media sources"
        );
        Ok(sources)
    }

    async fn resolve_file_uri(&self, item_id: &str, file_id: &str) -> Result<Url> {
        if let Some(uri) = self.cache.resolve_local_uri(item_id, file_id) {
            debug!(item_id, file_id, "resolved file from local cache");
            return Ok(uri);
        }

        match self.channel.provide_file_uri(item_id, file_id).await {
            Ok(uri) => Ok(uri),
            Err(err) => {
                warn!(item_id, file_id, error = %err, "file uri fetch failed");
                Err(err.into())
            }
        }
    }
}
