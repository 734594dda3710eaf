//! Collaborator contracts
//!
//! The playback core consumes two narrow interfaces: a `MediaChannel` that
//! talks to the remote media server, and a `LocalCache` that resolves file
//! URIs from on-device storage when available. HTTP plumbing, auth, and
//! retries live behind the channel implementation, not here.

use crate::error::Result;
use crate::types::{Book, PlaybackProgress, PlaybackSession};
use async_trait::async_trait;
use url::Url;

/// Remote media server contract.
///
/// All methods may suspend on network I/O. Implementations are expected to
/// handle transport-level retries themselves; callers treat each method as a
/// single attempt.
#[async_trait]
pub trait MediaChannel: Send + Sync {
    /// Fetch a book's metadata: chapter timeline, file list, saved progress.
    async fn fetch_book(&self, item_id: &str) -> Result<Book>;

    /// Open a server-side playback session for progress tracking.
    async fn start_playback(
        &self,
        item_id: &str,
        chapter_id: &str,
        device_id: &str,
        supported_mime_types: &[String],
    ) -> Result<PlaybackSession>;

    /// Push a progress snapshot for an open session.
    ///
    /// Fails with [`crate::ChannelError::NotFound`] when the server no longer
    /// knows the session.
    async fn sync_progress(
        &self,
        session_id: &str,
        item_id: &str,
        progress: PlaybackProgress,
    ) -> Result<()>;

    /// Produce a playable URI for one physical file of an item.
    async fn provide_file_uri(&self, item_id: &str, file_id: &str) -> Result<Url>;
}

/// On-device cache contract, consulted before falling back to
/// [`MediaChannel::provide_file_uri`].
pub trait LocalCache: Send + Sync {
    /// Resolve a file URI locally, if the file is cached on this device.
    fn resolve_local_uri(&self, item_id: &str, file_id: &str) -> Option<Url>;
}
