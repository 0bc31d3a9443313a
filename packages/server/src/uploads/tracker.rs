//! Chunk intake and strict-order reassembly.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWriteExt, BufWriter};

use crate::error::ApiError;
use crate::uploads::store::SessionStore;

/// Copy granularity for chunk writes and reassembly. Keeps memory
/// bounded independent of capture size; not a protocol constant.
const COPY_BUFFER_BYTES: usize = 1024 * 1024;

/// Result of a successful finalize. Cached on the session, so a
/// repeated finalize returns the same values.
#[derive(Debug, Clone)]
pub struct FinalizedUpload {
    pub file_id: String,
    pub filename: String,
    pub size: u64,
    pub chunks: u32,
    pub output_path: PathBuf,
}

/// Tracks partial uploads and reassembles them on finalize.
///
/// Chunk payloads live under `<root>/<fileId>/chunk_<index>` until
/// finalize concatenates them into `<root>/<fileId>_<filename>` and
/// removes the chunk directory.
pub struct UploadTracker {
    store: Arc<dyn SessionStore>,
    root: PathBuf,
    ttl: Duration,
}

impl UploadTracker {
    pub fn new(store: Arc<dyn SessionStore>, root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            root: root.into(),
            ttl: Duration::from_secs(3600),
        }
    }

    /// Idle time before a session and its files are evicted.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    fn chunk_dir(&self, file_id: &str) -> PathBuf {
        self.root.join(sanitize_component(file_id))
    }

    fn chunk_path(&self, file_id: &str, index: u32) -> PathBuf {
        self.chunk_dir(file_id).join(format!("chunk_{index}"))
    }

    /// Accept one chunk, streaming the payload to disk.
    ///
    /// Creates the session on the first chunk for `file_id`. The
    /// session lock is held for the whole write, so concurrent
    /// deliveries for one `fileId` are serialised; redelivery of an
    /// index overwrites the stored bytes without growing the set.
    pub async fn receive_chunk<R>(
        &self,
        file_id: &str,
        index: u32,
        total_chunks: u32,
        filename: &str,
        mut payload: R,
    ) -> Result<u32, ApiError>
    where
        R: AsyncRead + Unpin + Send,
    {
        // Reject before touching the store: an out-of-range first
        // chunk must not leave an empty session behind.
        if index >= total_chunks {
            return Err(ApiError::ChunkOutOfRange {
                index,
                total: total_chunks,
            });
        }

        let handle = self
            .store
            .get_or_create(file_id, filename, total_chunks)
            .await;
        let mut session = handle.lock().await;

        // receivedChunks ⊆ [0, totalChunks); the first chunk's
        // declaration is authoritative, so a later chunk with a
        // different declared total is checked against the session.
        if index >= session.total_chunks {
            return Err(ApiError::ChunkOutOfRange {
                index,
                total: session.total_chunks,
            });
        }

        tokio::fs::create_dir_all(self.chunk_dir(file_id)).await?;

        let file = tokio::fs::File::create(self.chunk_path(file_id, index)).await?;
        let mut writer = BufWriter::with_capacity(COPY_BUFFER_BYTES, file);
        tokio::io::copy(&mut payload, &mut writer).await?;
        writer.flush().await?;

        session.received_chunks.insert(index);
        session.touch();

        tracing::debug!(
            file_id,
            chunk_index = index,
            received = session.received_count(),
            total = session.total_chunks,
            "chunk stored"
        );

        Ok(index)
    }

    /// Reassemble a complete upload.
    ///
    /// Chunks are concatenated in strict ascending index order
    /// regardless of arrival order, via a fixed-size copy buffer.
    /// Finalizing an already-completed session is a no-op returning
    /// the cached result.
    pub async fn finalize(
        &self,
        file_id: &str,
        description: Option<String>,
    ) -> Result<FinalizedUpload, ApiError> {
        let handle = self.store.get(file_id).await.ok_or(ApiError::UploadNotFound)?;
        let mut session = handle.lock().await;

        if session.completed {
            let output_path = session
                .output_path
                .clone()
                .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("completed session has no output path")))?;
            return Ok(FinalizedUpload {
                file_id: session.file_id.clone(),
                filename: session.filename.clone(),
                size: session.size,
                chunks: session.total_chunks,
                output_path,
            });
        }

        if !session.has_all_chunks() {
            return Err(ApiError::UploadIncomplete {
                received: session.received_count(),
                expected: session.total_chunks,
            });
        }

        let output_path = self.root.join(format!(
            "{}_{}",
            sanitize_component(file_id),
            sanitize_component(&session.filename)
        ));

        let output = tokio::fs::File::create(&output_path).await?;
        let mut writer = BufWriter::with_capacity(COPY_BUFFER_BYTES, output);
        for index in 0..session.total_chunks {
            let mut chunk = tokio::fs::File::open(self.chunk_path(file_id, index)).await?;
            tokio::io::copy(&mut chunk, &mut writer).await?;
        }
        writer.flush().await?;

        let size = tokio::fs::metadata(&output_path).await?.len();
        tokio::fs::remove_dir_all(self.chunk_dir(file_id)).await?;

        session.completed = true;
        session.output_path = Some(output_path.clone());
        session.size = size;
        session.description = description;
        session.touch();

        tracing::info!(file_id, size, chunks = session.total_chunks, "upload assembled");

        Ok(FinalizedUpload {
            file_id: session.file_id.clone(),
            filename: session.filename.clone(),
            size,
            chunks: session.total_chunks,
            output_path,
        })
    }

    /// Path of the assembled capture for a finalized upload.
    pub async fn assembled_file(&self, file_id: &str) -> Result<PathBuf, ApiError> {
        let handle = self.store.get(file_id).await.ok_or(ApiError::UploadNotFound)?;
        let session = handle.lock().await;
        session
            .output_path
            .clone()
            .ok_or(ApiError::UploadIncomplete {
                received: session.received_count(),
                expected: session.total_chunks,
            })
    }

    /// Drop idle sessions and their on-disk leftovers. Returns the
    /// number of sessions evicted.
    pub async fn evict_expired(&self) -> usize {
        let expired = self.store.expired(self.ttl).await;
        let mut evicted = 0;

        for file_id in expired {
            let Some(handle) = self.store.delete(&file_id).await else {
                continue;
            };
            let session = handle.lock().await;

            let _ = tokio::fs::remove_dir_all(self.chunk_dir(&file_id)).await;
            if let Some(path) = &session.output_path {
                let _ = tokio::fs::remove_file(path).await;
            }

            tracing::info!(file_id, completed = session.completed, "evicted idle upload session");
            evicted += 1;
        }

        evicted
    }
}

/// Spawn the background TTL sweep.
pub fn spawn_session_sweeper(
    tracker: Arc<UploadTracker>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = tracker.evict_expired().await;
            if evicted > 0 {
                tracing::debug!(evicted, "upload session sweep");
            }
        }
    })
}

/// Client-supplied ids and filenames become path components; strip
/// anything that could escape the upload root.
fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
