//! Per-upload session state.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// State of one logical upload, keyed by `fileId`.
///
/// Lifecycle: created on the first chunk, mutated by every chunk and
/// by finalize, removed by the TTL sweeper. `output_path` and `size`
/// are set only once `completed` is true.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub file_id: String,
    pub filename: String,
    /// Declared by the first chunk received for this `fileId`.
    pub total_chunks: u32,
    /// Invariant: every member is in `[0, total_chunks)`.
    pub received_chunks: HashSet<u32>,
    pub completed: bool,
    pub output_path: Option<PathBuf>,
    pub size: u64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Bumped on every chunk and finalize; drives TTL eviction.
    pub last_activity: DateTime<Utc>,
}

impl UploadSession {
    pub fn new(
        file_id: impl Into<String>,
        filename: impl Into<String>,
        total_chunks: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            file_id: file_id.into(),
            filename: filename.into(),
            total_chunks,
            received_chunks: HashSet::new(),
            completed: false,
            output_path: None,
            size: 0,
            description: None,
            created_at: now,
            last_activity: now,
        }
    }

    /// All declared chunks present.
    pub fn has_all_chunks(&self) -> bool {
        self.received_chunks.len() as u32 == self.total_chunks
    }

    pub fn received_count(&self) -> u32 {
        self.received_chunks.len() as u32
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_chunk_does_not_change_cardinality() {
        let mut session = UploadSession::new("x", "capture.har", 3);
        session.received_chunks.insert(1);
        session.received_chunks.insert(1);
        assert_eq!(session.received_count(), 1);
        assert!(!session.has_all_chunks());

        session.received_chunks.insert(0);
        session.received_chunks.insert(2);
        assert!(session.has_all_chunks());
    }
}
