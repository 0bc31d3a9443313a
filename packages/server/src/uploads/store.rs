//! Session-store abstraction and the in-memory implementation.
//!
//! The store maps `fileId` to a shared, individually locked session.
//! Locking one session serialises concurrent chunk deliveries for
//! that `fileId` without blocking unrelated uploads.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::uploads::session::UploadSession;

/// Shared handle to one session. The tokio mutex is the per-`fileId`
/// serialisation point.
pub type SessionHandle = Arc<tokio::sync::Mutex<UploadSession>>;

/// Storage seam for upload sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Existing session, if any.
    async fn get(&self, file_id: &str) -> Option<SessionHandle>;

    /// Existing session, or a freshly created one recording the
    /// declared shape. Atomic, so concurrent first chunks for the
    /// same `fileId` end up sharing one session.
    async fn get_or_create(
        &self,
        file_id: &str,
        filename: &str,
        total_chunks: u32,
    ) -> SessionHandle;

    /// Remove a session, returning its final state.
    async fn delete(&self, file_id: &str) -> Option<SessionHandle>;

    /// Ids of sessions idle for longer than `ttl`.
    async fn expired(&self, ttl: Duration) -> Vec<String>;

    /// Number of live sessions.
    async fn count(&self) -> usize;
}

/// In-memory session store.
///
/// Sessions are lost on restart, which matches the upload protocol:
/// clients re-upload from chunk zero after a failure.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, file_id: &str) -> Option<SessionHandle> {
        self.sessions.read().unwrap().get(file_id).cloned()
    }

    async fn get_or_create(
        &self,
        file_id: &str,
        filename: &str,
        total_chunks: u32,
    ) -> SessionHandle {
        self.sessions
            .write()
            .unwrap()
            .entry(file_id.to_string())
            .or_insert_with(|| {
                Arc::new(tokio::sync::Mutex::new(UploadSession::new(
                    file_id,
                    filename,
                    total_chunks,
                )))
            })
            .clone()
    }

    async fn delete(&self, file_id: &str) -> Option<SessionHandle> {
        self.sessions.write().unwrap().remove(file_id)
    }

    async fn expired(&self, ttl: Duration) -> Vec<String> {
        // Clone handles out first: the map guard must not be held
        // across the session-lock awaits below.
        let handles: Vec<SessionHandle> = self.sessions.read().unwrap().values().cloned().collect();

        let cutoff = Utc::now()
            - chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::hours(1));

        let mut expired = Vec::new();
        for handle in handles {
            let session = handle.lock().await;
            if session.last_activity < cutoff {
                expired.push(session.file_id.clone());
            }
        }
        expired
    }

    async fn count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_is_keyed_and_stable() {
        let store = MemorySessionStore::new();

        let first = store.get_or_create("x", "a.har", 3).await;
        let second = store.get_or_create("x", "ignored.har", 99).await;

        // Same session: the first chunk's declaration wins.
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.total_chunks, 3);
        assert_eq!(store.count().await, 1);

        assert!(store.get("y").await.is_none());
        store.get_or_create("y", "b.har", 1).await;
        assert_eq!(store.count().await, 2);

        store.delete("x").await;
        assert!(store.get("x").await.is_none());
    }

    #[tokio::test]
    async fn expired_reports_only_idle_sessions() {
        let store = MemorySessionStore::new();
        let stale = store.get_or_create("stale", "a.har", 1).await;
        store.get_or_create("fresh", "b.har", 1).await;

        stale.lock().await.last_activity = Utc::now() - chrono::Duration::hours(2);

        let expired = store.expired(Duration::from_secs(3600)).await;
        assert_eq!(expired, vec!["stale".to_string()]);
    }
}
