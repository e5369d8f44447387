//! In-process session store.
//!
//! Keeps sessions in a map behind a `tokio::sync::RwLock`. The version check
//! and the write in `update` happen under the same write guard, so a stale
//! writer always loses.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::model::{Session, SessionId};
use crate::traits::{SessionStore, UserSessions};

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionId, Session>,
    /// Insertion order, used to break `created_at` ties in listings.
    order: Vec<SessionId>,
}

/// A `SessionStore` that lives for the lifetime of the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create(&self, session: &Session) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let id = session.session_id().clone();
        if inner.sessions.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        inner.order.push(id.clone());
        inner.sessions.insert(id, session.clone());
        Ok(())
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<Session>, StoreError> {
        Ok(self.inner.read().await.sessions.get(session_id).cloned())
    }

    async fn update(&self, session: &Session, expected_version: u64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let id = session.session_id();
        let stored = inner
            .sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if stored.version() != expected_version {
            return Err(StoreError::VersionMismatch {
                session_id: id.to_string(),
                expected: expected_version,
                actual: stored.version(),
            });
        }
        *stored = session.clone();
        Ok(())
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<UserSessions, StoreError> {
        let inner = self.inner.read().await;
        let mut owned: Vec<&Session> = inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.sessions.get(id))
            .filter(|s| s.user_id() == user_id)
            .collect();
        // Stable sort keeps newest-inserted first among equal timestamps.
        owned.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let total = owned.len();
        let sessions = owned
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(UserSessions { sessions, total })
    }
}
