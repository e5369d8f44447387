//! JSON file session store.
//!
//! One `{dir}/{session_id}.json` document per session. Writes go to a
//! temporary sibling and are renamed into place. A mutex owned by the store
//! handle serializes read-compare-write, so the version check in `update` is
//! atomic only among writers sharing one `JsonFileStore`. Separate handles
//! opened on the same directory do not coordinate.
//!
//! Ids that cannot be file names never name a stored session: `get` and
//! `update` treat them as absent and only `create` refuses them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use vocabquiz_core::error::StoreError;
use vocabquiz_core::model::{Session, SessionId};
use vocabquiz_core::traits::{SessionStore, UserSessions};

/// A `SessionStore` persisting sessions as JSON files in a directory.
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error(&dir, e))?;
        debug!(dir = %dir.display(), "opened file session store");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path of a session, `None` if the id is not a safe file name.
    fn path_for(&self, id: &SessionId) -> Option<PathBuf> {
        let raw = id.as_str();
        let safe = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        safe.then(|| self.dir.join(format!("{raw}.json")))
    }

    async fn read(&self, path: &Path) -> Result<Option<Session>, StoreError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))
    }

    async fn write(&self, path: &Path, session: &Session) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| io_error(path, e))
    }
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {e}", path.display()))
}

#[async_trait]
impl SessionStore for JsonFileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn create(&self, session: &Session) -> Result<(), StoreError> {
        let id = session.session_id();
        let path = self.path_for(id).ok_or_else(|| {
            StoreError::Unavailable(format!("session id not usable as a file name: {id:?}"))
        })?;
        let _guard = self.write_lock.lock().await;
        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| io_error(&path, e))?
        {
            return Err(StoreError::AlreadyExists(session.session_id().to_string()));
        }
        self.write(&path, session).await
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<Session>, StoreError> {
        match self.path_for(session_id) {
            Some(path) => self.read(&path).await,
            None => Ok(None),
        }
    }

    async fn update(&self, session: &Session, expected_version: u64) -> Result<(), StoreError> {
        let id = session.session_id();
        let path = self
            .path_for(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let _guard = self.write_lock.lock().await;
        let stored = self
            .read(&path)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if stored.version() != expected_version {
            return Err(StoreError::VersionMismatch {
                session_id: id.to_string(),
                expected: expected_version,
                actual: stored.version(),
            });
        }
        self.write(&path, session).await
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<UserSessions, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let mut owned = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read(&path).await {
                Ok(Some(session)) if session.user_id() == user_id => owned.push(session),
                Ok(_) => {}
                Err(e) => warn!("skipping unreadable session file: {e}"),
            }
        }

        // Directory order is arbitrary; ties on created_at fall back to id.
        owned.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.session_id().as_str().cmp(a.session_id().as_str()))
        });

        let total = owned.len();
        let sessions = owned.into_iter().skip(offset).take(limit).collect();
        Ok(UserSessions { sessions, total })
    }
}
