//! Session storage backends

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::data::{SessionData, SessionError, SessionId};

/// Persistent storage for session data
///
/// Implement this to back the session layer with Redis, a database, or
/// anything else. The login flow only needs load-after-save consistency for
/// a single session.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Load a session by id
    async fn load(&self, id: &SessionId) -> Result<Option<SessionData>, SessionError>;

    /// Create or replace a session
    async fn save(&self, id: &SessionId, data: SessionData) -> Result<(), SessionError>;

    /// Delete a session
    async fn remove(&self, id: &SessionId) -> Result<(), SessionError>;
}

/// In-process session store
///
/// Cheap to clone; clones share the same map. Expired sessions are dropped
/// when loaded and swept out on every save, so abandoned logins do not pile
/// up.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionData>>>,
}

impl MemorySessionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, data| !data.is_expired());
        before - sessions.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionData>, SessionError> {
        let found = self.sessions.read().get(id).cloned();
        match found {
            Some(data) if data.is_expired() => {
                self.sessions.write().remove(id);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn save(&self, id: &SessionId, data: SessionData) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write();
        sessions.retain(|_, existing| !existing.is_expired());
        sessions.insert(*id, data);
        Ok(())
    }

    async fn remove(&self, id: &SessionId) -> Result<(), SessionError> {
        self.sessions.write().remove(id);
        Ok(())
    }
}
