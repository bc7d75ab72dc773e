//! Per-request session handle and extractor
//!
//! [`SessionMiddleware`](super::SessionMiddleware) places a [`Session`] in the
//! request extensions. Handlers mutate it in place; the middleware persists
//! whatever the handler left behind once the response is produced.

use axum::{extract::FromRequestParts, http::request::Parts};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use super::data::{SessionData, SessionError, SessionId};
use crate::error::MailruAuthError;

/// Mutable view of the current session
///
/// Clones share the same underlying data.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    data: Arc<Mutex<SessionData>>,
}

impl Session {
    /// Wrap loaded session data
    #[must_use]
    pub fn new(id: SessionId, data: SessionData) -> Self {
        Self {
            id,
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Session id
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Read a typed value
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data.lock().get(key)
    }

    /// Read the raw JSON value
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<serde_json::Value> {
        self.data.lock().value(key).cloned()
    }

    /// Store a value
    ///
    /// # Errors
    ///
    /// Returns error if value cannot be serialized to JSON
    pub fn set<T: Serialize>(&self, key: impl Into<String>, value: T) -> Result<(), SessionError> {
        self.data.lock().insert(key, value)
    }

    /// Remove a value, returning it
    pub fn remove(&self, key: &str) -> Option<serde_json::Value> {
        self.data.lock().remove(key)
    }

    /// Snapshot of the current data
    #[must_use]
    pub fn snapshot(&self) -> SessionData {
        self.data.lock().clone()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self.data.lock().keys().map(str::to_string).collect();
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("keys", &keys)
            .finish()
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = MailruAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(MailruAuthError::SessionMissing)
    }
}
