//! Session identifiers and stored values

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Longest lifetime a session can be renewed to (ten years)
const MAX_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Random, unguessable session id carried in the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Fresh v4 id
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.as_hyphenated(), f)
    }
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s)
            .map(Self)
            .map_err(|_| SessionError::InvalidSessionId)
    }
}

/// Values held for one browser session, with an absolute expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    values: Map<String, Value>,
    expires_at: DateTime<Utc>,
}

impl Default for SessionData {
    fn default() -> Self {
        Self::new(Duration::hours(24))
    }
}

impl SessionData {
    /// Empty session living for `ttl`
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            values: Map::new(),
            expires_at: Utc::now() + ttl,
        }
    }

    /// Absolute expiry time
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the session has outlived its expiry
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Push the expiry to `ttl_secs` from now, capped at ten years
    pub fn renew(&mut self, ttl_secs: u64) {
        let secs = i64::try_from(ttl_secs).map_or(MAX_TTL_SECS, |secs| secs.min(MAX_TTL_SECS));
        self.expires_at = Utc::now() + Duration::seconds(secs);
    }

    /// Raw value under `key`
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Value under `key`, if present and of type `T`
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        T::deserialize(self.values.get(key)?).ok()
    }

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns error if `value` cannot be represented as JSON
    pub fn insert<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Result<(), SessionError> {
        self.values.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Drop the value under `key`, returning it
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Stored keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Whether nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Session failures
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Cookie value is not a session id
    #[error("Invalid session ID")]
    InvalidSessionId,

    /// Value could not be converted to JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backing store failure
    #[error("Session store error: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_id_roundtrips_through_cookie_text() {
        let id = SessionId::generate();
        assert_eq!(id.to_string().parse::<SessionId>().unwrap(), id);
        assert!("not-a-uuid".parse::<SessionId>().is_err());
        assert_ne!(SessionId::generate(), id);
    }

    #[test]
    fn test_expiry() {
        assert!(SessionData::new(Duration::seconds(-1)).is_expired());
        assert!(!SessionData::default().is_expired());

        let mut data = SessionData::new(Duration::seconds(-1));
        data.renew(60);
        assert!(!data.is_expired());
    }

    #[test]
    fn test_renew_is_capped() {
        let mut data = SessionData::default();
        data.renew(u64::MAX);
        assert!(data.expires_at() <= Utc::now() + Duration::seconds(MAX_TTL_SECS));
        assert!(!data.is_expired());
    }

    #[test]
    fn test_typed_and_raw_access() {
        let mut data = SessionData::default();
        data.insert("state", 42).unwrap();
        data.insert("token", "tok").unwrap();

        assert_eq!(data.get::<u32>("state"), Some(42));
        assert_eq!(data.get::<String>("state"), None);
        assert_eq!(data.value("token"), Some(&json!("tok")));
        assert_eq!(data.keys().count(), 2);

        assert_eq!(data.remove("token"), Some(json!("tok")));
        data.remove("state");
        assert!(data.is_empty());
    }
}
