//! Anti-forgery state token
//!
//! The initiation route stores a fresh token under [`SESSION_STATE_KEY`]; the
//! callback compares the echoed `state` parameter against it and then clears
//! it, so a token can authorize at most one callback.

use rand::Rng;
use serde_json::Value;

use crate::error::MailruAuthError;
use crate::session::{Session, SessionError};

/// Session key holding the pending state token
pub const SESSION_STATE_KEY: &str = "state";

/// Unpredictable per-flow state token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateToken(String);

impl StateToken {
    /// Generate a new token from 32 random bytes, hex encoded
    #[must_use]
    pub fn generate() -> Self {
        let random_bytes: [u8; 32] = rand::rng().random();
        Self(hex::encode(random_bytes))
    }

    /// Token as sent to the provider
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store the token as the session's pending state, replacing any older one
    ///
    /// # Errors
    ///
    /// Returns error if the session value cannot be serialized
    pub fn store(&self, session: &Session) -> Result<(), SessionError> {
        session.set(SESSION_STATE_KEY, &self.0)
    }
}

impl std::fmt::Display for StateToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Loose comparison of a stored state value against the received parameter
///
/// Query parameters are always text, while a stored value may be a number,
/// so numbers and strings compare by their textual form. Any other stored
/// type, or a missing side, never matches.
#[must_use]
pub fn state_matches(stored: Option<&Value>, received: Option<&str>) -> bool {
    let Some(received) = received else {
        return false;
    };
    match stored {
        Some(Value::String(s)) => s == received,
        Some(Value::Number(n)) => n.to_string() == received,
        _ => false,
    }
}

/// Validate the callback's `state` against the session
///
/// On mismatch the session is left untouched.
///
/// # Errors
///
/// Returns [`MailruAuthError::StateMismatch`] if the values differ or either
/// one is absent
pub fn verify_state(session: &Session, received: Option<&str>) -> Result<(), MailruAuthError> {
    let stored = session.get_value(SESSION_STATE_KEY);
    if state_matches(stored.as_ref(), received) {
        Ok(())
    } else {
        tracing::warn!(
            session_id = %session.id(),
            has_stored = stored.is_some(),
            has_received = received.is_some(),
            "OAuth state mismatch"
        );
        Err(MailruAuthError::StateMismatch)
    }
}

/// Drop the pending state token
pub fn clear_state(session: &Session) {
    session.remove(SESSION_STATE_KEY);
}
