//! Session cookie settings and header handling

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::data::SessionId;

/// Default session cookie name
pub const SESSION_COOKIE_NAME: &str = "mailru_session";

/// `SameSite` cookie attribute
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Never sent on cross-site requests
    Strict,
    /// Sent on top-level cross-site navigations
    #[default]
    Lax,
    /// Always sent; browsers require `Secure` with it
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        })
    }
}

/// Session cookie settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie name
    pub cookie_name: String,
    /// Cookie `Path`
    pub path: String,
    /// Session lifetime, renewed on every request that writes the session
    pub max_age_secs: u64,
    /// Send the cookie over HTTPS only
    pub secure: bool,
    /// Hide the cookie from scripts
    pub http_only: bool,
    /// `SameSite` attribute; must not be `strict`, or the browser drops the
    /// cookie on the redirect back from the provider
    pub same_site: SameSite,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: SESSION_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            max_age_secs: 24 * 60 * 60,
            secure: !cfg!(debug_assertions),
            http_only: true,
            same_site: SameSite::Lax,
        }
    }
}

impl SessionConfig {
    /// Session id from the request's `Cookie` headers
    ///
    /// Malformed ids are treated as absent.
    #[must_use]
    pub fn read_cookie(&self, headers: &HeaderMap) -> Option<SessionId> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .and_then(|(_, id)| id.trim().parse().ok())
    }

    /// `Set-Cookie` value carrying `id`
    #[must_use]
    pub fn cookie_header(&self, id: &SessionId) -> Option<HeaderValue> {
        let mut cookie = format!(
            "{}={id}; Path={}; Max-Age={}; SameSite={}",
            self.cookie_name, self.path, self.max_age_secs, self.same_site
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).ok()
    }
}
