//! Configuration management for mailru-auth
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `MAILRU_` prefix, `__` for nesting)
//! 2. `./config.toml` (development)
//! 3. `/etc/mailru-auth/{service_name}/config.toml` (system config)
//! 4. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! client_id = "123456"
//! client_secret = "0123456789abcdef"
//! path = "/auth/mailru"
//! scope = "stream messages"
//! trust_proxy = false
//!
//! [session]
//! cookie_name = "mailru_session"
//! max_age_secs = 86400
//! ```
//!
//! The same values can come from the environment, e.g.
//! `MAILRU_CLIENT_ID=123456` or `MAILRU_SESSION__SECURE=true`.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::MailruAuthError;
use crate::session::SessionConfig;

/// Default route the login flow is mounted on
pub const DEFAULT_PATH: &str = "/auth/mailru";

/// Provider authorization dialog
pub const AUTHORIZE_URL: &str = "https://connect.mail.ru/oauth/authorize";

/// Provider token endpoint
pub const TOKEN_URL: &str = "https://connect.mail.ru/oauth/token";

/// Provider REST/RPC endpoint
pub const API_URL: &str = "https://www.appsmail.ru/platform/api";

/// Environment variable prefix
const ENV_PREFIX: &str = "MAILRU_";

/// Provider endpoint URLs
///
/// Only overridden in tests or when pointing at a staging proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Authorization dialog URL
    pub authorize_url: String,
    /// Token endpoint URL
    pub token_url: String,
    /// Signed RPC endpoint URL
    pub api_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            api_url: API_URL.to_string(),
        }
    }
}

/// Complete mailru-auth configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailruConfig {
    /// The app's client id (Mail.Ru `app_id`)
    pub client_id: String,

    /// The app's client secret (also the RPC signing key)
    pub client_secret: String,

    /// Path that starts the login flow; the callback is `{path}/redirect`
    pub path: String,

    /// Permissions to request, space separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Trust `X-Forwarded-Proto` / `X-Forwarded-Host` from a reverse proxy
    pub trust_proxy: bool,

    /// Provider endpoints
    pub endpoints: Endpoints,

    /// Session cookie settings for the bundled session layer
    pub session: SessionConfig,
}

impl Default for MailruConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            path: DEFAULT_PATH.to_string(),
            scope: None,
            trust_proxy: false,
            endpoints: Endpoints::default(),
            session: SessionConfig::default(),
        }
    }
}

impl std::fmt::Debug for MailruConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailruConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("path", &self.path)
            .field("scope", &self.scope)
            .field("trust_proxy", &self.trust_proxy)
            .field("endpoints", &self.endpoints)
            .field("session", &self.session)
            .finish()
    }
}

impl MailruConfig {
    /// Create a configuration with credentials and default everything else
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    /// Set the login path
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the permissions scope
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Override the provider endpoints
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Callback path derived from [`MailruConfig::path`]
    #[must_use]
    pub fn redirect_path(&self) -> String {
        format!("{}/redirect", self.path)
    }

    /// Check values that would make route registration fail
    ///
    /// # Errors
    ///
    /// Returns [`MailruAuthError::Config`] if `path` does not start with `/`
    /// or ends with one (the root path is not a valid login path)
    pub fn validate(&self) -> Result<(), MailruAuthError> {
        if !self.path.starts_with('/') {
            return Err(MailruAuthError::Config(format!(
                "path must start with '/': {}",
                self.path
            )));
        }
        if self.path.ends_with('/') {
            return Err(MailruAuthError::Config(format!(
                "path must not end with '/': {}",
                self.path
            )));
        }
        Ok(())
    }

    /// Log setup-time warnings for missing credentials
    ///
    /// Missing credentials are not fatal: the dialog or the callback will
    /// simply be rejected by the provider. Returns `true` if anything was
    /// missing.
    pub fn warn_missing_credentials(&self) -> bool {
        let mut missing = false;
        if self.client_id.is_empty() {
            tracing::warn!("[mailru] No client id - the dialog won't work.");
            missing = true;
        }
        if self.client_secret.is_empty() {
            tracing::warn!("[mailru] No client secret - the redirect won't work.");
            missing = true;
        }
        missing
    }

    /// Load configuration for a specific service
    ///
    /// Searches for configuration with precedence:
    /// 1. Environment variables (`MAILRU_*`, use `__` for nesting)
    /// 2. `./config.toml`
    /// 3. `/etc/mailru-auth/{service_name}/config.toml`
    /// 4. Defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be parsed or a value
    /// has the wrong type
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use mailru_auth::config::MailruConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = MailruConfig::load_for_service("my-app")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_for_service(service_name: &str) -> anyhow::Result<Self> {
        let mut figment = Self::defaults()?;

        let system_config = Self::system_path(service_name);
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file falls back to defaults; environment variables still
    /// override the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file contains invalid TOML or a value has the
    /// wrong type
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Self::defaults()?
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }

    /// System-wide config path for a service
    #[must_use]
    pub fn system_path(service_name: &str) -> PathBuf {
        PathBuf::from("/etc/mailru-auth")
            .join(service_name)
            .join("config.toml")
    }

    fn defaults() -> anyhow::Result<Figment> {
        Ok(Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?)))
    }
}
