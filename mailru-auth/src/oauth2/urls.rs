//! Callback and dialog URL construction

use axum::http::{header::HOST, HeaderMap, Uri};
use url::Url;

use crate::error::MailruAuthError;

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Public tunnel domains that always terminate TLS
const TUNNEL_SUFFIXES: [&str; 3] = [".ngrok.io", ".ngrok.app", ".ngrok-free.app"];

/// Whether `host` belongs to a public HTTPS tunnel
///
/// Tunnels forward plain HTTP to the app while the provider talks HTTPS to
/// the tunnel, so callbacks on these hosts must be built with `https`.
/// A trailing `:port` is ignored.
#[must_use]
pub fn is_tunnel_host(host: &str) -> bool {
    let name = host.rsplit_once(':').map_or(host, |(name, port)| {
        if port.chars().all(|c| c.is_ascii_digit()) {
            name
        } else {
            host
        }
    });
    let name = name.to_ascii_lowercase();
    TUNNEL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Scheme and host the current request was made to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    /// `http` or `https`
    pub scheme: String,
    /// Host, including the port if one was given
    pub host: String,
}

impl RequestOrigin {
    /// Create an origin from its parts
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    /// Determine the origin of an incoming request
    ///
    /// With `trust_proxy`, `X-Forwarded-Proto` and `X-Forwarded-Host` win over
    /// the connection's own values. Otherwise the `Host` header (or the URI
    /// authority for HTTP/2) is used and the scheme defaults to `http`.
    #[must_use]
    pub fn from_request(headers: &HeaderMap, uri: &Uri, trust_proxy: bool) -> Self {
        let forwarded = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let scheme = trust_proxy
            .then(|| forwarded(FORWARDED_PROTO))
            .flatten()
            .or_else(|| uri.scheme_str().map(str::to_string))
            .unwrap_or_else(|| "http".to_string());

        let host = trust_proxy
            .then(|| forwarded(FORWARDED_HOST))
            .flatten()
            .or_else(|| {
                headers
                    .get(HOST)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            })
            .or_else(|| uri.authority().map(ToString::to_string))
            .unwrap_or_default();

        Self { scheme, host }
    }

    /// Absolute callback URL for `redirect_path` on this origin
    ///
    /// Tunnel hosts are forced to `https`.
    #[must_use]
    pub fn callback_url(&self, redirect_path: &str) -> String {
        let scheme = if is_tunnel_host(&self.host) {
            "https"
        } else {
            self.scheme.as_str()
        };
        format!("{scheme}://{}{redirect_path}", self.host)
    }
}

/// Build the provider authorization dialog URL
///
/// Parameters are appended in a fixed order: `client_id`, `response_type`,
/// `redirect_uri`, `scope` (only when set) and `state`.
///
/// `state` travels as its own dialog parameter, and the provider echoes it
/// back as the `state` query parameter of the callback. `redirect_uri` stays
/// bare so the token exchange can send the identical value.
///
/// # Errors
///
/// Returns [`MailruAuthError::Config`] if `authorize_url` is not a valid URL
pub fn dialog_url(
    authorize_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: Option<&str>,
    state: &str,
) -> Result<String, MailruAuthError> {
    let mut url = Url::parse(authorize_url)
        .map_err(|e| MailruAuthError::Config(format!("invalid authorize url: {e}")))?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri);
        if let Some(scope) = scope {
            query.append_pair("scope", scope);
        }
        query.append_pair("state", state);
    }

    Ok(url.into())
}
