//! Signed Mail.Ru REST API calls
//!
//! Every call carries `app_id`, `session_key` (the access token), `method`
//! and `secure=1`, plus method-specific parameters. The request is signed
//! server-side style: all parameters sorted by key, concatenated as `k=v`
//! with no separators, followed by the app secret, MD5-hashed and sent as
//! `sig`.
//!
//! ```text
//! sig = md5("app_id=423004method=users.getInfosecure=1session_key=...uids=..." + secret)
//! ```

use md5::{Digest, Md5};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

use super::http::ProviderHttp;
use super::types::{ClientCredentials, MailruToken};
use crate::error::MailruAuthError;

/// Profile lookup method
pub const USERS_GET_INFO: &str = "users.getInfo";

/// Concatenate parameters in ascending key order as `k=v`, without separators
///
/// Keys are compared bytewise, which for the ASCII parameter names the API
/// uses is the same as lexicographic order.
#[must_use]
pub fn canonical_string(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .fold(String::new(), |mut out, (key, value)| {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out
        })
}

/// Lowercase hex MD5 of the canonical string followed by `secret_key`
#[must_use]
pub fn sign(params: &BTreeMap<String, String>, secret_key: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(canonical_string(params).as_bytes());
    hasher.update(secret_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// One API call, before signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    method: String,
    session_key: String,
    params: BTreeMap<String, String>,
}

impl SignedRequest {
    /// Call `method` on behalf of the session identified by `session_key`
    pub fn new(method: impl Into<String>, session_key: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            session_key: session_key.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a method parameter
    ///
    /// Parameters override the base parameters of the same name.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// API method name
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Full parameter set including `sig`
    #[must_use]
    pub fn signed_params(&self, credentials: &ClientCredentials) -> BTreeMap<String, String> {
        let mut params = BTreeMap::from([
            ("app_id".to_string(), credentials.client_id.clone()),
            ("session_key".to_string(), self.session_key.clone()),
            ("method".to_string(), self.method.clone()),
            ("secure".to_string(), "1".to_string()),
        ]);
        params.extend(self.params.iter().map(|(k, v)| (k.clone(), v.clone())));

        let sig = sign(&params, &credentials.client_secret);
        params.insert("sig".to_string(), sig);
        params
    }
}

/// Client for the signed REST API
#[derive(Clone)]
pub struct RpcClient {
    http: Arc<dyn ProviderHttp>,
    api_url: String,
    credentials: ClientCredentials,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("api_url", &self.api_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl RpcClient {
    /// Create a client for `api_url`
    pub fn new(
        http: Arc<dyn ProviderHttp>,
        api_url: impl Into<String>,
        credentials: ClientCredentials,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            credentials,
        }
    }

    /// URL for a signed request
    ///
    /// # Errors
    ///
    /// Returns [`MailruAuthError::Config`] if the API URL is invalid
    pub fn request_url(&self, request: &SignedRequest) -> Result<Url, MailruAuthError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| MailruAuthError::Config(format!("invalid api url: {e}")))?;
        url.query_pairs_mut()
            .extend_pairs(request.signed_params(&self.credentials));
        Ok(url)
    }

    /// Perform a signed GET and return the decoded JSON
    ///
    /// # Errors
    ///
    /// - [`MailruAuthError::ApiError`] if the body carries a top-level `error`
    /// - [`MailruAuthError::InvalidResponse`] if the body is not JSON
    /// - [`MailruAuthError::Http`] on transport failure
    pub async fn call(&self, request: &SignedRequest) -> Result<Value, MailruAuthError> {
        let url = self.request_url(request)?;
        let body = self.http.get(url.as_str()).await?;
        let value: Value = serde_json::from_str(&body).map_err(|e| {
            MailruAuthError::InvalidResponse(format!(
                "{} response is not valid JSON: {e}",
                request.method()
            ))
        })?;

        if let Some(error) = api_error(&value) {
            tracing::warn!(method = request.method(), error = %error, "Mail.Ru API call failed");
            return Err(MailruAuthError::ApiError(error));
        }

        Ok(value)
    }

    /// Fetch the profile of the user behind `token`
    ///
    /// `uids` is only sent when the token carries a visitor id; without it
    /// the API answers for the session's own user.
    ///
    /// # Errors
    ///
    /// Same as [`RpcClient::call`]
    pub async fn users_get_info(&self, token: &MailruToken) -> Result<Value, MailruAuthError> {
        let mut request = SignedRequest::new(USERS_GET_INFO, token.access_token.as_str());
        if let Some(vid) = token.visitor_id() {
            request = request.param("uids", vid);
        }
        self.call(&request).await
    }
}

/// Message of a top-level `error` object, if the call failed
///
/// Falls back to `error_code` and then to the raw value when `error_msg` is
/// missing. Falsy `error` values are ignored.
fn api_error(value: &Value) -> Option<String> {
    let error = value.get("error")?;
    match error {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => Some(
            obj.get("error_msg")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| obj.get("error_code").map(ToString::to_string))
                .unwrap_or_else(|| error.to_string()),
        ),
        other => Some(other.to_string()),
    }
}
