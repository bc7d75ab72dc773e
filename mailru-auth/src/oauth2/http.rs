//! Outbound HTTP to the provider
//!
//! Both provider calls (the token exchange and the signed RPC call) go
//! through [`ProviderHttp`]. The production implementation is
//! [`ReqwestHttp`]; tests substitute a fake to observe or script the calls.
//!
//! Non-2xx responses are not errors at this layer: the provider reports
//! failures in the JSON body, which the callers inspect.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::MailruAuthError;

/// Minimal HTTP surface needed to talk to the provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderHttp: Send + Sync {
    /// `GET url`, returning the response body
    async fn get(&self, url: &str) -> Result<String, MailruAuthError>;

    /// `POST url` with an `application/x-www-form-urlencoded` body
    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<String, MailruAuthError>;
}

/// [`ProviderHttp`] backed by a shared `reqwest` client
///
/// Redirects are not followed.
#[derive(Debug, Clone)]
pub struct ReqwestHttp {
    client: reqwest::Client,
}

impl ReqwestHttp {
    /// Build a client with redirects disabled and a 30 second timeout
    ///
    /// # Errors
    ///
    /// Returns error if the TLS backend cannot be initialized
    pub fn new() -> Result<Self, MailruAuthError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("mailru-auth/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Use an existing client as is
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn read_body(response: reqwest::Response) -> Result<String, MailruAuthError> {
        let status = response.status();
        // query strings carry the session key, keep them out of the logs
        let endpoint = format!(
            "{}{}",
            response.url().host_str().unwrap_or_default(),
            response.url().path()
        );
        let body = response.text().await?;
        if status.is_success() {
            tracing::debug!(%endpoint, status = status.as_u16(), "Provider request completed");
        } else {
            tracing::warn!(%endpoint, status = status.as_u16(), "Provider returned non-success status");
        }
        Ok(body)
    }
}

#[async_trait]
impl ProviderHttp for ReqwestHttp {
    async fn get(&self, url: &str) -> Result<String, MailruAuthError> {
        let response = self.client.get(url).send().await?;
        Self::read_body(response).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<String, MailruAuthError> {
        let response = self.client.post(url).form(form).send().await?;
        Self::read_body(response).await
    }
}
