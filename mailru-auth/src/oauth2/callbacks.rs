//! Completion and error strategies
//!
//! The callback route ends in exactly one of two places: a [`FinishHandler`]
//! after a successful exchange and profile lookup, or an [`ErrorHandler`]
//! when the provider redirected back with `error`. Both are configured once
//! on [`MailruAuth`](super::MailruAuth) and default to
//! [`StoreInSession`] and [`FailWithDescription`].
//!
//! Plain async closures work too:
//!
//! ```rust,no_run
//! use axum::response::{IntoResponse, Redirect};
//! use mailru_auth::prelude::*;
//!
//! let auth = MailruAuth::new(MailruConfig::new("id", "secret"))
//!     .on_finish(|ctx: FlowContext, token: MailruToken, profile: serde_json::Value| async move {
//!         ctx.session.set("user", &profile)?;
//!         ctx.session.set("vid", &token.x_mailru_vid)?;
//!         Ok::<_, MailruAuthError>(Redirect::to("/dashboard").into_response())
//!     });
//! ```

use async_trait::async_trait;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::Value;
use std::future::Future;

use super::rpc::RpcClient;
use super::types::MailruToken;
use super::urls::RequestOrigin;
use crate::error::MailruAuthError;
use crate::session::Session;

/// Session key the default completion handler stores the access token under
pub const SESSION_TOKEN_KEY: &str = "token";

/// Session key the default completion handler stores the profile under
pub const SESSION_USER_KEY: &str = "user";

/// Request context handed to completion and error handlers
#[derive(Debug, Clone)]
pub struct FlowContext {
    /// Session of the request being handled
    pub session: Session,
    /// Origin the callback was received on
    pub origin: RequestOrigin,
    /// Callback URL sent to the provider for this flow
    pub redirect_uri: String,
    /// Signed API client for further calls on the user's behalf
    pub rpc: RpcClient,
}

/// Produces the response once the user is authenticated
#[async_trait]
pub trait FinishHandler: Send + Sync + 'static {
    /// Handle a completed login
    async fn finish(
        &self,
        ctx: &FlowContext,
        token: MailruToken,
        profile: Value,
    ) -> Result<Response, MailruAuthError>;
}

/// Produces the response when the provider reports an error on the callback
#[async_trait]
pub trait ErrorHandler: Send + Sync + 'static {
    /// Handle a provider-reported error such as `access_denied`
    async fn handle_error(
        &self,
        ctx: &FlowContext,
        error: &str,
        description: Option<&str>,
    ) -> Result<Response, MailruAuthError>;
}

/// Default completion: keep token and profile in the session, go home
///
/// Stores the access token under [`SESSION_TOKEN_KEY`] and the profile under
/// [`SESSION_USER_KEY`], then redirects to `/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreInSession;

#[async_trait]
impl FinishHandler for StoreInSession {
    async fn finish(
        &self,
        ctx: &FlowContext,
        token: MailruToken,
        profile: Value,
    ) -> Result<Response, MailruAuthError> {
        ctx.session.set(SESSION_TOKEN_KEY, &token.access_token)?;
        ctx.session.set(SESSION_USER_KEY, &profile)?;
        Ok(Redirect::to("/").into_response())
    }
}

/// Default error handling: fail the request with the provider's description
#[derive(Debug, Clone, Copy, Default)]
pub struct FailWithDescription;

#[async_trait]
impl ErrorHandler for FailWithDescription {
    async fn handle_error(
        &self,
        _ctx: &FlowContext,
        error: &str,
        description: Option<&str>,
    ) -> Result<Response, MailruAuthError> {
        let message = description.filter(|d| !d.is_empty()).unwrap_or(error);
        Err(MailruAuthError::ProviderError(message.to_string()))
    }
}

/// [`FinishHandler`] adapter for async closures
pub struct FinishFn<F>(pub F);

#[async_trait]
impl<F, Fut> FinishHandler for FinishFn<F>
where
    F: Fn(FlowContext, MailruToken, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, MailruAuthError>> + Send + 'static,
{
    async fn finish(
        &self,
        ctx: &FlowContext,
        token: MailruToken,
        profile: Value,
    ) -> Result<Response, MailruAuthError> {
        (self.0)(ctx.clone(), token, profile).await
    }
}

/// [`ErrorHandler`] adapter for async closures
pub struct ErrorFn<F>(pub F);

#[async_trait]
impl<F, Fut> ErrorHandler for ErrorFn<F>
where
    F: Fn(FlowContext, String, Option<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, MailruAuthError>> + Send + 'static,
{
    async fn handle_error(
        &self,
        ctx: &FlowContext,
        error: &str,
        description: Option<&str>,
    ) -> Result<Response, MailruAuthError> {
        (self.0)(ctx.clone(), error.to_string(), description.map(str::to_string)).await
    }
}
