//! Route registration

use axum::{response::Response, routing::get, Router};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use super::callbacks::{
    ErrorFn, ErrorHandler, FailWithDescription, FinishFn, FinishHandler, FlowContext,
    StoreInSession,
};
use super::handlers::{handle_callback, initiate_login, MailruFlow};
use super::http::{ProviderHttp, ReqwestHttp};
use super::rpc::RpcClient;
use super::types::{ClientCredentials, MailruToken};
use crate::config::MailruConfig;
use crate::error::MailruAuthError;
use crate::session::SessionLayer;

/// Builder for the Mail.Ru login routes
///
/// ```rust,no_run
/// use axum::Router;
/// use mailru_auth::prelude::*;
///
/// # fn example() -> Result<(), MailruAuthError> {
/// let config = MailruConfig::new("123456", "app-secret").with_scope("stream");
/// let app: Router = MailruAuth::new(config)
///     .with_session_layer(SessionLayer::new(MemorySessionStore::new()))
///     .into_router()?;
/// # Ok(())
/// # }
/// ```
pub struct MailruAuth {
    config: MailruConfig,
    http: Option<Arc<dyn ProviderHttp>>,
    finish: Arc<dyn FinishHandler>,
    error: Arc<dyn ErrorHandler>,
    session_layer: Option<SessionLayer>,
}

impl std::fmt::Debug for MailruAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailruAuth")
            .field("config", &self.config)
            .field("session_layer", &self.session_layer)
            .finish_non_exhaustive()
    }
}

impl MailruAuth {
    /// Login routes with the default completion and error handlers
    #[must_use]
    pub fn new(config: MailruConfig) -> Self {
        Self {
            config,
            http: None,
            finish: Arc::new(StoreInSession),
            error: Arc::new(FailWithDescription),
            session_layer: None,
        }
    }

    /// Use a specific HTTP client for provider calls
    #[must_use]
    pub fn with_http_client(mut self, http: impl ProviderHttp + 'static) -> Self {
        self.http = Some(Arc::new(http));
        self
    }

    /// Replace the completion handler
    #[must_use]
    pub fn with_finish(mut self, handler: impl FinishHandler) -> Self {
        self.finish = Arc::new(handler);
        self
    }

    /// Replace the completion handler with an async closure
    #[must_use]
    pub fn on_finish<F, Fut>(self, f: F) -> Self
    where
        F: Fn(FlowContext, MailruToken, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, MailruAuthError>> + Send + 'static,
    {
        self.with_finish(FinishFn(f))
    }

    /// Replace the error handler
    #[must_use]
    pub fn with_error(mut self, handler: impl ErrorHandler) -> Self {
        self.error = Arc::new(handler);
        self
    }

    /// Replace the error handler with an async closure
    #[must_use]
    pub fn on_error<F, Fut>(self, f: F) -> Self
    where
        F: Fn(FlowContext, String, Option<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, MailruAuthError>> + Send + 'static,
    {
        self.with_error(ErrorFn(f))
    }

    /// Wrap only the login routes in a session layer
    ///
    /// Leave unset when the application already installs a
    /// [`SessionLayer`] around the whole router.
    #[must_use]
    pub fn with_session_layer(mut self, layer: SessionLayer) -> Self {
        self.session_layer = Some(layer);
        self
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &MailruConfig {
        &self.config
    }

    /// Build the router serving `GET {path}` and `GET {path}/redirect`
    ///
    /// Missing credentials are logged as warnings and do not fail here.
    ///
    /// # Errors
    ///
    /// Returns error if the path is invalid or the default HTTP client cannot
    /// be built
    pub fn into_router<S>(self) -> Result<Router<S>, MailruAuthError>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.config.validate()?;
        self.config.warn_missing_credentials();

        let http: Arc<dyn ProviderHttp> = match self.http {
            Some(http) => http,
            None => Arc::new(ReqwestHttp::new()?),
        };
        let credentials =
            ClientCredentials::new(self.config.client_id.clone(), self.config.client_secret.clone());
        let rpc = RpcClient::new(
            http.clone(),
            self.config.endpoints.api_url.clone(),
            credentials.clone(),
        );
        let path = self.config.path.clone();
        let redirect_path = self.config.redirect_path();

        tracing::info!(path = %path, redirect_path = %redirect_path, "Mounting Mail.Ru login routes");

        let flow = Arc::new(MailruFlow {
            config: self.config,
            credentials,
            redirect_path: redirect_path.clone(),
            http,
            rpc,
            finish: self.finish,
            error: self.error,
        });

        let mut router = Router::new()
            .route(&path, get(initiate_login))
            .route(&redirect_path, get(handle_callback));

        if let Some(layer) = self.session_layer {
            router = router.route_layer(layer);
        }

        Ok(router.with_state(flow))
    }
}

/// Register the login routes on an existing router
///
/// # Errors
///
/// Same as [`MailruAuth::into_router`]
pub fn mailru<S>(router: Router<S>, auth: MailruAuth) -> Result<Router<S>, MailruAuthError>
where
    S: Clone + Send + Sync + 'static,
{
    Ok(router.merge(auth.into_router::<S>()?))
}
