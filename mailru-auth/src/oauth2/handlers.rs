//! Login flow HTTP handlers
//!
//! - `GET {path}` starts the flow: fresh state token, redirect to the dialog
//! - `GET {path}/redirect` completes it: state check, code exchange, profile
//!   lookup, completion handler

use axum::{
    extract::{Query, State},
    http::{HeaderMap, Uri},
    response::{Redirect, Response},
};
use std::sync::Arc;

use super::callbacks::{ErrorHandler, FinishHandler, FlowContext};
use super::exchange::exchange_code;
use super::http::ProviderHttp;
use super::rpc::RpcClient;
use super::state::{clear_state, verify_state, StateToken};
use super::types::{CallbackParams, ClientCredentials};
use super::urls::{dialog_url, RequestOrigin};
use crate::config::MailruConfig;
use crate::error::MailruAuthError;
use crate::session::Session;

/// Shared state of one mounted login flow
pub struct MailruFlow {
    pub(crate) config: MailruConfig,
    pub(crate) credentials: ClientCredentials,
    pub(crate) redirect_path: String,
    pub(crate) http: Arc<dyn ProviderHttp>,
    pub(crate) rpc: RpcClient,
    pub(crate) finish: Arc<dyn FinishHandler>,
    pub(crate) error: Arc<dyn ErrorHandler>,
}

impl std::fmt::Debug for MailruFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailruFlow")
            .field("config", &self.config)
            .field("redirect_path", &self.redirect_path)
            .finish_non_exhaustive()
    }
}

impl MailruFlow {
    fn origin(&self, headers: &HeaderMap, uri: &Uri) -> RequestOrigin {
        RequestOrigin::from_request(headers, uri, self.config.trust_proxy)
    }
}

/// Start the login flow
///
/// Replaces any pending state token in the session with a fresh one and
/// redirects to the provider's authorization dialog.
///
/// # Errors
///
/// Returns error if the session cannot be written or the authorize URL is
/// invalid
pub async fn initiate_login(
    State(flow): State<Arc<MailruFlow>>,
    session: Session,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Redirect, MailruAuthError> {
    let state = StateToken::generate();
    state.store(&session)?;

    let redirect_uri = flow.origin(&headers, &uri).callback_url(&flow.redirect_path);
    let url = dialog_url(
        &flow.config.endpoints.authorize_url,
        &flow.credentials.client_id,
        &redirect_uri,
        flow.config.scope.as_deref(),
        state.as_str(),
    )?;

    tracing::debug!(
        session_id = %session.id(),
        redirect_uri = %redirect_uri,
        "Redirecting to Mail.Ru authorization dialog"
    );

    Ok(Redirect::to(&url))
}

/// Complete the login flow
///
/// The state check comes first; nothing else happens on a mismatch. Once
/// the state has been accepted it is cleared whatever the outcome, so the
/// same callback URL cannot be replayed.
///
/// # Errors
///
/// - [`MailruAuthError::StateMismatch`] if `state` does not match the session
/// - whatever the [`ErrorHandler`] returns for a provider-reported error
/// - [`MailruAuthError::MissingCode`] if there is neither `error` nor `code`
/// - exchange and API failures
pub async fn handle_callback(
    State(flow): State<Arc<MailruFlow>>,
    session: Session,
    headers: HeaderMap,
    uri: Uri,
    Query(params): Query<CallbackParams>,
) -> Result<Response, MailruAuthError> {
    verify_state(&session, params.state.as_deref())?;
    clear_state(&session);

    let origin = flow.origin(&headers, &uri);
    let redirect_uri = origin.callback_url(&flow.redirect_path);
    let ctx = FlowContext {
        session,
        origin,
        redirect_uri,
        rpc: flow.rpc.clone(),
    };

    if let Some(error) = params.error.as_deref().filter(|error| !error.is_empty()) {
        tracing::warn!(
            error = %error,
            description = params.error_description.as_deref().unwrap_or_default(),
            "Mail.Ru reported an error on the callback"
        );
        return flow
            .error
            .handle_error(&ctx, error, params.error_description.as_deref())
            .await;
    }

    let code = params
        .code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or(MailruAuthError::MissingCode)?;

    let token = exchange_code(
        flow.http.as_ref(),
        &flow.config.endpoints.token_url,
        &flow.credentials,
        code,
        &ctx.redirect_uri,
    )
    .await?;

    let profile = flow.rpc.users_get_info(&token).await?;

    tracing::info!(
        session_id = %ctx.session.id(),
        x_mailru_vid = %token.x_mailru_vid,
        "User authenticated via Mail.Ru"
    );

    flow.finish.finish(&ctx, token, profile).await
}
