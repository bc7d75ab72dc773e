//! "Login with Mail.Ru" OAuth2 flow
//!
//! Mounts two routes on an axum application:
//!
//! - `GET {path}` stores a fresh anti-forgery state token in the session and
//!   redirects the browser to the Mail.Ru authorization dialog
//! - `GET {path}/redirect` validates the echoed state, exchanges the code for
//!   an access token, fetches the user's profile with a signed REST call and
//!   hands both to the completion handler
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use mailru_auth::prelude::*;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = MailruConfig::load_for_service("my-app")?;
//! let sessions = SessionLayer::new(MemorySessionStore::new());
//!
//! let app = Router::new().route("/", get(|| async { "Hello" }));
//! let app = mailru(app, MailruAuth::new(config))?.layer(sessions);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Security Considerations
//!
//! - **State Tokens**: 32 random bytes per initiation, single use; a callback
//!   whose `state` does not match the session is rejected before any call to
//!   the provider
//! - **Secrets**: the client secret only leaves the process in the token
//!   exchange body; RPC calls send an MD5 signature instead
//! - **Tunnels**: callbacks on ngrok hosts are always built with `https`

pub mod callbacks;
pub mod exchange;
pub mod handlers;
pub mod http;
pub mod routes;
pub mod rpc;
pub mod state;
pub mod types;
pub mod urls;

pub use callbacks::{
    ErrorFn, ErrorHandler, FailWithDescription, FinishFn, FinishHandler, FlowContext,
    StoreInSession, SESSION_TOKEN_KEY, SESSION_USER_KEY,
};
pub use exchange::exchange_code;
pub use handlers::{handle_callback, initiate_login, MailruFlow};
pub use http::{ProviderHttp, ReqwestHttp};
pub use routes::{mailru, MailruAuth};
pub use rpc::{canonical_string, sign, RpcClient, SignedRequest, USERS_GET_INFO};
pub use state::{state_matches, StateToken, SESSION_STATE_KEY};
pub use types::{CallbackParams, ClientCredentials, MailruToken};
pub use urls::{dialog_url, is_tunnel_host, RequestOrigin};
