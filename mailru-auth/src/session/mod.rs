//! Cookie sessions for the login flow
//!
//! The login routes keep exactly one value of their own in the session: the
//! anti-forgery `state` token, written by the initiation route and consumed
//! by the callback. The default completion handler additionally stores the
//! access token (`token`) and the profile (`user`).
//!
//! Any [`SessionStore`] can back the layer. Install it either globally:
//!
//! ```rust,no_run
//! use mailru_auth::session::{MemorySessionStore, SessionLayer};
//! use axum::{Router, routing::get};
//!
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "Hello" }))
//!     .layer(SessionLayer::new(MemorySessionStore::new()));
//! ```
//!
//! or hand it to [`MailruAuth::with_session_layer`](crate::oauth2::MailruAuth::with_session_layer)
//! so that only the login routes are wrapped.

pub mod cookie;
pub mod data;
pub mod handle;
pub mod middleware;
pub mod store;

pub use cookie::{SameSite, SessionConfig, SESSION_COOKIE_NAME};
pub use data::{SessionData, SessionError, SessionId};
pub use handle::Session;
pub use middleware::{SessionLayer, SessionMiddleware};
pub use store::{MemorySessionStore, SessionStore};
