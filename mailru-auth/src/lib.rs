//! mailru-auth: "Login with Mail.Ru" for axum applications
//!
//! Adds the Mail.Ru OAuth2 authorization-code flow to a router: an
//! initiation route that redirects to the provider's dialog, and a callback
//! route that exchanges the code, looks up the user's profile through the
//! signed Mail.Ru REST API and passes the result to a configurable
//! completion handler.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mailru_auth::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     mailru_auth::observability::init()?;
//!
//!     let config = MailruConfig::new("123456", "app-secret");
//!     let app = axum::Router::new().route("/", axum::routing::get(index));
//!     let app = mailru(app, MailruAuth::new(config))?
//!         .layer(SessionLayer::new(MemorySessionStore::new()));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//!
//! async fn index(session: Session) -> String {
//!     match session.get_value("user") {
//!         Some(user) => format!("Hello, {user}"),
//!         None => "Not logged in".to_string(),
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod oauth2;
pub mod observability;
pub mod session;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use mailru_auth::prelude::*;
    //! ```

    pub use crate::config::{Endpoints, MailruConfig};
    pub use crate::error::MailruAuthError;
    pub use crate::oauth2::{
        mailru, ErrorHandler, FinishHandler, FlowContext, MailruAuth, MailruToken, ProviderHttp,
        RequestOrigin, RpcClient, SignedRequest,
    };
    pub use crate::session::{MemorySessionStore, Session, SessionConfig, SessionLayer, SessionStore};
}
