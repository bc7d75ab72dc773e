//! Tower layer that attaches a [`Session`] to every request
//!
//! Per request: resolve the session from the cookie (a fresh one if the
//! cookie is missing, unknown or expired), expose it to handlers through
//! request extensions, run the inner service, then persist the session.
//! Every save slides the expiry and re-sends the cookie so its `Max-Age`
//! tracks the stored session. A fresh session that the handler left empty is
//! dropped without a cookie.

use axum::{
    extract::Request,
    http::header::SET_COOKIE,
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use super::cookie::SessionConfig;
use super::data::{SessionData, SessionId};
use super::handle::Session;
use super::store::SessionStore;

/// Layer installing [`SessionMiddleware`]
#[derive(Clone)]
pub struct SessionLayer {
    store: Arc<dyn SessionStore>,
    config: Arc<SessionConfig>,
}

impl SessionLayer {
    /// Sessions in `store` with default cookie settings
    #[must_use]
    pub fn new(store: impl SessionStore) -> Self {
        Self::with_config(store, SessionConfig::default())
    }

    /// Sessions in `store` with custom cookie settings
    #[must_use]
    pub fn with_config(store: impl SessionStore, config: SessionConfig) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }

    /// Cookie settings in use
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl std::fmt::Debug for SessionLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLayer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = SessionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionMiddleware {
            inner,
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

/// Service produced by [`SessionLayer`]
#[derive(Clone)]
pub struct SessionMiddleware<S> {
    inner: S,
    store: Arc<dyn SessionStore>,
    config: Arc<SessionConfig>,
}

impl<S> std::fmt::Debug for SessionMiddleware<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMiddleware")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S> Service<Request> for SessionMiddleware<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        // the clone has not been polled ready; hand the ready one to this call
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let store = Arc::clone(&self.store);
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            let cookie_id = config.read_cookie(req.headers());
            let (id, data, fresh) = resolve(store.as_ref(), cookie_id).await;
            let session = Session::new(id, data);
            req.extensions_mut().insert(session.clone());

            let mut response = inner.call(req).await?;

            let mut data = session.snapshot();
            if fresh && data.is_empty() {
                return Ok(response);
            }
            data.renew(config.max_age_secs);
            if let Err(e) = store.save(&id, data).await {
                tracing::error!(error = %e, session_id = %id, "Failed to save session");
                return Ok(response);
            }
            if let Some(cookie) = config.cookie_header(&id) {
                response.headers_mut().append(SET_COOKIE, cookie);
            }
            Ok(response)
        })
    }
}

/// Existing session for the cookie's id, or a fresh one
async fn resolve(
    store: &dyn SessionStore,
    cookie_id: Option<SessionId>,
) -> (SessionId, SessionData, bool) {
    if let Some(id) = cookie_id {
        match store.load(&id).await {
            Ok(Some(data)) => return (id, data, false),
            Ok(None) => tracing::debug!(session_id = %id, "Unknown or expired session"),
            Err(e) => tracing::warn!(error = %e, session_id = %id, "Failed to load session"),
        }
    }
    (SessionId::generate(), SessionData::default(), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySessionStore, SESSION_COOKIE_NAME};
    use axum::{body::Body, http::header::COOKIE, routing::get, Router};
    use tower::ServiceExt;

    fn app(store: &MemorySessionStore) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route(
                "/write",
                get(|session: Session| async move {
                    session.set("state", "abc").unwrap();
                    "ok"
                }),
            )
            .layer(SessionLayer::new(store.clone()))
    }

    fn set_cookie_id(response: &Response) -> SessionId {
        let header = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        header
            .strip_prefix(&format!("{SESSION_COOKIE_NAME}="))
            .and_then(|rest| rest.split(';').next())
            .unwrap()
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn test_untouched_fresh_session_is_not_saved() {
        let store = MemorySessionStore::new();
        let response = app(&store)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.headers().get(SET_COOKIE).is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_written_session_is_saved_with_cookie() {
        let store = MemorySessionStore::new();
        let response = app(&store)
            .oneshot(Request::builder().uri("/write").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = set_cookie_id(&response);
        let saved = store.load(&id).await.unwrap().unwrap();
        assert_eq!(saved.get::<String>("state").as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_known_cookie_reuses_session_and_refreshes_cookie() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();
        let mut data = SessionData::default();
        data.insert("token", "tok").unwrap();
        store.save(&id, data).await.unwrap();

        let response = app(&store)
            .oneshot(
                Request::builder()
                    .uri("/write")
                    .header(COOKIE, format!("{SESSION_COOKIE_NAME}={id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(set_cookie_id(&response), id);
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=86400"));
        let saved = store.load(&id).await.unwrap().unwrap();
        assert_eq!(saved.get::<String>("token").as_deref(), Some("tok"));
        assert_eq!(saved.get::<String>("state").as_deref(), Some("abc"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_cookie_starts_fresh_session() {
        let store = MemorySessionStore::new();
        let stale = SessionId::generate();

        let response = app(&store)
            .oneshot(
                Request::builder()
                    .uri("/write")
                    .header(COOKIE, format!("{SESSION_COOKIE_NAME}={stale}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_ne!(set_cookie_id(&response), stale);
        assert!(store.load(&stale).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_abandoned_sessions_do_not_accumulate() {
        let store = MemorySessionStore::new();
        let config = SessionConfig {
            max_age_secs: 0,
            ..SessionConfig::default()
        };
        let app = Router::new()
            .route(
                "/write",
                get(|session: Session| async move {
                    session.set("state", "abc").unwrap();
                    "ok"
                }),
            )
            .layer(SessionLayer::with_config(store.clone(), config));

        for _ in 0..200 {
            let response = app
                .clone()
                .oneshot(Request::builder().uri("/write").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert!(response.headers().get(SET_COOKIE).is_some());
        }

        assert_eq!(store.len(), 1);
    }
}
