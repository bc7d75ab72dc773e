//! Shared fixtures for the login flow integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use mailru_auth::prelude::*;
use mailru_auth::session::{SessionData, SessionId, SESSION_COOKIE_NAME};
use parking_lot::Mutex;
use std::sync::Arc;

pub const TOKEN_URL: &str = "https://connect.mail.ru/oauth/token";
pub const API_URL: &str = "https://www.appsmail.ru/platform/api";

/// One outbound provider request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(String),
    PostForm(String, Vec<(String, String)>),
}

/// Scripted provider that records every request
#[derive(Clone)]
pub struct FakeProvider {
    token_body: String,
    api_body: String,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeProvider {
    pub fn new(token_body: impl Into<String>, api_body: impl Into<String>) -> Self {
        Self {
            token_body: token_body.into(),
            api_body: api_body.into(),
            calls: Arc::default(),
        }
    }

    /// Provider that answers the happy path
    pub fn ok() -> Self {
        Self::new(
            r#"{"access_token":"tok","x_mailru_vid":"1234"}"#,
            r#"[{"uid":"1234","first_name":"Ivan","email":"ivan@mail.ru"}]"#,
        )
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn token_calls(&self) -> Vec<Vec<(String, String)>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::PostForm(_, form) => Some(form),
                Call::Get(_) => None,
            })
            .collect()
    }

    pub fn api_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Get(url) => Some(url),
                Call::PostForm(..) => None,
            })
            .collect()
    }
}

#[async_trait]
impl ProviderHttp for FakeProvider {
    async fn get(&self, url: &str) -> Result<String, MailruAuthError> {
        self.calls.lock().push(Call::Get(url.to_string()));
        Ok(self.api_body.clone())
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<String, MailruAuthError> {
        self.calls
            .lock()
            .push(Call::PostForm(url.to_string(), form.to_vec()));
        Ok(self.token_body.clone())
    }
}

pub fn config() -> MailruConfig {
    MailruConfig::new("app-1", "secret-1")
}

/// Login routes wired to `provider` and `store`
pub fn app(auth: MailruAuth, provider: &FakeProvider, store: &MemorySessionStore) -> Router {
    auth.with_http_client(provider.clone())
        .with_session_layer(SessionLayer::new(store.clone()))
        .into_router()
        .unwrap()
}

/// Persist a session holding `values` and return its id
pub async fn seed_session(
    store: &MemorySessionStore,
    values: &[(&str, serde_json::Value)],
) -> SessionId {
    let id = SessionId::generate();
    let mut data = SessionData::default();
    for (key, value) in values {
        data.insert(*key, value).unwrap();
    }
    store.save(&id, data).await.unwrap();
    id
}

pub async fn load_session(store: &MemorySessionStore, id: &SessionId) -> SessionData {
    store.load(id).await.unwrap().unwrap()
}

pub fn get(uri: &str, session: &SessionId) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("host", "localhost:3000")
        .header("cookie", format!("{SESSION_COOKIE_NAME}={session}"))
        .body(Body::empty())
        .unwrap()
}

pub fn form_value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
    form.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub fn query_param(url: &str, key: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
