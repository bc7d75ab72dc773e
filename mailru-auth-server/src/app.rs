//! Demo application routes

use axum::{
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Router,
};
use mailru_auth::oauth2::{SESSION_TOKEN_KEY, SESSION_USER_KEY};
use mailru_auth::prelude::*;
use tower_http::trace::TraceLayer;

/// Full application: demo pages, login routes, sessions and request tracing
pub fn build(auth: MailruAuth, sessions: SessionLayer) -> Result<Router, MailruAuthError> {
    let login_path = auth.config().path.clone();
    let pages = Router::new()
        .route(
            "/",
            get(move |session: Session| index(session, login_path.clone())),
        )
        .route("/logout", get(logout));

    Ok(mailru(pages, auth)?
        .layer(sessions)
        .layer(TraceLayer::new_for_http()))
}

async fn index(session: Session, login_path: String) -> Html<String> {
    match session.get_value(SESSION_USER_KEY) {
        Some(user) => {
            let pretty = serde_json::to_string_pretty(&user).unwrap_or_default();
            Html(format!(
                "<h1>Logged in</h1><pre>{}</pre><p><a href=\"/logout\">Log out</a></p>",
                escape(&pretty)
            ))
        }
        None => Html(format!(
            "<h1>Not logged in</h1><p><a href=\"{}\">Login with Mail.Ru</a></p>",
            escape(&login_path)
        )),
    }
}

async fn logout(session: Session) -> impl IntoResponse {
    session.remove(SESSION_TOKEN_KEY);
    session.remove(SESSION_USER_KEY);
    tracing::info!(session_id = %session.id(), "Logged out");
    Redirect::to("/")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
