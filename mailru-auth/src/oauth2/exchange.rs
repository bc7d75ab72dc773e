//! Authorization code exchange

use serde::Deserialize;
use serde_json::Value;

use super::http::ProviderHttp;
use super::types::{ClientCredentials, MailruToken};
use crate::error::MailruAuthError;

/// Raw token endpoint response
///
/// Mail.Ru answers both success and failure with a JSON object; failures
/// carry `error` and usually `error_description`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    /// Sent as a string, but older API versions emit a number
    x_mailru_vid: Option<Value>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchange an authorization code for an access token
///
/// POSTs `client_id`, `client_secret`, `grant_type=authorization_code`,
/// `code` and `redirect_uri` to `token_url`. The `redirect_uri` must be the
/// exact value sent to the authorization dialog.
///
/// # Errors
///
/// - [`MailruAuthError::ExchangeFailure`] if the provider reports an error or
///   sends no access token
/// - [`MailruAuthError::InvalidResponse`] if the body is not JSON
/// - [`MailruAuthError::Http`] on transport failure
pub async fn exchange_code(
    http: &dyn ProviderHttp,
    token_url: &str,
    credentials: &ClientCredentials,
    code: &str,
    redirect_uri: &str,
) -> Result<MailruToken, MailruAuthError> {
    let form = [
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri),
    ]
    .map(|(k, v)| (k.to_string(), v.to_string()));

    let body = http.post_form(token_url, &form).await?;
    let response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
        MailruAuthError::InvalidResponse(format!("token response is not valid JSON: {e}"))
    })?;

    if let Some(error) = response.error {
        let message = match response.error_description {
            Some(description) if !description.is_empty() => format!("{error}: {description}"),
            _ => error,
        };
        tracing::warn!(error = %message, "Token endpoint rejected the authorization code");
        return Err(MailruAuthError::ExchangeFailure(message));
    }

    let access_token = response
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            MailruAuthError::ExchangeFailure("token response has no access_token".to_string())
        })?;

    let x_mailru_vid = match response.x_mailru_vid {
        Some(Value::String(vid)) => vid,
        Some(Value::Number(vid)) => vid.to_string(),
        _ => String::new(),
    };

    tracing::debug!(x_mailru_vid = %x_mailru_vid, "Authorization code exchanged");

    Ok(MailruToken {
        access_token,
        x_mailru_vid,
    })
}
