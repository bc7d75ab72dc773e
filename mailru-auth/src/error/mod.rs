//! Error types and error handling
//!
//! Every failure in the login flow is surfaced as a [`MailruAuthError`]. The
//! error converts into an HTTP response so handlers can return it directly;
//! applications that want a friendlier page for provider-reported errors
//! should install an [`ErrorHandler`](crate::oauth2::ErrorHandler) instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::session::SessionError;

/// Login flow error type
#[derive(Debug, Error)]
pub enum MailruAuthError {
    /// Callback `state` does not match the value stored in the session
    #[error("The state is incorrect.")]
    StateMismatch,

    /// Provider reported an error on the callback (e.g. the user declined)
    #[error("{0}")]
    ProviderError(String),

    /// Callback arrived without an authorization code
    #[error("Code Not Found.")]
    MissingCode,

    /// Token endpoint rejected the authorization code
    #[error("Token exchange failed: {0}")]
    ExchangeFailure(String),

    /// Signed RPC call returned an API error
    #[error("API error: {0}")]
    ApiError(String),

    /// Transport-level failure talking to the provider
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider response was not the JSON we expected
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Session store or serialization error
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// No session attached to the request
    #[error("Session not initialized; add a SessionLayer to the router")]
    SessionMissing,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MailruAuthError {
    /// HTTP status code used when this error becomes a response
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::StateMismatch | Self::MissingCode => StatusCode::BAD_REQUEST,
            Self::ExchangeFailure(_)
            | Self::ApiError(_)
            | Self::Http(_)
            | Self::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            Self::ProviderError(_)
            | Self::Session(_)
            | Self::SessionMissing
            | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MailruAuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Mail.Ru login failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Mail.Ru login rejected");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_request() {
        assert_eq!(
            MailruAuthError::StateMismatch.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MailruAuthError::MissingCode.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_provider_failures_are_bad_gateway() {
        assert_eq!(
            MailruAuthError::ApiError("quota exceeded".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            MailruAuthError::ExchangeFailure("invalid_grant".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_default_error_callback_is_server_error() {
        let err = MailruAuthError::ProviderError("User declined".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "User declined");
    }

    #[test]
    fn test_into_response_uses_status() {
        let response = MailruAuthError::StateMismatch.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
