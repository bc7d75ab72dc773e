//! Core login flow types

use serde::{Deserialize, Serialize};

/// Application credentials issued by Mail.Ru
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// App id (`client_id` in OAuth terms, `app_id` for the RPC API)
    pub client_id: String,
    /// App secret; signs RPC calls and authenticates the token exchange
    pub client_secret: String,
}

impl ClientCredentials {
    /// Create credentials
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

/// Result of a successful code exchange
///
/// Handed to the completion handler and never stored by the flow itself.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailruToken {
    /// Access token; doubles as the RPC `session_key`
    pub access_token: String,
    /// Provider-assigned visitor id of the authenticated user
    ///
    /// Empty if the provider did not send one.
    #[serde(default)]
    pub x_mailru_vid: String,
}

impl MailruToken {
    /// Visitor id, if the provider sent one
    #[must_use]
    pub fn visitor_id(&self) -> Option<&str> {
        Some(self.x_mailru_vid.as_str()).filter(|vid| !vid.is_empty())
    }
}

impl std::fmt::Debug for MailruToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailruToken")
            .field("access_token", &"[redacted]")
            .field("x_mailru_vid", &self.x_mailru_vid)
            .finish()
    }
}

/// Callback query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// Anti-forgery state token
    pub state: Option<String>,
    /// Authorization code
    pub code: Option<String>,
    /// Error code reported by the provider
    pub error: Option<String>,
    /// Human readable error description
    pub error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_params_deserialize() {
        let params: CallbackParams =
            serde_json::from_str(r#"{"state": "42", "code": "abc"}"#).unwrap();
        assert_eq!(params.state.as_deref(), Some("42"));
        assert_eq!(params.code.as_deref(), Some("abc"));
        assert!(params.error.is_none());
    }

    #[test]
    fn test_callback_params_with_error() {
        let params: CallbackParams = serde_json::from_str(
            r#"{"state": "42", "error": "access_denied", "error_description": "User declined"}"#,
        )
        .unwrap();
        assert!(params.code.is_none());
        assert_eq!(params.error.as_deref(), Some("access_denied"));
        assert_eq!(params.error_description.as_deref(), Some("User declined"));
    }

    #[test]
    fn test_visitor_id() {
        let token = MailruToken {
            access_token: "tok".to_string(),
            x_mailru_vid: String::new(),
        };
        assert!(token.visitor_id().is_none());

        let token = MailruToken {
            x_mailru_vid: "1324730981306483817".to_string(),
            ..token
        };
        assert_eq!(token.visitor_id(), Some("1324730981306483817"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = ClientCredentials::new("app", "secret-key");
        assert!(!format!("{creds:?}").contains("secret-key"));

        let token = MailruToken {
            access_token: "access-123".to_string(),
            x_mailru_vid: "1".to_string(),
        };
        assert!(!format!("{token:?}").contains("access-123"));
    }
}
