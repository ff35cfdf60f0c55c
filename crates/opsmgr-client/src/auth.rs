//! Credential exchange against the backend's login endpoint.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use reqwest::header::{CONTENT_TYPE, HeaderMap, SET_COOKIE};
use tracing::{debug, instrument};

use opsmgr_core::error::AuthError;
use opsmgr_core::{ConnectionSettings, Result, SessionTokens};

use crate::endpoints;

/// Cookie carrying the session identifier.
pub const SESSION_COOKIE: &str = "SCOMSessionId";

/// Cookie carrying the percent-encoded anti-forgery token.
pub const CSRF_COOKIE: &str = "SCOM-CSRF-TOKEN";

/// A login strategy producing a complete session token set.
///
/// Exactly one exchange runs per detected expiry event; retry policy
/// lives in the transport, never here. Implementations must not touch
/// session state - the caller installs the result.
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    async fn authenticate(&self, settings: &ConnectionSettings) -> Result<SessionTokens>;
}

/// The Basic-authorization exchange with the backend's login payload.
///
/// Sends the base64 `"Windows"` authentication-mode body with a Basic
/// authorization header and reads the session and anti-forgery cookies
/// off the response.
#[derive(Debug, Clone)]
pub struct BasicExchange {
    http: reqwest::Client,
}

impl BasicExchange {
    /// Create an exchange over an already configured HTTP client.
    ///
    /// The client is expected to carry the timeout and TLS settings for
    /// this connection.
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CredentialExchange for BasicExchange {
    #[instrument(skip(self, settings), fields(base = %settings.base_url()))]
    async fn authenticate(&self, settings: &ConnectionSettings) -> Result<SessionTokens> {
        debug!("performing credential exchange");

        let url = format!(
            "{}{}",
            settings.base_url().as_str().trim_end_matches('/'),
            endpoints::AUTHENTICATE
        );

        // The backend expects the authentication mode as a quoted
        // base64 JSON string.
        let payload = format!("'{}'", STANDARD.encode(b"Windows"));

        let response = self
            .http
            .post(url)
            .basic_auth(settings.username(), Some(settings.secret()))
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
            }
            .into());
        }

        let session_id = cookie_value(response.headers(), SESSION_COOKIE)
            .map(|value| format!("{SESSION_COOKIE}={value}"));
        let csrf_token = cookie_value(response.headers(), CSRF_COOKIE).and_then(|value| {
            percent_decode_str(&value)
                .decode_utf8()
                .ok()
                .map(|decoded| decoded.into_owned())
        });

        let (Some(session_id), Some(csrf_token)) = (session_id, csrf_token) else {
            return Err(AuthError::IncompleteSession.into());
        };

        let auth_token =
            STANDARD.encode(format!("{}:{}", settings.username(), settings.secret()));

        let tokens = SessionTokens::new(session_id, csrf_token, auth_token);
        if !tokens.is_complete() {
            return Err(AuthError::IncompleteSession.into());
        }

        debug!("credential exchange succeeded");
        Ok(tokens)
    }
}

/// Extract a named cookie's value from the `Set-Cookie` response headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get_all(SET_COOKIE).iter().find_map(|header| {
        let cookie = header.to_str().ok()?;
        let (pair, _) = cookie.split_once(';').unwrap_or((cookie, ""));
        let (cookie_name, value) = pair.split_once('=')?;
        if cookie_name.trim() == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}
