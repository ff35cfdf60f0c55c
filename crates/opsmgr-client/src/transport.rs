//! The authenticating transport.
//!
//! Every outbound data call passes through here: the request is
//! decorated with the current session tokens, a session-expiry status
//! triggers a de-duplicated re-authentication, and the original body is
//! replayed on exactly one retry.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use tracing::{debug, info};

use opsmgr_core::error::AuthError;
use opsmgr_core::{ConnectionSettings, Error, Result, SessionTokens};

use crate::auth::{CSRF_COOKIE, CredentialExchange};
use crate::session::SessionState;

/// Non-standard status the backend uses to signal session expiry.
pub(crate) const SESSION_EXPIRED: u16 = 440;

pub(crate) struct AuthTransport {
    http: reqwest::Client,
    settings: ConnectionSettings,
    state: SessionState,
    exchange: Box<dyn CredentialExchange>,
}

impl AuthTransport {
    pub fn new(
        http: reqwest::Client,
        settings: ConnectionSettings,
        state: SessionState,
        exchange: Box<dyn CredentialExchange>,
    ) -> Self {
        Self {
            http,
            settings,
            state,
            exchange,
        }
    }

    /// Send a request with session decoration and expiry recovery.
    ///
    /// The body must already be fully serialized so the retry can
    /// replay it byte-for-byte.
    ///
    /// At most one credential exchange runs per detected expiry event,
    /// however many callers observe it concurrently: each caller
    /// compares its pre-send token snapshot against the current state
    /// under the lock, and only the caller that still sees its own
    /// snapshot re-authenticates. This is deliberate - the guarantee
    /// comes from the snapshot compare, not from a refresh-in-progress
    /// flag. The lock is held across network I/O only on this refresh
    /// path; ordinary sends snapshot and release.
    pub async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&[u8]>,
    ) -> Result<reqwest::Response> {
        let snapshot = self.state.snapshot().await;

        let response = self.issue(method.clone(), endpoint, body, &snapshot).await?;
        let status = response.status().as_u16();
        if status != SESSION_EXPIRED {
            return Ok(response);
        }

        debug!(endpoint, "session expiry status received");

        let current = {
            let mut tokens = self.state.lock().await;
            if *tokens == snapshot {
                info!("session expired, re-authenticating");
                match self.exchange.authenticate(&self.settings).await {
                    Ok(fresh) => *tokens = fresh,
                    Err(err) => {
                        return Err(AuthError::RefreshFailed {
                            original_status: status,
                            source: Box::new(err),
                        }
                        .into());
                    }
                }
            } else {
                debug!("session already refreshed by a concurrent request");
            }
            tokens.clone()
        };

        let retried = self.issue(method, endpoint, body, &current).await?;
        if retried.status().as_u16() == SESSION_EXPIRED {
            return Err(Error::SessionRetryExhausted);
        }
        Ok(retried)
    }

    async fn issue(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&[u8]>,
        tokens: &SessionTokens,
    ) -> Result<reqwest::Response> {
        let url = format!(
            "{}{}",
            self.settings.base_url().as_str().trim_end_matches('/'),
            endpoint
        );

        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, format!("Basic {}", tokens.auth_token()))
            .header(CSRF_COOKIE, tokens.csrf_token())
            .header(COOKIE, tokens.session_id())
            .header(CONTENT_TYPE, "application/json");

        if let Some(bytes) = body {
            request = request.body(bytes.to_vec());
        }

        Ok(request.send().await?)
    }
}
