//! Connection settings for the Operations Manager backend.

use std::fmt;

use serde::Deserialize;
use url::Url;

use crate::error::Error;
use crate::Result;

/// Default bound on concurrent fan-out units per batch.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Which credential-exchange strategy to use for login.
///
/// The backend historically accepts more than one scheme; the selector
/// keeps the choice a configuration point rather than a code change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// Basic authorization with the backend's custom login payload.
    #[default]
    Basic,
}

/// Immutable connection settings for one client instance.
///
/// Deserializes from the backend configuration JSON (camelCase field
/// names). The secret is never exposed in Debug output.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSettings {
    url: Url,
    user_name: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    is_skip_tls_verify_check: bool,
    #[serde(default)]
    auth_scheme: AuthScheme,
    #[serde(default = "default_max_concurrency")]
    max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl ConnectionSettings {
    /// Create settings from a base address, username, and secret.
    ///
    /// The base address and username must be non-empty; an empty
    /// secret is accepted here and surfaces downstream as an
    /// authentication rejection.
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self> {
        let username = username.into();
        if base_url.trim().is_empty() {
            return Err(Error::InvalidSettings("base address is required".into()));
        }
        if username.trim().is_empty() {
            return Err(Error::InvalidSettings("username is required".into()));
        }
        let url = Url::parse(base_url)
            .map_err(|err| Error::InvalidSettings(format!("base address: {err}")))?;

        Ok(Self {
            url,
            user_name: username,
            password: secret.into(),
            is_skip_tls_verify_check: false,
            auth_scheme: AuthScheme::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        })
    }

    /// Disable TLS certificate verification for this connection.
    pub fn with_skip_tls_verify(mut self, skip: bool) -> Self {
        self.is_skip_tls_verify_check = skip;
        self
    }

    /// Select the credential-exchange scheme.
    pub fn with_auth_scheme(mut self, scheme: AuthScheme) -> Self {
        self.auth_scheme = scheme;
        self
    }

    /// Bound the number of concurrent fan-out units per batch.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    /// The backend base address.
    pub fn base_url(&self) -> &Url {
        &self.url
    }

    pub fn username(&self) -> &str {
        &self.user_name
    }

    /// The login secret.
    ///
    /// # Security
    ///
    /// Use only when constructing authentication requests. Never log
    /// or display this value.
    pub fn secret(&self) -> &str {
        &self.password
    }

    pub fn skip_tls_verify(&self) -> bool {
        self.is_skip_tls_verify_check
    }

    pub fn auth_scheme(&self) -> AuthScheme {
        self.auth_scheme
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

// Intentionally hide the secret in Debug output
impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("url", &self.url.as_str())
            .field("user_name", &self.user_name)
            .field("password", &"[REDACTED]")
            .field("is_skip_tls_verify_check", &self.is_skip_tls_verify_check)
            .field("auth_scheme", &self.auth_scheme)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_require_base_address_and_username() {
        assert!(ConnectionSettings::new("", "admin", "pw").is_err());
        assert!(ConnectionSettings::new("https://scom.local", "", "pw").is_err());
        assert!(ConnectionSettings::new("not a url", "admin", "pw").is_err());
    }

    #[test]
    fn empty_secret_is_accepted() {
        let settings = ConnectionSettings::new("https://scom.local", "admin", "").unwrap();
        assert_eq!(settings.secret(), "");
    }

    #[test]
    fn settings_hide_secret_in_debug() {
        let settings = ConnectionSettings::new("https://scom.local", "admin", "hunter2").unwrap();
        let debug = format!("{:?}", settings);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn settings_deserialize_from_backend_json() {
        let settings: ConnectionSettings = serde_json::from_str(
            r#"{
                "url": "https://scom.local",
                "userName": "CONTOSO\\admin",
                "password": "pw",
                "isSkipTlsVerifyCheck": true
            }"#,
        )
        .unwrap();
        assert_eq!(settings.username(), "CONTOSO\\admin");
        assert!(settings.skip_tls_verify());
        assert_eq!(settings.max_concurrency(), DEFAULT_MAX_CONCURRENCY);
    }

    #[test]
    fn concurrency_limit_is_never_zero() {
        let settings = ConnectionSettings::new("https://scom.local", "admin", "pw")
            .unwrap()
            .with_max_concurrency(0);
        assert_eq!(settings.max_concurrency(), 1);
    }
}
