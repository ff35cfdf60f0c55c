//! Session token set for authenticated backend requests.

use std::fmt;

/// The token triple that authorizes a request against the backend.
///
/// All three fields come out of a single credential exchange: the
/// session cookie and anti-forgery token from the login response, the
/// authorization token derived from the credentials. A set with any
/// empty field is incomplete and must never be installed as the
/// current session.
///
/// # Security
///
/// Token values are never exposed in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
    session_id: String,
    csrf_token: String,
    auth_token: String,
}

impl SessionTokens {
    /// Create a new token set.
    pub fn new(
        session_id: impl Into<String>,
        csrf_token: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            csrf_token: csrf_token.into(),
            auth_token: auth_token.into(),
        }
    }

    /// The session cookie, in `Name=value` form, sent as the `Cookie` header.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The decoded anti-forgery token, sent as the CSRF header.
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    /// The authorization token, sent as a Basic authorization header.
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// True when all three fields are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.session_id.is_empty() && !self.csrf_token.is_empty() && !self.auth_token.is_empty()
    }
}

// Hide token values in Debug output
impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("session_id", &"[REDACTED]")
            .field("csrf_token", &"[REDACTED]")
            .field("auth_token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_hide_values_in_debug() {
        let tokens = SessionTokens::new("SCOMSessionId=abc123", "csrf-value", "basic-token");
        let debug = format!("{:?}", tokens);
        assert!(!debug.contains("abc123"));
        assert!(!debug.contains("csrf-value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn completeness_requires_all_three_fields() {
        assert!(SessionTokens::new("s", "c", "a").is_complete());
        assert!(!SessionTokens::new("", "c", "a").is_complete());
        assert!(!SessionTokens::new("s", "", "a").is_complete());
        assert!(!SessionTokens::new("s", "c", "").is_complete());
    }
}
