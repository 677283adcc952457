//! OAuth2 token model
//!
//! The token endpoint's response carries standard OAuth2 fields plus
//! non-standard extras; for OIDC the extra that matters is `id_token`.
//! [`RawExtraFields`] captures every extra verbatim, [`StandardToken`] is the
//! owned value handed back to callers, and the [`OAuth2Token`] trait is the
//! narrow view [`verify_id_token`](crate::client::Client::verify_id_token)
//! consumes, so tests can substitute token doubles.

use std::collections::HashMap;
use std::time::SystemTime;

use oauth2::basic::BasicTokenType;
use oauth2::{ExtraTokenFields, StandardTokenResponse, TokenResponse};
use serde::{Deserialize, Serialize};

/// Non-standard fields of a token endpoint response, keyed by field name
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExtraFields {
    #[serde(flatten)]
    fields: HashMap<String, serde_json::Value>,
}

impl ExtraTokenFields for RawExtraFields {}

/// Token endpoint response with extras preserved
pub type OidcTokenResponse = StandardTokenResponse<RawExtraFields, BasicTokenType>;

/// Minimal view of an exchanged OAuth2 token.
///
/// This is the token seam: [`StandardToken`] implements it for real
/// exchanges, and tests may substitute any other implementor.
pub trait OAuth2Token: Send + Sync {
    /// Look up a non-standard response field (e.g. `id_token`) by name
    fn extra(&self, field: &str) -> Option<&serde_json::Value>;

    /// Whether the token is usable: non-empty access token and not expired
    fn is_valid(&self) -> bool;
}

/// OAuth2 access token produced by the authorization-code exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardToken {
    /// Access token
    pub access_token: String,
    /// Token type (usually bearer)
    pub token_type: BasicTokenType,
    /// Refresh token (if provided)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When the token expires, computed from `expires_in` at exchange time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<SystemTime>,
    /// OAuth2 scopes granted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    /// Non-standard response fields (carries `id_token` for OIDC providers)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

impl StandardToken {
    /// Convert a wire-level token response into an owned token.
    ///
    /// The relative `expires_in` lifetime is pinned to an absolute
    /// `expires_at` against the current clock.
    #[must_use]
    pub fn from_response(response: &OidcTokenResponse) -> Self {
        Self {
            access_token: response.access_token().secret().clone(),
            token_type: response.token_type().clone(),
            refresh_token: response.refresh_token().map(|t| t.secret().clone()),
            expires_at: response.expires_in().map(|lifetime| SystemTime::now() + lifetime),
            scopes: response
                .scopes()
                .map(|scopes| scopes.iter().map(|s| s.to_string()).collect()),
            extra: response.extra_fields().fields.clone(),
        }
    }

    /// Check if the access token has expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires| SystemTime::now() > expires)
    }
}

impl OAuth2Token for StandardToken {
    fn extra(&self, field: &str) -> Option<&serde_json::Value> {
        self.extra.get(field)
    }

    fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn response_from_json(body: serde_json::Value) -> OidcTokenResponse {
        serde_json::from_value(body).expect("token response should deserialize")
    }

    #[test]
    fn test_from_response_captures_extras() {
        let response = response_from_json(json!({
            "access_token": "at-123",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "rt-456",
            "scope": "openid email",
            "id_token": "header.payload.signature",
        }));

        let token = StandardToken::from_response(&response);
        assert_eq!(token.access_token, "at-123");
        assert_eq!(token.token_type, BasicTokenType::Bearer);
        assert_eq!(token.refresh_token.as_deref(), Some("rt-456"));
        assert_eq!(
            token.scopes,
            Some(vec!["openid".to_string(), "email".to_string()])
        );
        assert_eq!(
            token.extra("id_token").and_then(serde_json::Value::as_str),
            Some("header.payload.signature")
        );

        let expires_at = token.expires_at.expect("expires_in should be pinned");
        assert!(expires_at > SystemTime::now());
        assert!(token.is_valid());
    }

    #[test]
    fn test_empty_access_token_is_invalid() {
        let response = response_from_json(json!({
            "access_token": "",
            "token_type": "bearer",
        }));

        let token = StandardToken::from_response(&response);
        assert!(!token.is_valid());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let token = StandardToken {
            access_token: "at-123".to_string(),
            token_type: BasicTokenType::Bearer,
            refresh_token: None,
            expires_at: Some(SystemTime::now() - Duration::from_secs(3600)),
            scopes: None,
            extra: HashMap::new(),
        };

        assert!(token.is_expired());
        assert!(!token.is_valid());
    }

    #[test]
    fn test_extra_lookup_misses_cleanly() {
        let response = response_from_json(json!({
            "access_token": "at-123",
            "token_type": "bearer",
        }));

        let token = StandardToken::from_response(&response);
        assert!(token.extra("id_token").is_none());
    }
}
