//! Error types for the OIDC client
//!
//! Every operation either fully succeeds or fails with exactly one
//! [`OidcError`] kind. Nothing is retried internally; retry and deadline
//! policy belong to the caller.

use thiserror::Error;

/// Boxed error type returned at the library seams.
///
/// Seam implementations ([`TokenVerifier`](crate::verifier::TokenVerifier),
/// [`AuthCodeGrant`](crate::grant::AuthCodeGrant)) surface their underlying
/// library errors as this type; [`Client`](crate::client::Client) wraps them
/// into the matching [`OidcError`] kind so callers can still reach the cause
/// through [`std::error::Error::source`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// OIDC client errors
#[derive(Debug, Error)]
pub enum OidcError {
    /// Invalid configuration value (bad URL, missing required field)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Issuer metadata discovery failed
    #[error("Failed to discover provider metadata: {0}")]
    DiscoveryFailed(#[source] BoxError),

    /// Authorization code exchange failed at the transport/protocol level
    #[error("Failed to exchange authorization code for token: {0}")]
    TokenExchangeFailed(#[source] BoxError),

    /// Exchange succeeded but the returned token fails validity checks
    #[error("Server returned an invalid token")]
    InvalidToken,

    /// Token response has no `id_token` field (or it is not a string)
    #[error("Missing id_token in token response")]
    MissingIdToken,

    /// The `id_token` failed signature, issuer, audience, or expiry checks
    #[error("Failed to verify id_token: {0}")]
    VerificationFailed(#[source] BoxError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_wrapped_errors_preserve_cause() {
        let cause: BoxError = "connection refused".into();
        let err = OidcError::TokenExchangeFailed(cause);

        let source = err.source().expect("cause should be preserved");
        assert_eq!(source.to_string(), "connection refused");
        assert_eq!(
            err.to_string(),
            "Failed to exchange authorization code for token: connection refused"
        );
    }

    #[test]
    fn test_terminal_errors_have_no_cause() {
        assert!(OidcError::InvalidToken.source().is_none());
        assert!(OidcError::MissingIdToken.source().is_none());
    }
}
