//! Verification of `id_token`s against the issuer's published JWKS

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use openidconnect::core::{CoreIdToken, CoreIdTokenVerifier, CoreJsonWebKeySet};
use openidconnect::{ClientId, IssuerUrl, JsonWebKeySetUrl, Nonce};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::BoxError;
use crate::http::HttpClient;
use crate::tls::TlsOptions;

/// Claims extracted from a successfully verified `id_token`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerifiedIdToken {
    /// Subject identifier, the stable user ID at this issuer
    pub subject: String,
    /// Issuer URL the token was signed by
    pub issuer: String,
    /// Audiences the token was minted for
    pub audiences: Vec<String>,
    /// Expiry instant of the token
    pub expires_at: DateTime<Utc>,
    /// Instant the token was issued at
    pub issued_at: DateTime<Utc>,
    /// Full claim set as verified, including any provider-specific claims
    pub raw_claims: serde_json::Value,
}

impl VerifiedIdToken {
    /// Deserialize the full claim set into a caller-defined type.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error when the claims do not match the
    /// requested shape.
    pub fn claims<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.raw_claims.clone())
    }

    /// Whether the token's expiry instant has passed
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Capability that proves an `id_token` was minted by the expected issuer
/// for the expected client
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a compact-serialized `id_token`.
    ///
    /// Signature, issuer, audience, and expiry are all checked; a failure of
    /// any one rejects the token, as does a token that cannot be parsed.
    async fn verify(&self, raw_id_token: &str) -> Result<VerifiedIdToken, BoxError>;
}

/// Verifier that fetches the issuer's JWKS for every verification.
///
/// Fetching per call rather than caching means issuer key rotation is picked
/// up immediately. Callers who need caching can keep the verified result.
#[derive(Clone, Debug)]
pub struct JwksVerifier {
    issuer: IssuerUrl,
    jwks_uri: JsonWebKeySetUrl,
    client_id: String,
    tls: TlsOptions,
}

impl JwksVerifier {
    /// Build a verifier for the given issuer, key set URL, and client ID
    #[must_use]
    pub const fn new(
        issuer: IssuerUrl,
        jwks_uri: JsonWebKeySetUrl,
        client_id: String,
        tls: TlsOptions,
    ) -> Self {
        Self {
            issuer,
            jwks_uri,
            client_id,
            tls,
        }
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify(&self, raw_id_token: &str) -> Result<VerifiedIdToken, BoxError> {
        // Parse before fetching keys so malformed tokens fail without I/O.
        let id_token = CoreIdToken::from_str(raw_id_token)?;

        let http = HttpClient::new(self.tls.clone());

        tracing::debug!(jwks_uri = %self.jwks_uri.as_str(), "fetching issuer signing keys");
        let jwks = CoreJsonWebKeySet::fetch_async(&self.jwks_uri, &http).await?;

        tracing::debug!(
            issuer = %self.issuer.as_str(),
            client_id = %self.client_id,
            "verifying id_token against issuer jwks"
        );

        let verifier = CoreIdTokenVerifier::new_public_client(
            ClientId::new(self.client_id.clone()),
            self.issuer.clone(),
            jwks,
        );

        let claims = id_token.claims(&verifier, |_: Option<&Nonce>| -> Result<(), String> {
            Ok(())
        })?;

        Ok(VerifiedIdToken {
            subject: claims.subject().as_str().to_string(),
            issuer: claims.issuer().to_string(),
            audiences: claims
                .audiences()
                .iter()
                .map(|audience| audience.as_str().to_string())
                .collect(),
            expires_at: claims.expiration(),
            issued_at: claims.issue_time(),
            raw_claims: serde_json::to_value(claims)?,
        })
    }
}
