//! Provider capability: discovered endpoints plus a verifier factory
//!
//! A provider answers exactly two questions for the client: which endpoint
//! pair serves the authorization-code flow, and how to verify an `id_token`
//! for a given client ID. Discovery I/O happens at construction; after that
//! the capability is immutable and infallible.

use oauth2::{AuthUrl, TokenUrl};
use openidconnect::core::CoreProviderMetadata;
use openidconnect::{IssuerUrl, JsonWebKeySetUrl};

use crate::error::OidcError;
use crate::http::HttpClient;
use crate::tls::TlsOptions;
use crate::verifier::{JwksVerifier, TokenVerifier};

/// The endpoint pair driving the authorization-code flow
#[derive(Clone, Debug)]
pub struct Endpoint {
    /// Authorization endpoint the user agent is redirected to
    pub auth_url: AuthUrl,
    /// Token endpoint authorization codes are exchanged against
    pub token_url: TokenUrl,
}

/// Client-ID expectation handed to the verifier factory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Client ID the `id_token` audience must contain
    pub client_id: String,
}

/// Capability exposing discovered endpoints and verifier construction.
///
/// Implementations hold only immutable configuration, so one provider is
/// safely shared across concurrent callers.
#[cfg_attr(test, mockall::automock)]
pub trait Provider: Send + Sync {
    /// Return the authorization/token endpoint pair.
    ///
    /// Infallible by contract: discovery failures surface at provider
    /// construction, never here.
    fn endpoint(&self) -> Endpoint;

    /// Build a verifier bound to the given client-ID expectation
    fn verifier(&self, config: &VerifierConfig) -> Box<dyn TokenVerifier>;
}

/// Provider backed by OIDC issuer discovery
#[derive(Clone, Debug)]
pub struct DiscoveredProvider {
    issuer: IssuerUrl,
    endpoint: Endpoint,
    jwks_uri: JsonWebKeySetUrl,
    tls: TlsOptions,
}

impl DiscoveredProvider {
    /// Fetch `/.well-known/openid-configuration` from the issuer and build a
    /// provider from the result.
    ///
    /// # Errors
    ///
    /// Returns [`OidcError::Config`] if the issuer URL does not parse or the
    /// metadata lacks a token endpoint, and [`OidcError::DiscoveryFailed`]
    /// when the metadata fetch itself fails.
    pub async fn discover(issuer: &str, tls: TlsOptions) -> Result<Self, OidcError> {
        let issuer_url = IssuerUrl::new(issuer.to_string())
            .map_err(|e| OidcError::Config(format!("Invalid issuer URL: {e}")))?;

        tracing::debug!(issuer = %issuer, "discovering oidc provider metadata");

        let http = HttpClient::new(tls.clone());
        let metadata = CoreProviderMetadata::discover_async(issuer_url, &http)
            .await
            .map_err(|e| OidcError::DiscoveryFailed(Box::new(e)))?;

        Self::from_metadata(&metadata, tls)
    }

    /// Build a provider from already-fetched issuer metadata.
    ///
    /// # Errors
    ///
    /// Returns [`OidcError::Config`] if the metadata does not advertise a
    /// token endpoint (the authorization-code flow cannot work without one).
    pub fn from_metadata(
        metadata: &CoreProviderMetadata,
        tls: TlsOptions,
    ) -> Result<Self, OidcError> {
        let token_url = metadata
            .token_endpoint()
            .ok_or_else(|| OidcError::Config("Provider has no token endpoint".to_string()))?
            .clone();

        let endpoint = Endpoint {
            auth_url: metadata.authorization_endpoint().clone(),
            token_url,
        };

        tracing::info!(
            issuer = %metadata.issuer().as_str(),
            auth_url = %endpoint.auth_url.as_str(),
            token_url = %endpoint.token_url.as_str(),
            "oidc provider ready"
        );

        Ok(Self {
            issuer: metadata.issuer().clone(),
            endpoint,
            jwks_uri: metadata.jwks_uri().clone(),
            tls,
        })
    }
}

impl Provider for DiscoveredProvider {
    fn endpoint(&self) -> Endpoint {
        self.endpoint.clone()
    }

    fn verifier(&self, config: &VerifierConfig) -> Box<dyn TokenVerifier> {
        Box::new(JwksVerifier::new(
            self.issuer.clone(),
            self.jwks_uri.clone(),
            config.client_id.clone(),
            self.tls.clone(),
        ))
    }
}

/// Provider built from explicit endpoint URLs, skipping discovery.
///
/// Useful when the issuer does not serve a discovery document or when the
/// endpoints are pinned by deployment configuration.
#[derive(Clone, Debug)]
pub struct StaticProvider {
    issuer: IssuerUrl,
    endpoint: Endpoint,
    jwks_uri: JsonWebKeySetUrl,
    tls: TlsOptions,
}

impl StaticProvider {
    /// Build a provider from explicit issuer, authorization, token, and JWKS
    /// URLs.
    ///
    /// # Errors
    ///
    /// Returns [`OidcError::Config`] when any of the URLs fails to parse.
    pub fn new(
        issuer: &str,
        auth_url: &str,
        token_url: &str,
        jwks_url: &str,
        tls: TlsOptions,
    ) -> Result<Self, OidcError> {
        Ok(Self {
            issuer: IssuerUrl::new(issuer.to_string())
                .map_err(|e| OidcError::Config(format!("Invalid issuer URL: {e}")))?,
            endpoint: Endpoint {
                auth_url: AuthUrl::new(auth_url.to_string())
                    .map_err(|e| OidcError::Config(format!("Invalid auth URL: {e}")))?,
                token_url: TokenUrl::new(token_url.to_string())
                    .map_err(|e| OidcError::Config(format!("Invalid token URL: {e}")))?,
            },
            jwks_uri: JsonWebKeySetUrl::new(jwks_url.to_string())
                .map_err(|e| OidcError::Config(format!("Invalid JWKS URL: {e}")))?,
            tls,
        })
    }
}

impl Provider for StaticProvider {
    fn endpoint(&self) -> Endpoint {
        self.endpoint.clone()
    }

    fn verifier(&self, config: &VerifierConfig) -> Box<dyn TokenVerifier> {
        Box::new(JwksVerifier::new(
            self.issuer.clone(),
            self.jwks_uri.clone(),
            config.client_id.clone(),
            self.tls.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openidconnect::core::{
        CoreJwsSigningAlgorithm, CoreResponseType, CoreSubjectIdentifierType,
    };
    use openidconnect::{EmptyAdditionalProviderMetadata, ResponseTypes};

    fn test_metadata(with_token_endpoint: bool) -> CoreProviderMetadata {
        let metadata = CoreProviderMetadata::new(
            IssuerUrl::new("https://idp.example.com".to_string()).unwrap(),
            AuthUrl::new("https://idp.example.com/authorize".to_string()).unwrap(),
            JsonWebKeySetUrl::new("https://idp.example.com/keys".to_string()).unwrap(),
            vec![ResponseTypes::new(vec![CoreResponseType::Code])],
            vec![CoreSubjectIdentifierType::Public],
            vec![CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha256],
            EmptyAdditionalProviderMetadata {},
        );

        if with_token_endpoint {
            metadata.set_token_endpoint(Some(
                TokenUrl::new("https://idp.example.com/token".to_string()).unwrap(),
            ))
        } else {
            metadata
        }
    }

    #[test]
    fn test_from_metadata_extracts_endpoint_pair() {
        let provider =
            DiscoveredProvider::from_metadata(&test_metadata(true), TlsOptions::default())
                .unwrap();

        let endpoint = provider.endpoint();
        assert_eq!(endpoint.auth_url.as_str(), "https://idp.example.com/authorize");
        assert_eq!(endpoint.token_url.as_str(), "https://idp.example.com/token");
    }

    #[test]
    fn test_from_metadata_requires_token_endpoint() {
        let result =
            DiscoveredProvider::from_metadata(&test_metadata(false), TlsOptions::default());

        assert!(matches!(result, Err(OidcError::Config(_))));
    }

    #[test]
    fn test_static_provider_endpoint_pair() {
        let provider = StaticProvider::new(
            "https://idp.example.com",
            "https://idp.example.com/authorize",
            "https://idp.example.com/token",
            "https://idp.example.com/keys",
            TlsOptions::default(),
        )
        .unwrap();

        let endpoint = provider.endpoint();
        assert_eq!(endpoint.auth_url.as_str(), "https://idp.example.com/authorize");
        assert_eq!(endpoint.token_url.as_str(), "https://idp.example.com/token");
    }

    #[test]
    fn test_static_provider_rejects_bad_urls() {
        let result = StaticProvider::new(
            "not a url",
            "https://idp.example.com/authorize",
            "https://idp.example.com/token",
            "https://idp.example.com/keys",
            TlsOptions::default(),
        );

        assert!(matches!(result, Err(OidcError::Config(message)) if message.contains("issuer")));
    }
}
