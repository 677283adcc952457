//! The OIDC client facade for the authorization-code flow
//!
//! [`Client`] wires a [`Provider`] to the OAuth2 grant machinery and the
//! `id_token` verifier. All state is captured at construction and immutable
//! afterwards, so one client is safely shared across concurrent tasks.

use std::sync::Arc;

use oauth2::{ClientId, ClientSecret, RedirectUrl, Scope};

use crate::config::OidcSettings;
use crate::error::OidcError;
use crate::grant::{AuthCodeGrant, CodeGrantClient};
use crate::provider::{DiscoveredProvider, Provider, VerifierConfig};
use crate::tls::TlsOptions;
use crate::token::{OAuth2Token, StandardToken};
use crate::verifier::VerifiedIdToken;

/// Everything needed to construct a [`Client`]
#[derive(Clone)]
pub struct ClientConfig {
    /// TLS material applied to every outbound call
    pub tls: TlsOptions,
    /// Provider capability, usually a
    /// [`DiscoveredProvider`](crate::provider::DiscoveredProvider)
    pub provider: Arc<dyn Provider>,
    /// Redirect URL registered with the provider for this client
    pub callback_url: String,
    /// OAuth2 client ID
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Scopes requested during authorization
    pub scopes: Vec<String>,
}

/// Factory producing a fresh grant client per operation
type GrantFactory = Box<dyn Fn() -> Box<dyn AuthCodeGrant> + Send + Sync>;

/// Thin OIDC client for the authorization-code flow.
///
/// The client does not retry: transport and verification failures surface to
/// the caller, wrapped in [`OidcError`] with the cause preserved.
pub struct Client {
    provider: Arc<dyn Provider>,
    grant_factory: GrantFactory,
    client_id: String,
}

impl Client {
    /// Capture the configuration and build the client.
    ///
    /// # Errors
    ///
    /// Returns [`OidcError::Config`] when the callback URL does not parse.
    pub fn new(config: ClientConfig) -> Result<Self, OidcError> {
        let redirect_url = RedirectUrl::new(config.callback_url.clone())
            .map_err(|e| OidcError::Config(format!("Invalid callback URL: {e}")))?;

        let provider = Arc::clone(&config.provider);
        let client_id = config.client_id.clone();

        // The endpoint pair is re-read from the provider on every operation,
        // not captured once here.
        let grant_factory: GrantFactory = Box::new(move || {
            Box::new(CodeGrantClient::new(
                config.provider.endpoint(),
                ClientId::new(config.client_id.clone()),
                ClientSecret::new(config.client_secret.clone()),
                redirect_url.clone(),
                config
                    .scopes
                    .iter()
                    .map(|scope| Scope::new(scope.clone()))
                    .collect(),
                config.tls.clone(),
            ))
        });

        Ok(Self {
            provider,
            grant_factory,
            client_id,
        })
    }

    /// Load settings, discover the provider, and build a client.
    ///
    /// # Errors
    ///
    /// Returns [`OidcError::Config`] for invalid settings or TLS material and
    /// [`OidcError::DiscoveryFailed`] when the issuer cannot be reached.
    pub async fn from_settings(settings: &OidcSettings) -> Result<Self, OidcError> {
        settings.validate()?;

        let tls = settings.tls.to_tls_options()?;
        let provider = DiscoveredProvider::discover(&settings.issuer, tls.clone()).await?;

        Self::new(ClientConfig {
            tls,
            provider: Arc::new(provider),
            callback_url: settings.callback_url.clone(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            scopes: settings.scopes.clone(),
        })
    }

    /// Build the authorization URL the user agent is redirected to.
    ///
    /// Pure: the URL embeds the given `state` verbatim, nothing is sent to
    /// the provider.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        (self.grant_factory)().authorize_url(state)
    }

    /// Exchange an authorization code for a token.
    ///
    /// # Errors
    ///
    /// Returns [`OidcError::TokenExchangeFailed`] when the token endpoint
    /// cannot be reached or rejects the code, and [`OidcError::InvalidToken`]
    /// when the endpoint answers with a token that is empty or expired.
    pub async fn exchange_code(&self, code: &str) -> Result<StandardToken, OidcError> {
        let token = (self.grant_factory)()
            .exchange_code(code)
            .await
            .map_err(OidcError::TokenExchangeFailed)?;

        if !token.is_valid() {
            tracing::warn!("token endpoint answered with an invalid token");
            return Err(OidcError::InvalidToken);
        }

        Ok(token)
    }

    /// Verify the `id_token` carried in a token response.
    ///
    /// # Errors
    ///
    /// Returns [`OidcError::MissingIdToken`] when the response carries no
    /// string `id_token` field, and [`OidcError::VerificationFailed`] when
    /// the token does not verify against the provider's keys. The verifier is
    /// only consulted once an `id_token` is present.
    pub async fn verify_id_token(
        &self,
        token: &dyn OAuth2Token,
    ) -> Result<VerifiedIdToken, OidcError> {
        let raw_id_token = token
            .extra("id_token")
            .and_then(serde_json::Value::as_str)
            .ok_or(OidcError::MissingIdToken)?;

        let verifier = self.provider.verifier(&VerifierConfig {
            client_id: self.client_id.clone(),
        });

        verifier.verify(raw_id_token).await.map_err(|e| {
            tracing::debug!(error = %e, "id_token verification failed");
            OidcError::VerificationFailed(e)
        })
    }
}
