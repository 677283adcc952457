//! The two OAuth2 legs of the authorization-code flow
//!
//! [`AuthCodeGrant`] is the capability the client programs against;
//! [`CodeGrantClient`] is the real implementation, wiring the configured
//! endpoints into an [`oauth2::Client`] and sending the exchange through the
//! TLS-aware HTTP transport.

use async_trait::async_trait;
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
};
use oauth2::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, Scope, StandardRevocableToken,
};

use crate::error::BoxError;
use crate::http::HttpClient;
use crate::provider::Endpoint;
use crate::tls::TlsOptions;
use crate::token::{OidcTokenResponse, StandardToken};

// oauth2::Client with auth and token endpoints set, capturing extra token
// response fields (id_token) instead of discarding them
type ConfiguredOAuthClient = oauth2::Client<
    BasicErrorResponse,
    OidcTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,    // HasAuthUrl
    EndpointNotSet, // HasDeviceAuthUrl
    EndpointNotSet, // HasIntrospectionUrl
    EndpointNotSet, // HasRevocationUrl
    EndpointSet,    // HasTokenUrl
>;

/// Capability covering the two OAuth2 legs of the authorization-code flow
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthCodeGrant: Send + Sync {
    /// Build the authorization URL carrying the given `state` value.
    ///
    /// Pure: nothing is sent anywhere, the caller redirects the user agent.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for a token at the token endpoint.
    async fn exchange_code(&self, code: &str) -> Result<StandardToken, BoxError>;
}

/// [`AuthCodeGrant`] implementation backed by the provider's real endpoints
#[derive(Clone, Debug)]
pub struct CodeGrantClient {
    client: ConfiguredOAuthClient,
    scopes: Vec<Scope>,
    http: HttpClient,
}

impl CodeGrantClient {
    /// Wire the endpoint pair and client credentials into a grant client
    #[must_use]
    pub fn new(
        endpoint: Endpoint,
        client_id: ClientId,
        client_secret: ClientSecret,
        redirect_url: RedirectUrl,
        scopes: Vec<Scope>,
        tls: TlsOptions,
    ) -> Self {
        let client: ConfiguredOAuthClient = oauth2::Client::new(client_id)
            .set_client_secret(client_secret)
            .set_auth_uri(endpoint.auth_url)
            .set_token_uri(endpoint.token_url)
            .set_redirect_uri(redirect_url);

        Self {
            client,
            scopes,
            http: HttpClient::new(tls),
        }
    }
}

#[async_trait]
impl AuthCodeGrant for CodeGrantClient {
    fn authorize_url(&self, state: &str) -> String {
        let state = state.to_owned();
        let mut request = self.client.authorize_url(move || CsrfToken::new(state));
        for scope in &self.scopes {
            request = request.add_scope(scope.clone());
        }

        let (url, _state) = request.url();
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<StandardToken, BoxError> {
        tracing::debug!("exchanging authorization code at token endpoint");

        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await?;

        Ok(StandardToken::from_response(&response))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use oauth2::url::Url;
    use proptest::prelude::*;

    use super::*;

    fn test_grant_client(scopes: &[&str]) -> CodeGrantClient {
        CodeGrantClient::new(
            Endpoint {
                auth_url: oauth2::AuthUrl::new("https://idp.example.com/authorize".to_string())
                    .unwrap(),
                token_url: oauth2::TokenUrl::new("https://idp.example.com/token".to_string())
                    .unwrap(),
            },
            ClientId::new("test-client".to_string()),
            ClientSecret::new("test-secret".to_string()),
            RedirectUrl::new("https://app.example.com/callback".to_string()).unwrap(),
            scopes
                .iter()
                .map(|scope| Scope::new((*scope).to_string()))
                .collect(),
            TlsOptions::default(),
        )
    }

    fn query_map(url: &str) -> HashMap<String, String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    #[test]
    fn test_authorize_url_carries_flow_parameters() {
        let url = test_grant_client(&["openid", "email"]).authorize_url("state-123");
        let query = query_map(&url);

        assert!(url.starts_with("https://idp.example.com/authorize?"));
        assert_eq!(query.get("response_type").map(String::as_str), Some("code"));
        assert_eq!(query.get("client_id").map(String::as_str), Some("test-client"));
        assert_eq!(
            query.get("redirect_uri").map(String::as_str),
            Some("https://app.example.com/callback")
        );
        assert_eq!(query.get("state").map(String::as_str), Some("state-123"));
        assert_eq!(query.get("scope").map(String::as_str), Some("openid email"));
    }

    #[test]
    fn test_authorize_url_without_scopes_omits_scope_parameter() {
        let url = test_grant_client(&[]).authorize_url("state-123");
        let query = query_map(&url);

        assert_eq!(query.get("scope"), None);
    }

    proptest! {
        #[test]
        fn test_authorize_url_round_trips_any_printable_state(state in "[ -~]{1,64}") {
            let url = test_grant_client(&["openid", "email"]).authorize_url(&state);
            let query = query_map(&url);

            prop_assert_eq!(query.get("state"), Some(&state));
            prop_assert_eq!(query.get("client_id").map(String::as_str), Some("test-client"));
            prop_assert_eq!(
                query.get("redirect_uri").map(String::as_str),
                Some("https://app.example.com/callback")
            );
            prop_assert_eq!(query.get("scope").map(String::as_str), Some("openid email"));
        }
    }
}
